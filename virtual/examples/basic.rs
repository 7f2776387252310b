// Example: a vertical list of one million rows, rendered to strings.
use std::rc::Rc;

use toulouse_var::{ManualScheduler, Scheduler};
use toulouse_virtual::geom::{Dimensions, Point};
use toulouse_virtual::{
    CellProps, ContainerProps, Data, RowProps, ScrollSnapshot, StyleService, StyleSheet, Virtual,
    VirtualOptions,
};

fn main() {
    let items: Vec<u64> = (0..1_000_000).collect();
    let options = VirtualOptions::new(
        Data::vertical(items),
        |cell: &CellProps<'_, u64>| format!("item {}", cell.item),
        |row: &RowProps, cells: Vec<String>| format!("{}: {}", row.y, cells.join(" ")),
        |_: &ContainerProps, rows: Vec<String>| rows.join("\n"),
    )
    .with_row_height(|_| 24.0)
    .with_overflow(48.0);

    let scheduler: Rc<dyn Scheduler> = Rc::new(ManualScheduler::new());
    let styles: Rc<dyn StyleService> = Rc::new(StyleSheet::new());
    let mut v = Virtual::new(options, scheduler, Rc::clone(&styles));

    v.on_scroll(ScrollSnapshot::new(
        Point::new(0.0, 24.0 * 500_000.0),
        Dimensions::new(100.0, 240.0),
    ));

    println!("world={:?}", v.world_dimensions());
    println!("region={:?} mode={:?}", v.region(), v.mode());
    println!("{}", v.render());
    for rule in styles.flush() {
        println!("css: {rule}");
    }
}
