// Example: a table driven by a virtual clock, with block snapping and grouped cells.
use std::cell::Cell;
use std::rc::Rc;

use toulouse_var::{ManualScheduler, Scheduler};
use toulouse_virtual::geom::{Dimensions, Point};
use toulouse_virtual::{
    Block, CellProps, ContainerProps, Data, FrameState, GroupProps, RenderMode, RowProps,
    ScrollSnapshot, StyleSheet, Virtual, VirtualOptions,
};

fn main() {
    let rows: Vec<Vec<u32>> = (0..200)
        .map(|y| (0..50).map(|x| x * 1000 + y).collect())
        .collect();

    let options = VirtualOptions::new(
        Data::table(rows),
        |cell: &CellProps<'_, u32>| match cell.mode {
            RenderMode::Full => format!("{:>6}", cell.item),
            RenderMode::Shallow => String::from("     ."),
        },
        |row: &RowProps, cells: Vec<String>| format!("{:>4} |{}", row.y, cells.concat()),
        |props: &ContainerProps, rows: Vec<String>| {
            format!("{:?}\n{}", props.plan.region, rows.join("\n"))
        },
    )
    .with_col_width(|x| if x == 0 { 80.0 } else { 60.0 })
    .with_block(Block::new(4, 8))
    .with_group(
        |_: &u32, x, _| Some(x / 5),
        Some(|_: &GroupProps, cells: Vec<String>| format!("[{}]", cells.concat())),
    );

    let clock = Rc::new(ManualScheduler::new());
    let scheduler: Rc<dyn Scheduler> = clock.clone();
    let mut v = Virtual::new(options, scheduler, Rc::new(StyleSheet::new()));

    let redraws = Rc::new(Cell::new(0));
    let _sub = {
        let redraws = Rc::clone(&redraws);
        v.subscribe(move |frame: &FrameState| {
            redraws.set(redraws.get() + 1);
            println!("redraw #{} -> {:?}", redraws.get(), frame);
        })
    };

    // A fling: many scroll events, one redraw per frame.
    for step in 0..10 {
        let top = 40.0 * f64::from(step);
        v.on_scroll(ScrollSnapshot::new(
            Point::new(120.0, top),
            Dimensions::new(400.0, 200.0),
        ));
        if step % 3 == 0 {
            clock.run_frame();
        }
    }
    clock.run_frame();
    println!("{}", v.render());

    // Let the scroll settle; cells switch to full rendering.
    clock.advance(300);
    clock.run_frame();
    println!("{}", v.render());
    println!("stats={:?}", v.stats());
}
