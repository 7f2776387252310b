//! Memoized row and cell rendering.
//!
//! Mounted rows and cells keep the node they last produced together with the key it was produced
//! for. A node is reused as long as its key is unchanged; leaving the region drops the entry.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::ops::Range;

use crate::data::RowRef;
use crate::options::RenderGroup;
use crate::region::Plan;
use crate::style::{ClassName, Style, StyleService};
use crate::{Data, Region, RenderMode, VirtualOptions};

/// Input to `render_cell`.
#[derive(Debug)]
pub struct CellProps<'a, A> {
    pub item: &'a A,
    pub x: usize,
    pub y: usize,
    pub width: f64,
    pub height: f64,
    pub group: Option<usize>,
    pub mode: RenderMode,
}

/// Input to `render_row`.
#[derive(Clone, Debug, PartialEq)]
pub struct RowProps {
    pub y: usize,
    /// Columns rendered in this row; shorter than the region for ragged rows.
    pub columns: Range<usize>,
    pub height: f64,
    pub mode: RenderMode,
    pub class: ClassName,
}

/// Input to `render_group`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupProps {
    pub group: usize,
    pub y: usize,
    pub columns: Range<usize>,
    pub mode: RenderMode,
}

/// Input to `render_container`.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerProps {
    pub plan: Plan,
    pub mode: RenderMode,
    /// Sizes the scroll content to the whole world.
    pub container_class: ClassName,
    /// Positions the rendered rows at the region's pixel offset.
    pub region_class: ClassName,
    pub debug_overlay: bool,
}

/// Cumulative rendering counters.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderStats {
    pub rows_rendered: usize,
    pub cells_rendered: usize,
    pub rows_reused: usize,
    pub cells_reused: usize,
}

struct RowKey<A> {
    row: RowRef<A>,
    y: usize,
    columns: Range<usize>,
    mode: RenderMode,
}

impl<A> RowKey<A> {
    fn matches(&self, other: &Self) -> bool {
        self.row.same(&other.row)
            && self.y == other.y
            && self.columns == other.columns
            && self.mode == other.mode
    }
}

#[derive(PartialEq)]
struct CellKey<A> {
    item: A,
    group: Option<usize>,
    x: usize,
    y: usize,
    mode: RenderMode,
}

struct MountedCell<A, N> {
    key: CellKey<A>,
    node: N,
}

struct MountedRow<A, N> {
    key: RowKey<A>,
    node: N,
    cells: BTreeMap<usize, MountedCell<A, N>>,
}

/// A run of consecutive cells sharing a group id, waiting to be wrapped.
struct Run<N> {
    group: usize,
    columns: Range<usize>,
    nodes: Vec<N>,
}

pub(crate) struct Memo<A, N> {
    rows: BTreeMap<usize, MountedRow<A, N>>,
    stats: RenderStats,
}

impl<A: Clone + PartialEq, N: Clone> Memo<A, N> {
    pub(crate) fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            stats: RenderStats::default(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }

    pub(crate) fn stats(&self) -> RenderStats {
        self.stats
    }

    pub(crate) fn mounted_rows(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn mounted_cells(&self) -> usize {
        self.rows.values().map(|row| row.cells.len()).sum()
    }

    /// Renders every row of `region`, reusing mounted rows whose key is unchanged.
    pub(crate) fn render_rows(
        &mut self,
        data: &Data<A>,
        region: Region,
        mode: RenderMode,
        options: &VirtualOptions<A, N>,
        styles: &dyn StyleService,
    ) -> Vec<N> {
        let visible = region.rows();
        self.rows.retain(|y, _| visible.contains(y));

        #[cfg(feature = "tracing")]
        let before = self.stats;
        let mut out = Vec::with_capacity(region.height);
        for y in region.rows() {
            let Some(row) = data.row(y) else {
                continue;
            };
            let end = region.right().min(row.len()).max(region.left);
            let key = RowKey {
                row,
                y,
                columns: region.left..end,
                mode,
            };

            if let Some(mounted) = self.rows.get(&y) {
                if mounted.key.matches(&key) {
                    self.stats.rows_reused += 1;
                    out.push(mounted.node.clone());
                    continue;
                }
            }

            let mut cells = self.rows.remove(&y).map(|m| m.cells).unwrap_or_default();
            let node = render_row(&key, &mut cells, options, styles, &mut self.stats);
            self.rows.insert(
                y,
                MountedRow {
                    key,
                    node: node.clone(),
                    cells,
                },
            );
            out.push(node);
        }

        vtrace!(
            ?region,
            ?mode,
            rows_rendered = self.stats.rows_rendered - before.rows_rendered,
            rows_reused = self.stats.rows_reused - before.rows_reused,
            cells_rendered = self.stats.cells_rendered - before.cells_rendered,
            "render: rows"
        );
        out
    }
}

fn render_row<A: Clone + PartialEq, N: Clone>(
    key: &RowKey<A>,
    cells: &mut BTreeMap<usize, MountedCell<A, N>>,
    options: &VirtualOptions<A, N>,
    styles: &dyn StyleService,
    stats: &mut RenderStats,
) -> N {
    let y = key.y;
    cells.retain(|x, _| key.columns.contains(x));

    let height = (options.row_height)(y).max(0.0);
    let mut children = Vec::with_capacity(key.columns.len());
    let mut run: Option<Run<N>> = None;

    for x in key.columns.clone() {
        let Some(item) = key.row.get(x) else {
            continue;
        };
        let group = options.group.as_ref().and_then(|g| g(item, x, y));
        let node = render_cell(item, x, y, height, group, key.mode, cells, options, stats);

        match (options.render_group.as_ref(), group) {
            (Some(_), Some(g)) => match run.as_mut() {
                Some(open) if open.group == g => {
                    open.columns.end = x + 1;
                    open.nodes.push(node);
                }
                _ => {
                    close_run(run.take(), y, key.mode, options.render_group.as_ref(), &mut children);
                    run = Some(Run {
                        group: g,
                        columns: x..x + 1,
                        nodes: alloc::vec![node],
                    });
                }
            },
            _ => {
                close_run(run.take(), y, key.mode, options.render_group.as_ref(), &mut children);
                children.push(node);
            }
        }
    }
    close_run(run.take(), y, key.mode, options.render_group.as_ref(), &mut children);

    let class = styles.register(&Style::new().px("height", height));
    let props = RowProps {
        y,
        columns: key.columns.clone(),
        height,
        mode: key.mode,
        class,
    };
    stats.rows_rendered += 1;
    (options.render_row)(&props, children)
}

#[allow(clippy::too_many_arguments)]
fn render_cell<A: Clone + PartialEq, N: Clone>(
    item: &A,
    x: usize,
    y: usize,
    height: f64,
    group: Option<usize>,
    row_mode: RenderMode,
    cells: &mut BTreeMap<usize, MountedCell<A, N>>,
    options: &VirtualOptions<A, N>,
    stats: &mut RenderStats,
) -> N {
    // Once a mounted cell has rendered in full it does not drop back to shallow.
    let mode = match cells.get(&x) {
        Some(mounted) if mounted.key.mode.is_full() => RenderMode::Full,
        _ => row_mode,
    };
    let key = CellKey {
        item: item.clone(),
        group,
        x,
        y,
        mode,
    };

    if let Some(mounted) = cells.get(&x) {
        if mounted.key == key {
            stats.cells_reused += 1;
            return mounted.node.clone();
        }
    }

    let props = CellProps {
        item,
        x,
        y,
        width: (options.col_width)(x).max(0.0),
        height,
        group,
        mode,
    };
    let node = (options.render_cell)(&props);
    stats.cells_rendered += 1;
    cells.insert(
        x,
        MountedCell {
            key,
            node: node.clone(),
        },
    );
    node
}

fn close_run<N>(
    run: Option<Run<N>>,
    y: usize,
    mode: RenderMode,
    render_group: Option<&RenderGroup<N>>,
    children: &mut Vec<N>,
) {
    let (Some(run), Some(render_group)) = (run, render_group) else {
        return;
    };
    let props = GroupProps {
        group: run.group,
        y,
        columns: run.columns,
        mode,
    };
    children.push(render_group(&props, run.nodes));
}
