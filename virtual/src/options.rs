use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::render::{CellProps, ContainerProps, GroupProps, RowProps};
use crate::{Block, Data};

/// Pixel size of column or row `i`.
pub type SizeFn = Rc<dyn Fn(usize) -> f64>;

pub type RenderCell<A, N> = Rc<dyn Fn(&CellProps<'_, A>) -> N>;

/// Wraps the rendered cells (and groups) of one row.
pub type RenderRow<N> = Rc<dyn Fn(&RowProps, Vec<N>) -> N>;

/// Wraps a run of consecutive cells that share a group id.
pub type RenderGroup<N> = Rc<dyn Fn(&GroupProps, Vec<N>) -> N>;

/// Wraps the rendered rows into the scroll content.
pub type RenderContainer<N> = Rc<dyn Fn(&ContainerProps, Vec<N>) -> N>;

/// Assigns cell `(item, x, y)` to a group, if any.
pub type GroupFn<A> = Rc<dyn Fn(&A, usize, usize) -> Option<usize>>;

pub const DEFAULT_ROW_HEIGHT: f64 = 20.0;
pub const DEFAULT_COL_WIDTH: f64 = 100.0;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 300;

/// Configuration for [`crate::Virtual`].
///
/// This type is cheap to clone: closures are stored in `Rc`s so hosts can update a few fields and
/// call `Virtual::set_options` without reallocating them.
pub struct VirtualOptions<A, N> {
    pub data: Data<A>,
    pub render_container: RenderContainer<N>,
    pub render_row: RenderRow<N>,
    pub render_cell: RenderCell<A, N>,
    pub row_height: SizeFn,
    pub col_width: SizeFn,

    /// Extra pixels rendered past every edge of the visible box. Negative values shrink it.
    pub overflow: f64,

    /// Region snapping granularity.
    pub block: Block,

    pub group: Option<GroupFn<A>>,
    /// Only used together with `group`. Without it, grouped cells are rendered unwrapped.
    pub render_group: Option<RenderGroup<N>>,

    /// Passes the viewport and region rectangles to `render_container` for drawing outlines.
    pub debug_overlay: bool,

    /// Quiet time after the last measurement before cells switch back to `Full` mode.
    pub settle_delay_ms: u64,
}

impl<A, N> Clone for VirtualOptions<A, N> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            render_container: Rc::clone(&self.render_container),
            render_row: Rc::clone(&self.render_row),
            render_cell: Rc::clone(&self.render_cell),
            row_height: Rc::clone(&self.row_height),
            col_width: Rc::clone(&self.col_width),
            overflow: self.overflow,
            block: self.block,
            group: self.group.clone(),
            render_group: self.render_group.clone(),
            debug_overlay: self.debug_overlay,
            settle_delay_ms: self.settle_delay_ms,
        }
    }
}

impl<A, N> VirtualOptions<A, N> {
    /// Creates options with uniform default sizes, no overflow and no grouping.
    pub fn new(
        data: Data<A>,
        render_cell: impl Fn(&CellProps<'_, A>) -> N + 'static,
        render_row: impl Fn(&RowProps, Vec<N>) -> N + 'static,
        render_container: impl Fn(&ContainerProps, Vec<N>) -> N + 'static,
    ) -> Self {
        Self {
            data,
            render_container: Rc::new(render_container),
            render_row: Rc::new(render_row),
            render_cell: Rc::new(render_cell),
            row_height: Rc::new(|_: usize| DEFAULT_ROW_HEIGHT),
            col_width: Rc::new(|_: usize| DEFAULT_COL_WIDTH),
            overflow: 0.0,
            block: Block::default(),
            group: None,
            render_group: None,
            debug_overlay: false,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }

    pub fn with_data(mut self, data: Data<A>) -> Self {
        self.data = data;
        self
    }

    pub fn with_row_height(mut self, row_height: impl Fn(usize) -> f64 + 'static) -> Self {
        self.row_height = Rc::new(row_height);
        self
    }

    pub fn with_col_width(mut self, col_width: impl Fn(usize) -> f64 + 'static) -> Self {
        self.col_width = Rc::new(col_width);
        self
    }

    pub fn with_overflow(mut self, overflow: f64) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.block = block;
        self
    }

    pub fn with_group(
        mut self,
        group: impl Fn(&A, usize, usize) -> Option<usize> + 'static,
        render_group: Option<impl Fn(&GroupProps, Vec<N>) -> N + 'static>,
    ) -> Self {
        self.group = Some(Rc::new(group));
        self.render_group = render_group.map(|f| Rc::new(f) as _);
        self
    }

    pub fn with_debug_overlay(mut self, debug_overlay: bool) -> Self {
        self.debug_overlay = debug_overlay;
        self
    }

    pub fn with_settle_delay_ms(mut self, delay_ms: u64) -> Self {
        self.settle_delay_ms = delay_ms;
        self
    }

    /// Whether nodes memoized under `self` are still valid under `other`.
    pub(crate) fn memo_compatible(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render_cell, &other.render_cell)
            && Rc::ptr_eq(&self.render_row, &other.render_row)
            && Rc::ptr_eq(&self.row_height, &other.row_height)
            && Rc::ptr_eq(&self.col_width, &other.col_width)
            && match (&self.group, &other.group) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
            && match (&self.render_group, &other.render_group) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl<A, N> core::fmt::Debug for VirtualOptions<A, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualOptions")
            .field("data", &self.data)
            .field("overflow", &self.overflow)
            .field("block", &self.block)
            .field("grouped", &self.group.is_some())
            .field("debug_overlay", &self.debug_overlay)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .finish_non_exhaustive()
    }
}
