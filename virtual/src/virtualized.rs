use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use toulouse_var::{Scheduler, Uninstaller, Value, Var, eq, lift2, lift3};

use crate::geom::{Dimensions, Geom};
use crate::options::SizeFn;
use crate::region::{self, Plan};
use crate::render::{ContainerProps, Memo, RenderStats};
use crate::style::{Style, StyleService};
use crate::{Block, Data, FrameState, Measure, Region, RenderMode, ScrollSnapshot, VirtualOptions};

/// The options that feed region math, held in a cell so that changing them recomputes the plan.
#[derive(Clone)]
struct Layout {
    overflow: f64,
    block: Block,
    row_height: SizeFn,
    col_width: SizeFn,
}

impl Layout {
    fn of<A, N>(options: &VirtualOptions<A, N>) -> Self {
        Self {
            overflow: options.overflow,
            block: options.block,
            row_height: Rc::clone(&options.row_height),
            col_width: Rc::clone(&options.col_width),
        }
    }
}

/// A windowed renderer for large 1-D and 2-D datasets.
///
/// The host feeds scroll measurements in ([`Virtual::on_scroll`], [`Virtual::attach`]) and calls
/// [`Virtual::render`] when [`Virtual::subscribe`] tells it to. Only the cells of the snapped
/// region are rendered, and rows and cells whose inputs did not change are reused from the
/// previous render.
///
/// While measurements keep arriving, newly rendered cells use [`RenderMode::Shallow`]. Once no
/// measurement has arrived for `settle_delay_ms` the mode switches back to [`RenderMode::Full`].
pub struct Virtual<A: 'static, N> {
    options: VirtualOptions<A, N>,
    scheduler: Rc<dyn Scheduler>,
    styles: Rc<dyn StyleService>,

    data: Var<Data<A>>,
    scroll: Var<ScrollSnapshot>,
    layout: Var<Layout>,
    mode: Var<RenderMode>,
    plan: Value<Plan>,
    region: Value<Region>,
    frame: Value<FrameState>,
    settling: Uninstaller,

    memo: Memo<A, N>,
}

impl<A: Clone + PartialEq + 'static, N: Clone> Virtual<A, N> {
    pub fn new(
        options: VirtualOptions<A, N>,
        scheduler: Rc<dyn Scheduler>,
        styles: Rc<dyn StyleService>,
    ) -> Self {
        vdebug!(
            data = ?options.data,
            overflow = options.overflow,
            block = ?options.block,
            settle_delay_ms = options.settle_delay_ms,
            "Virtual::new"
        );
        let data = Var::with_eq(
            options.data.clone(),
            Rc::new(|a: &Data<A>, b: &Data<A>| a.ptr_eq(b)),
        );
        let scroll = Var::new(ScrollSnapshot::default());
        let layout = Var::with_eq(Layout::of(&options), eq::never());
        let mode = Var::new(RenderMode::Full);

        let plan = lift3(
            &data,
            &scroll,
            &layout,
            |data: &Data<A>, scroll: &ScrollSnapshot, layout: &Layout| {
                region::plan(
                    data.compute_dimensions(),
                    scroll,
                    layout.overflow,
                    layout.block,
                    &*layout.col_width,
                    &*layout.row_height,
                )
            },
        );
        let region = plan.map(|plan: &Plan| plan.region);
        let frame = lift2(&region, &mode, |&region: &Region, &mode: &RenderMode| FrameState {
            region,
            mode,
        })
        .batch(&scheduler);
        let settling = settle(&scroll, &mode, &scheduler, options.settle_delay_ms);

        Self {
            options,
            scheduler,
            styles,
            data,
            scroll,
            layout,
            mode,
            plan,
            region,
            frame,
            settling,
            memo: Memo::new(),
        }
    }

    pub fn options(&self) -> &VirtualOptions<A, N> {
        &self.options
    }

    /// Replaces the options.
    ///
    /// Memoized nodes are dropped when a renderer, a size function or the grouping changes.
    pub fn set_options(&mut self, options: VirtualOptions<A, N>) {
        let memo_compatible = self.options.memo_compatible(&options);
        let delay_changed = self.options.settle_delay_ms != options.settle_delay_ms;
        self.options = options;
        vtrace!(
            memo_compatible,
            delay_changed,
            options = ?self.options,
            "Virtual::set_options"
        );

        if !memo_compatible {
            self.memo.clear();
        }
        if delay_changed {
            self.settling = settle(
                &self.scroll,
                &self.mode,
                &self.scheduler,
                self.options.settle_delay_ms,
            );
        }
        self.layout.set(Layout::of(&self.options));
        self.data.set(self.options.data.clone());
    }

    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualOptions<A, N>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn data(&self) -> Data<A> {
        self.data.get()
    }

    /// Swaps the dataset. Data is compared by pointer: passing a clone of the current data is a
    /// no-op.
    pub fn set_data(&mut self, data: Data<A>) {
        self.options.data = data.clone();
        self.data.set(data);
    }

    /// Feeds a scroll measurement.
    pub fn on_scroll(&self, snapshot: ScrollSnapshot) {
        vtrace!(?snapshot, "Virtual::on_scroll");
        self.scroll.set(snapshot);
    }

    /// Feeds a measurement taken after the container was resized.
    pub fn on_resize(&self, snapshot: ScrollSnapshot) {
        vtrace!(?snapshot, "Virtual::on_resize");
        self.scroll.set(snapshot);
    }

    pub fn measure(&self, source: &dyn Measure) {
        self.scroll.set(source.snapshot());
    }

    /// Measures `source` now and again on every resize it reports, until the returned handle is
    /// dropped.
    pub fn attach(&self, source: Rc<dyn Measure>) -> Uninstaller {
        self.measure(&*source);
        let weak = Rc::downgrade(&source);
        let scroll = self.scroll.clone();
        source.on_resize(Rc::new(move || {
            if let Some(source) = weak.upgrade() {
                scroll.set(source.snapshot());
            }
        }))
    }

    /// Calls `f` at most once per animation frame in which the region or the render mode
    /// changed. The host is expected to call [`Virtual::render`] from there.
    pub fn subscribe(&self, f: impl Fn(&FrameState) + 'static) -> Uninstaller {
        self.frame.effect(move |frame: &FrameState, _: &FrameState| f(frame))
    }

    pub fn scroll(&self) -> ScrollSnapshot {
        self.scroll.get()
    }

    pub fn mode(&self) -> RenderMode {
        self.mode.get()
    }

    pub fn plan(&self) -> Plan {
        self.plan.get()
    }

    pub fn region(&self) -> Region {
        self.region.get()
    }

    pub fn world_dimensions(&self) -> Dimensions {
        self.plan.with(|plan| plan.world)
    }

    pub fn viewport(&self) -> Geom {
        self.plan.with(|plan| plan.viewport)
    }

    pub fn region_geometry(&self) -> Geom {
        self.plan.with(|plan| plan.geometry)
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            region: self.region(),
            mode: self.mode(),
        }
    }

    pub fn scroll_value(&self) -> Value<ScrollSnapshot> {
        self.scroll.value()
    }

    pub fn mode_value(&self) -> Value<RenderMode> {
        self.mode.value()
    }

    pub fn region_value(&self) -> Value<Region> {
        self.region.clone()
    }

    pub fn stats(&self) -> RenderStats {
        self.memo.stats()
    }

    pub fn mounted_rows(&self) -> usize {
        self.memo.mounted_rows()
    }

    pub fn mounted_cells(&self) -> usize {
        self.memo.mounted_cells()
    }

    /// Drains CSS rules registered since the last call.
    pub fn flush_styles(&self) -> Vec<String> {
        self.styles.flush()
    }

    /// Renders the current region.
    pub fn render(&mut self) -> N {
        let data = self.data.get();
        let plan = self.plan.get();
        let mode = self.mode.get();

        let rows = self
            .memo
            .render_rows(&data, plan.region, mode, &self.options, &*self.styles);

        let container_class = self.styles.register(
            &Style::new()
                .with("position", "relative")
                .px("width", plan.world.width)
                .px("height", plan.world.height),
        );
        let region_class = self.styles.register(
            &Style::new()
                .with("position", "absolute")
                .px("left", plan.geometry.left)
                .px("top", plan.geometry.top),
        );
        let props = ContainerProps {
            plan,
            mode,
            container_class,
            region_class,
            debug_overlay: self.options.debug_overlay,
        };
        (self.options.render_container)(&props, rows)
    }
}

/// Drops to `Shallow` on every measurement and back to `Full` once measurements stop for
/// `delay_ms`.
///
/// The quiet period is timed on a measurement counter rather than on the snapshot itself, so
/// scrolling away and back to the settled position still counts as movement.
fn settle(
    scroll: &Var<ScrollSnapshot>,
    mode: &Var<RenderMode>,
    scheduler: &Rc<dyn Scheduler>,
    delay_ms: u64,
) -> Uninstaller {
    let ticks = Var::new(0u64);
    let shallow = {
        let mode = mode.clone();
        let ticks = ticks.clone();
        scroll.listen_down(move |_: &ScrollSnapshot, _: &ScrollSnapshot| {
            mode.set(RenderMode::Shallow);
            ticks.modify(|n: &u64| n.wrapping_add(1));
        })
    };
    let full = {
        let mode = mode.clone();
        ticks
            .debounce(scheduler, delay_ms)
            .effect(move |_: &u64, _: &u64| mode.set(RenderMode::Full))
    };
    Uninstaller::all([shallow, full])
}

impl<A: 'static, N> fmt::Debug for Virtual<A, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Virtual")
            .field("options", &self.options)
            .field("settling", &self.settling)
            .finish_non_exhaustive()
    }
}
