use crate::geom::{Dimensions, Geom, Point};
use crate::{Region, RenderMode};

/// A lightweight, serializable snapshot of a scroll container's measurements.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSnapshot {
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub offset_width: f64,
    pub offset_height: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
}

impl ScrollSnapshot {
    /// A snapshot for a container of `visible` size scrolled to `scroll`.
    ///
    /// The scrollable size is left at zero; the engine derives content size from the data.
    pub fn new(scroll: Point, visible: Dimensions) -> Self {
        Self {
            scroll_left: scroll.x,
            scroll_top: scroll.y,
            offset_width: visible.width,
            offset_height: visible.height,
            scroll_width: 0.0,
            scroll_height: 0.0,
        }
    }

    pub fn with_scroll(mut self, scroll: Point) -> Self {
        self.scroll_left = scroll.x;
        self.scroll_top = scroll.y;
        self
    }

    pub fn scroll(&self) -> Point {
        Point::new(self.scroll_left, self.scroll_top)
    }

    /// The visible box in content coordinates.
    pub fn visible(&self) -> Geom {
        Geom::new(
            self.scroll_left,
            self.scroll_top,
            self.offset_width.max(0.0),
            self.offset_height.max(0.0),
        )
    }
}

/// What a host needs to know to decide whether to redraw.
///
/// This is useful for restoring UI state across frames or sessions without coupling the engine
/// to any specific UI framework.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameState {
    pub region: Region,
    pub mode: RenderMode,
}
