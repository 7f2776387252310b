//! Windowed rendering of large 1-D and 2-D datasets.
//!
//! [`Virtual`] renders only the cells around the visible part of a scroll container. The host
//! supplies:
//! - the dataset ([`Data`]) and per-column/per-row pixel sizes
//! - renderers for cells, rows and the container
//! - scroll measurements ([`ScrollSnapshot`], or a [`Measure`] implementation)
//! - a [`toulouse_var::Scheduler`] for settle timers and frame batching
//!
//! Region math lives in [`region`] as pure functions; pixel geometry in [`geom`].
//!
//! The crate is UI-agnostic: a rendered node `N` is whatever the host's renderer returns.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod data;
pub mod geom;
mod key;
mod measure;
mod options;
pub mod region;
mod render;
mod state;
mod style;
mod types;
mod virtualized;


pub use data::{Data, RowRef};
pub use measure::Measure;
pub use options::{
    DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT, DEFAULT_SETTLE_DELAY_MS, GroupFn, RenderCell,
    RenderContainer, RenderGroup, RenderRow, SizeFn, VirtualOptions,
};
pub use region::Plan;
pub use render::{CellProps, ContainerProps, GroupProps, RenderStats, RowProps};
pub use state::{FrameState, ScrollSnapshot};
pub use style::{ClassName, Style, StyleService, StyleSheet};
pub use types::{Block, Extent, Region, RenderMode};
pub use virtualized::Virtual;
