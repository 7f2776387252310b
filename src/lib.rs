//! The computational core of the Toulouse UI library.
//!
//! - [`var`]: observable cells with lazy subscription installation, time-shaping combinators and
//!   binding combinators.
//! - [`virtualized`]: windowed rendering of large 1-D and 2-D datasets, driven by those cells.
//!
//! Both crates are UI-agnostic. Timers and animation frames come from an injected
//! [`var::Scheduler`]; styles are requested from a [`virtualized::StyleService`].
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

pub use toulouse_var as var;
pub use toulouse_virtual as virtualized;

pub use toulouse_var::{Uninstaller, Value, Var};
pub use toulouse_virtual::{Data, Virtual, VirtualOptions};
