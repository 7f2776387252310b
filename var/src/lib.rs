//! Observable cells for the Toulouse UI core.
//!
//! A [`Var`] is a mutable, equality-checked value container. Derived cells ([`Value::map`],
//! [`Var::zoom`], [`pack`], [`list`], [`lift2`], ...) follow their sources, and time-shaped cells
//! ([`Value::batch`], [`Value::debounce`], [`Value::throttle`]) defer propagation through an
//! injected [`Scheduler`].
//!
//! Subscriptions are installed lazily: a derived cell only listens to its sources while it has at
//! least one consumer (a downstream listener or an effect), and tears the whole chain down when
//! the last consumer goes away.
//!
//! Propagation is synchronous and single-threaded. A write that happens while the same cell is
//! still propagating a previous write is dropped.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod combinators;
pub mod eq;
mod listeners;
mod scheduler;
mod timing;
mod uninstall;
mod var;

#[cfg(test)]
mod tests;

pub use combinators::{lift2, lift3, lift4, list, list_bidirectional, pack, pack_bidirectional};
pub use eq::EqFn;
pub use scheduler::{ManualScheduler, Scheduler, Task, TaskId};
pub use uninstall::Uninstaller;
pub use var::{Value, Var};
