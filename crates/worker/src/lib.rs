#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Worker primitives shared by glimpse crates.
//!
//! * [`TaskClass`] tags spawned work for observability.
//! * [`GenerationClock`] hands out monotonically increasing generations.
//! * [`Debouncer`] coalesces bursts of keyed requests into one delayed task.

mod class;
mod debounce;
mod generation;
mod spawn;

pub use class::TaskClass;
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use generation::GenerationClock;
pub use spawn::spawn;
