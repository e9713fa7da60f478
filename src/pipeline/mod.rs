//! Combiner internals.
//!
//! ```text
//! Input::put → Slot buffer ←─ poll (weighted pick, then fallback scan)
//!                   ↑
//!            TimeoutSweeper (evicts idle slots)
//! ```
//!
//! - **Roster**: lock-free snapshot of active slots and their total weight
//! - **Sweeper**: periodic thread removing slots past their idle deadline

mod roster;
mod sweeper;

pub(crate) use roster::{Roster, RosterCell};
pub(crate) use sweeper::TimeoutSweeper;
