//! Combiner inputs.
//!
//! Each input is a [`Slot`] holding the buffer, weight, idle deadline and
//! removal flag. Producers reach it through the public [`Input`] handle; the
//! combiner's roster and the sweeper hold it directly.

mod input;
mod slot;
mod source_id;

pub use input::Input;
pub use source_id::SourceId;

pub(crate) use slot::{Slot, WaitOutcome};
