//! # stream-combiner
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Weighted merging of many producer queues into a single consumer stream.
//!
//! Producers each own an [`Input`] with a priority. Consumers poll the
//! [`Combiner`], which draws an input at random in proportion to its
//! priority and hands out that input's oldest element. When the drawn input
//! is empty the poll falls back to any input with data, so a low-priority
//! input is never starved while the others are idle.
//!
//! ## Quick Start
//!
//! ```
//! use stream_combiner::{Combiner, CombinerEvent};
//! use std::time::Duration;
//!
//! let combiner: Combiner<String> = Combiner::builder()
//!     .on_event(|e| tracing::debug!(?e, "combiner event"))
//!     .build()?;
//!
//! // 2:1 share of output while both inputs have data
//! let live = combiner.add_input(2.0, Duration::ZERO)?;
//! // evicted after 30s without a put
//! let backfill = combiner.add_input(1.0, Duration::from_secs(30))?;
//!
//! live.put("frame-1".to_string())?;
//! backfill.put("old-1".to_string())?;
//!
//! while let Some(item) = combiner.poll_timeout(Duration::from_millis(10))? {
//!     println!("{item}");
//! }
//!
//! combiner.close();
//! # Ok::<(), stream_combiner::CombinerError>(())
//! ```
//!
//! ## Architecture
//!
//! - **Inputs**: per-producer FIFO buffers; `put` never blocks
//! - **Roster**: copy-on-write snapshot of active inputs and their total
//!   weight, loaded without locking on every poll
//! - **Sweeper**: background thread evicting inputs whose idle timeout passed
//!
//! Ordering is FIFO within an input. Across inputs, the interleaving is
//! random and only the long-run proportions follow the priorities.

#![warn(missing_docs)]
// Millisecond fields in log output
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
// unwrap/expect allowed in tests only
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::missing_panics_doc)]

mod builder;
mod combiner;
mod config;
mod error;
mod event;
mod pipeline;
pub mod selection;
mod source;

pub use builder::CombinerBuilder;
pub use combiner::{Combiner, CombinerStats};
pub use config::{CombinerConfig, InputConfig, RemovalPolicy, DEFAULT_SWEEP_INTERVAL};
pub use error::CombinerError;
pub use event::{event_callback, CombinerEvent, EventCallback, RemovalReason};
pub use source::{Input, SourceId};
