//! Core systems for Horizon Feed.
//!
//! This crate provides the foundational pieces shared by the feed crates:
//!
//! - **Signal/Slot System**: Type-safe notification from models to consumers
//! - **Logging**: Tracing targets, perf spans and an outline formatter
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_feed_core::Signal;
//!
//! let items_changed = Signal::<usize>::new();
//!
//! let conn_id = items_changed.connect(|count| {
//!     println!("now showing {} items", count);
//! });
//!
//! items_changed.emit(201);
//! items_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::{Outline, OutlineFormatOptions, PerfSpan, TreeStyle};
pub use signal::{ConnectionId, Signal};
