//! Types for recording training metrics.
//!
//! [`Record`] is a bag of named values produced during environment
//! interaction and optimization steps. A [`Recorder`] receives those
//! records, aggregates them, and writes them to some destination when
//! flushed, for example the TFRecord event files of the companion
//! TensorBoard crate.
mod base;
mod null_recorder;
mod recorder;
mod storage;
pub use base::{Record, RecordValue};
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use storage::RecordStorage;
