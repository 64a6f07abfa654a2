//! A recorder that discards everything.
use super::{Record, Recorder};

/// Discards all records. Useful in tests and for runs without logging.
pub struct NullRecorder {}

#[allow(clippy::new_without_default)]
impl NullRecorder {
    /// Constructs a [`NullRecorder`].
    pub fn new() -> Self {
        Self {}
    }
}

impl Recorder for NullRecorder {
    fn store(&mut self, _record: Record) {}

    fn flush(&mut self, _step: i64) {}
}
