#![warn(missing_docs)]
//! Recorder backend writing TFRecord event files for TensorBoard.
use fringe_core::record::{Record, RecordStorage, Recorder, RecordValue};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Writes aggregated records to TFRecord event files.
///
/// Stored records are aggregated per key (scalars are averaged) when the
/// recorder is flushed; aggregated scalars land in TensorBoard under their
/// record key, with the flush step as the global step.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    storage: RecordStorage,
    ignore_unsupported_value: bool,
}

impl TensorboardRecorder {
    /// Constructs a [`TensorboardRecorder`].
    ///
    /// Event files will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            storage: RecordStorage::new(),
            ignore_unsupported_value: true,
        }
    }

    /// Constructs a [`TensorboardRecorder`] that panics on record values
    /// it cannot represent instead of dropping them.
    pub fn new_with_check_unsupported_value<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            storage: RecordStorage::new(),
            ignore_unsupported_value: false,
        }
    }
}

impl Recorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();

        for (k, v) in record.iter() {
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step as usize),
                RecordValue::DateTime(_) => {} // discard value
                _ => {
                    if !self.ignore_unsupported_value {
                        panic!("Unsupported value: {:?}", (k, v));
                    }
                }
            };
        }

        self.writer.flush();
    }
}
