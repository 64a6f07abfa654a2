//! Recorder interface.
use super::Record;

/// Receives [`Record`]s and writes aggregated values to some destination.
pub trait Recorder {
    /// Stores a record for later aggregation.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records at the given
    /// optimization step, then clears the stored records.
    fn flush(&mut self, step: i64);
}
