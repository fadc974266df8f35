use crate::{core::field::Field, error::EncoderError};

/// Represents the result of writing one or more records: the number of
/// records written so far by the writer.
pub type RecordWriterResult = Result<u64, EncoderError>;

/// Blocking record writer.
///
/// Every call runs to completion before returning. Implementations are not
/// reentrant; drive one instance from one caller at a time.
pub trait RecordWriter {
    /// Writes one record and returns the number of records written so far.
    fn write_record<I>(&mut self, fields: I) -> RecordWriterResult
    where
        I: IntoIterator,
        I::Item: Field;

    /// Pushes buffered bytes out to the underlying sink.
    fn flush(&mut self) -> Result<(), EncoderError>;

    /// Flushes and releases the sink. Calling it again does nothing.
    fn close(&mut self) -> Result<(), EncoderError>;

    /// Number of records fully written.
    fn record_count(&self) -> u64;

    /// Writes each record in order, stopping at the first error.
    fn write_records<R>(&mut self, records: R) -> RecordWriterResult
    where
        R: IntoIterator,
        R::Item: IntoIterator,
        <R::Item as IntoIterator>::Item: Field,
    {
        let mut count = self.record_count();
        for record in records {
            count = self.write_record(record)?;
        }
        Ok(count)
    }
}
