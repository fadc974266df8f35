use log::{debug, warn};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        field::Field, format::CsvFormat, item::RecordWriterResult, lifecycle::WriterState,
        record::RecordEncoder,
    },
    error::EncoderError,
    item::csv::csv_writer::EncoderSettings,
};

/// The async CSV encoder.
///
/// Produces exactly the bytes a [`CsvEncoder`](super::csv_writer::CsvEncoder)
/// with the same settings would. Escaping and encoding never suspend; the
/// only await points are the hand-offs to the sink.
///
/// There is no async drop in Rust: call [`AsyncCsvEncoder::close`] (or
/// [`AsyncCsvEncoder::into_inner`]) before dropping. Dropping an open encoder
/// discards whatever is still buffered and logs a warning.
///
/// # Examples
///
/// ```
/// use csv_stream_writer::item::csv::csv_writer::CsvEncoderBuilder;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), csv_stream_writer::EncoderError> {
/// let mut encoder = CsvEncoderBuilder::new()
///     .line_terminator("\n")
///     .from_async_writer(Vec::new())?;
///
/// encoder.write_record(["id", "comment"]).await?;
/// encoder.write_record(["1", "multi\nline"]).await?;
///
/// let data = encoder.into_inner().await?;
/// assert_eq!(data, b"id,comment\n1,\"multi\nline\"\n");
/// # Ok(())
/// # }
/// ```
pub struct AsyncCsvEncoder<W: AsyncWrite + Unpin> {
    sink: Option<BufWriter<W>>,
    record: RecordEncoder,
    state: WriterState,
    leave_open: bool,
}

impl<W: AsyncWrite + Unpin> AsyncCsvEncoder<W> {
    pub(crate) fn new(sink: W, format: CsvFormat, settings: &EncoderSettings) -> Self {
        debug!(
            "Opening async CSV encoder: separator={:?} escape={:?} terminator={:?} encoding={}",
            format.separator(),
            format.escape(),
            format.line_terminator(),
            format.encoding().name()
        );

        AsyncCsvEncoder {
            sink: Some(BufWriter::with_capacity(settings.buffer_capacity, sink)),
            record: RecordEncoder::new(format, settings.byte_order_mark),
            state: WriterState::default(),
            leave_open: settings.leave_open,
        }
    }

    /// Writes one record and returns the number of records written so far.
    pub async fn write_record<I>(&mut self, fields: I) -> RecordWriterResult
    where
        I: IntoIterator,
        I::Item: Field,
    {
        self.state.ensure_open()?;
        let sink = self.sink.as_mut().ok_or(EncoderError::Closed)?;

        let bytes = self.record.encode(fields)?;
        sink.write_all(bytes)
            .await
            .map_err(|error| EncoderError::sink("writing record", error))?;

        self.record.record_written();
        Ok(self.state.record_completed())
    }

    /// Like [`AsyncCsvEncoder::write_record`], giving up when `token` fires.
    ///
    /// A token that is already cancelled leaves the encoder untouched. When
    /// cancellation interrupts the write, the record is not counted and the
    /// sink may hold part of it: close the encoder rather than keep writing.
    pub async fn write_record_cancellable<I>(
        &mut self,
        fields: I,
        token: &CancellationToken,
    ) -> RecordWriterResult
    where
        I: IntoIterator,
        I::Item: Field,
    {
        if token.is_cancelled() {
            return Err(EncoderError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(EncoderError::Cancelled),
            result = self.write_record(fields) => result,
        }
    }

    /// Writes each record in order, stopping at the first error.
    pub async fn write_records<R>(&mut self, records: R) -> RecordWriterResult
    where
        R: IntoIterator,
        R::Item: IntoIterator,
        <R::Item as IntoIterator>::Item: Field,
    {
        let mut count = self.state.record_count();
        for record in records {
            count = self.write_record(record).await?;
        }
        Ok(count)
    }

    /// Flush the contents of the internal buffer to the underlying writer,
    /// then flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<(), EncoderError> {
        self.state.ensure_open()?;
        let sink = self.sink.as_mut().ok_or(EncoderError::Closed)?;

        sink.flush()
            .await
            .map_err(|error| EncoderError::sink("flushing", error))
    }

    pub async fn flush_cancellable(
        &mut self,
        token: &CancellationToken,
    ) -> Result<(), EncoderError> {
        if token.is_cancelled() {
            return Err(EncoderError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(EncoderError::Cancelled),
            result = self.flush() => result,
        }
    }

    /// Flushes and releases the sink. Calling it again does nothing.
    ///
    /// Without `leave_open`, the sink is shut down and dropped.
    pub async fn close(&mut self) -> Result<(), EncoderError> {
        if !self.state.begin_teardown() {
            return Ok(());
        }

        let result = match self.sink.as_mut() {
            Some(sink) if self.leave_open => sink
                .flush()
                .await
                .map_err(|error| EncoderError::sink("flushing on close", error)),
            Some(sink) => sink
                .shutdown()
                .await
                .map_err(|error| EncoderError::sink("shutting down on close", error)),
            None => Ok(()),
        };
        if !self.leave_open {
            self.sink = None;
        }

        debug!(
            "Closed async CSV encoder after {} records",
            self.state.record_count()
        );
        result
    }

    pub fn record_count(&self) -> u64 {
        self.state.record_count()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    pub fn format(&self) -> &CsvFormat {
        self.record.format()
    }

    /// The underlying sink, while the encoder still holds it.
    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref().map(BufWriter::get_ref)
    }

    /// Flushes and returns the underlying sink, closing the encoder.
    ///
    /// After a `close()` with `leave_open(true)` the sink was already flushed
    /// and is handed back as is.
    ///
    /// Fails with [`EncoderError::Closed`] if the sink was already released
    /// by an earlier close.
    pub async fn into_inner(mut self) -> Result<W, EncoderError> {
        let tearing_down = self.state.begin_teardown();
        let mut sink = self.sink.take().ok_or(EncoderError::Closed)?;

        if tearing_down {
            sink.flush()
                .await
                .map_err(|error| EncoderError::sink("flushing before release", error))?;
        }
        Ok(sink.into_inner())
    }
}

impl<W: AsyncWrite + Unpin> Drop for AsyncCsvEncoder<W> {
    fn drop(&mut self) {
        if self.state.is_closed() {
            return;
        }

        let pending = self.sink.as_ref().map_or(0, |sink| sink.buffer().len());
        warn!(
            "Async CSV encoder dropped without close after {} records, {} buffered bytes discarded",
            self.state.record_count(),
            pending
        );
    }
}
