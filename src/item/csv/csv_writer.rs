use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use encoding_rs::Encoding;
use log::{debug, error};

use crate::{
    core::{
        field::Field,
        format::CsvFormat,
        item::{RecordWriter, RecordWriterResult},
        lifecycle::WriterState,
        record::RecordEncoder,
    },
    error::EncoderError,
    item::csv::options::CsvEncoderOptions,
};

#[cfg(feature = "async")]
use crate::item::csv::csv_async_writer::AsyncCsvEncoder;

/// A blocking CSV encoder.
///
/// Fields are escaped according to its [`CsvFormat`], encoded, and appended
/// to a buffered sink. Nothing is flushed until [`RecordWriter::flush`],
/// [`RecordWriter::close`] or drop.
///
/// Closing is idempotent and also runs on drop. Unless the encoder was built
/// with `leave_open(true)`, closing releases (drops) the sink; otherwise it is
/// kept and can be taken back with [`CsvEncoder::into_inner`].
///
/// # Examples
///
/// ```
/// use csv_stream_writer::core::item::RecordWriter;
/// use csv_stream_writer::item::csv::csv_writer::CsvEncoderBuilder;
///
/// let mut encoder = CsvEncoderBuilder::new()
///     .line_terminator("\n")
///     .from_writer(vec![])
///     .unwrap();
///
/// encoder.write_record(["city", "country", "note"]).unwrap();
/// encoder.write_record([Some("Boston"), Some("United States"), None]).unwrap();
/// let count = encoder.write_record(["Concord", "United States", "a \"small\" town"]).unwrap();
/// assert_eq!(count, 3);
///
/// let data = String::from_utf8(encoder.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "\
/// city,country,note
/// Boston,United States,
/// Concord,United States,\"a \"\"small\"\" town\"
/// ");
/// ```
pub struct CsvEncoder<W: Write> {
    sink: Option<BufWriter<W>>,
    record: RecordEncoder,
    state: WriterState,
    leave_open: bool,
}

impl<W: Write> RecordWriter for CsvEncoder<W> {
    fn write_record<I>(&mut self, fields: I) -> RecordWriterResult
    where
        I: IntoIterator,
        I::Item: Field,
    {
        self.state.ensure_open()?;
        let sink = self.sink.as_mut().ok_or(EncoderError::Closed)?;

        let bytes = self.record.encode(fields)?;
        sink.write_all(bytes)
            .map_err(|error| EncoderError::sink("writing record", error))?;

        self.record.record_written();
        Ok(self.state.record_completed())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&mut self) -> Result<(), EncoderError> {
        self.state.ensure_open()?;
        let sink = self.sink.as_mut().ok_or(EncoderError::Closed)?;

        sink.flush()
            .map_err(|error| EncoderError::sink("flushing", error))
    }

    fn close(&mut self) -> Result<(), EncoderError> {
        self.teardown()
    }

    fn record_count(&self) -> u64 {
        self.state.record_count()
    }
}

impl<W: Write> CsvEncoder<W> {
    fn new(sink: W, format: CsvFormat, options: &EncoderSettings) -> Self {
        debug!(
            "Opening CSV encoder: separator={:?} escape={:?} terminator={:?} encoding={}",
            format.separator(),
            format.escape(),
            format.line_terminator(),
            format.encoding().name()
        );

        CsvEncoder {
            sink: Some(BufWriter::with_capacity(options.buffer_capacity, sink)),
            record: RecordEncoder::new(format, options.byte_order_mark),
            state: WriterState::default(),
            leave_open: options.leave_open,
        }
    }

    pub fn format(&self) -> &CsvFormat {
        self.record.format()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// The underlying sink, while the encoder still holds it.
    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref().map(BufWriter::get_ref)
    }

    /// Flushes and returns the underlying sink, closing the encoder.
    ///
    /// When the encoder is still open, both its buffer and the sink are
    /// flushed first; if that fails the sink is dropped without writing the
    /// rest of the buffer. After a `close()` with `leave_open(true)` the sink
    /// is handed back as is.
    ///
    /// Fails with [`EncoderError::Closed`] if the sink was already released
    /// by an earlier close.
    pub fn into_inner(mut self) -> Result<W, EncoderError> {
        let tearing_down = self.state.begin_teardown();
        let mut sink = self.sink.take().ok_or(EncoderError::Closed)?;

        if tearing_down {
            if let Err(error) = sink.flush() {
                release(sink);
                return Err(EncoderError::sink("flushing before release", error));
            }
        }
        Ok(release(sink))
    }

    fn teardown(&mut self) -> Result<(), EncoderError> {
        if !self.state.begin_teardown() {
            return Ok(());
        }

        let result = match self.sink.take() {
            Some(mut sink) => {
                let result = sink
                    .flush()
                    .map_err(|error| EncoderError::sink("flushing on close", error));
                let inner = release(sink);
                if self.leave_open {
                    // closed: nothing is buffered from here on
                    self.sink = Some(BufWriter::with_capacity(0, inner));
                }
                result
            }
            None => Ok(()),
        };

        debug!(
            "Closed CSV encoder after {} records",
            self.state.record_count()
        );
        result
    }
}

/// Takes the buffered writer apart, dropping whatever it still buffers.
///
/// `BufWriter`'s own drop would retry the write, which must not happen once
/// the encoder is closed.
fn release<W: Write>(sink: BufWriter<W>) -> W {
    let (inner, _unwritten) = sink.into_parts();
    inner
}

impl<W: Write> Drop for CsvEncoder<W> {
    fn drop(&mut self) {
        if let Err(error) = self.teardown() {
            error!("Failed to close CSV encoder: {}", error);
        }
    }
}

/// Settings that are not part of the text layout.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EncoderSettings {
    pub(crate) byte_order_mark: bool,
    pub(crate) leave_open: bool,
    pub(crate) buffer_capacity: usize,
}

/// Builder for [`CsvEncoder`] and `AsyncCsvEncoder`.
///
/// Every setting is optional. The layout is validated when a sink is
/// attached, so each `from_*` method returns a `Result`.
///
/// # Examples
///
/// ```
/// use csv_stream_writer::core::item::RecordWriter;
/// use csv_stream_writer::item::csv::csv_writer::CsvEncoderBuilder;
///
/// let mut encoder = CsvEncoderBuilder::new()
///     .separator(';')
///     .escape('\'')
///     .line_terminator("\r\n")
///     .from_writer(vec![])
///     .unwrap();
///
/// encoder.write_record(["it's", "a;b", "c"]).unwrap();
///
/// let data = encoder.into_inner().unwrap();
/// assert_eq!(data, b"'it''s';'a;b';c\r\n");
/// ```
#[derive(Debug, Clone)]
pub struct CsvEncoderBuilder {
    separator: char,
    escape: char,
    line_terminator: String,
    encoding: &'static Encoding,
    byte_order_mark: bool,
    leave_open: bool,
    buffer_capacity: usize,
}

impl Default for CsvEncoderBuilder {
    fn default() -> Self {
        CsvEncoderBuilder::new()
    }
}

impl CsvEncoderBuilder {
    pub fn new() -> CsvEncoderBuilder {
        let options = CsvEncoderOptions::default();
        let format = CsvFormat::default();

        CsvEncoderBuilder {
            separator: format.separator(),
            escape: format.escape(),
            line_terminator: format.line_terminator().to_string(),
            encoding: format.encoding(),
            byte_order_mark: options.byte_order_mark,
            leave_open: options.leave_open,
            buffer_capacity: options.buffer_capacity,
        }
    }

    /// Starts from deserialized options.
    ///
    /// Fails with [`EncoderError::InvalidArgument`] on an unknown encoding
    /// label.
    pub fn from_options(options: &CsvEncoderOptions) -> Result<CsvEncoderBuilder, EncoderError> {
        Ok(CsvEncoderBuilder {
            separator: options.separator,
            escape: options.escape,
            line_terminator: options.line_terminator.clone(),
            encoding: options.resolve_encoding()?,
            byte_order_mark: options.byte_order_mark,
            leave_open: options.leave_open,
            buffer_capacity: options.buffer_capacity,
        })
    }

    pub fn separator(mut self, separator: char) -> CsvEncoderBuilder {
        self.separator = separator;
        self
    }

    pub fn escape(mut self, escape: char) -> CsvEncoderBuilder {
        self.escape = escape;
        self
    }

    pub fn line_terminator(mut self, line_terminator: impl Into<String>) -> CsvEncoderBuilder {
        self.line_terminator = line_terminator.into();
        self
    }

    pub fn encoding(mut self, encoding: &'static Encoding) -> CsvEncoderBuilder {
        self.encoding = encoding;
        self
    }

    pub fn byte_order_mark(mut self, yes: bool) -> CsvEncoderBuilder {
        self.byte_order_mark = yes;
        self
    }

    /// Keep the sink alive when the encoder is closed.
    pub fn leave_open(mut self, yes: bool) -> CsvEncoderBuilder {
        self.leave_open = yes;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> CsvEncoderBuilder {
        self.buffer_capacity = capacity;
        self
    }

    pub fn build_format(&self) -> Result<CsvFormat, EncoderError> {
        CsvFormat::new(
            self.separator,
            self.escape,
            self.line_terminator.clone(),
            self.encoding,
        )
    }

    pub(crate) fn settings(&self) -> EncoderSettings {
        EncoderSettings {
            byte_order_mark: self.byte_order_mark,
            leave_open: self.leave_open,
            buffer_capacity: self.buffer_capacity,
        }
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> Result<CsvEncoder<W>, EncoderError> {
        let format = self.build_format()?;
        Ok(CsvEncoder::new(wtr, format, &self.settings()))
    }

    /// Creates (or truncates) the file at `path` and writes into it.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvEncoder<File>, EncoderError> {
        let format = self.build_format()?;
        let file = File::create(path.as_ref())
            .map_err(|error| EncoderError::sink("creating output file", error))?;

        Ok(CsvEncoder::new(file, format, &self.settings()))
    }

    #[cfg(feature = "async")]
    pub fn from_async_writer<W>(self, wtr: W) -> Result<AsyncCsvEncoder<W>, EncoderError>
    where
        W: tokio::io::AsyncWrite + Unpin,
    {
        let format = self.build_format()?;
        Ok(AsyncCsvEncoder::new(wtr, format, &self.settings()))
    }

    /// Async counterpart of [`CsvEncoderBuilder::from_path`].
    #[cfg(feature = "async")]
    pub async fn from_async_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<AsyncCsvEncoder<tokio::fs::File>, EncoderError> {
        let format = self.build_format()?;
        let file = tokio::fs::File::create(path.as_ref())
            .await
            .map_err(|error| EncoderError::sink("creating output file", error))?;

        Ok(AsyncCsvEncoder::new(file, format, &self.settings()))
    }
}

#[cfg(test)]
mod tests {
    use std::{env::temp_dir, error::Error, fs};

    use encoding_rs::WINDOWS_1252;

    use crate::{
        core::item::RecordWriter, error::EncoderError,
        item::csv::csv_writer::CsvEncoderBuilder,
    };

    fn unix() -> CsvEncoderBuilder {
        CsvEncoderBuilder::new().line_terminator("\n")
    }

    #[test]
    fn records_should_be_escaped() -> Result<(), Box<dyn Error>> {
        let mut wtr = unix().from_writer(vec![])?;

        wtr.write_record(["a,b", "c\"d", "plain"])?;
        wtr.write_record(["line1\nline2"])?;

        let data = String::from_utf8(wtr.into_inner()?)?;
        assert_eq!(data, "\"a,b\",\"c\"\"d\",plain\n\"line1\nline2\"\n");

        Ok(())
    }

    #[test]
    fn empty_record_writes_only_the_terminator() -> Result<(), Box<dyn Error>> {
        let mut wtr = CsvEncoderBuilder::new()
            .line_terminator("\r\n")
            .from_writer(vec![])?;

        let count = wtr.write_record(Vec::<String>::new())?;
        assert_eq!(count, 1);
        assert_eq!(wtr.record_count(), 1);
        assert_eq!(wtr.into_inner()?, b"\r\n");

        Ok(())
    }

    #[test]
    fn record_count_should_follow_writes() -> Result<(), Box<dyn Error>> {
        let mut wtr = unix().from_writer(vec![])?;

        assert_eq!(wtr.record_count(), 0);
        assert_eq!(wtr.write_record(["header"])?, 1);
        assert_eq!(wtr.write_records([vec!["a", "b"], vec![], vec!["c"]])?, 4);
        assert_eq!(wtr.record_count(), 4);

        Ok(())
    }

    #[test]
    fn write_after_close_should_fail() -> Result<(), Box<dyn Error>> {
        let mut wtr = unix().from_writer(vec![])?;
        wtr.write_record(["a"])?;
        wtr.close()?;

        assert!(wtr.is_closed());
        assert!(matches!(wtr.write_record(["b"]), Err(EncoderError::Closed)));
        assert!(matches!(wtr.flush(), Err(EncoderError::Closed)));
        assert_eq!(wtr.record_count(), 1);

        Ok(())
    }

    #[test]
    fn close_should_be_idempotent() -> Result<(), Box<dyn Error>> {
        let mut wtr = unix().from_writer(vec![])?;
        wtr.close()?;
        wtr.close()?;
        wtr.close()?;

        assert!(wtr.get_ref().is_none());
        assert!(matches!(wtr.into_inner(), Err(EncoderError::Closed)));

        Ok(())
    }

    #[test]
    fn leave_open_should_keep_the_sink() -> Result<(), Box<dyn Error>> {
        let mut wtr = unix().leave_open(true).from_writer(vec![])?;
        wtr.write_record(["kept"])?;
        wtr.close()?;

        assert_eq!(wtr.get_ref().map(Vec::as_slice), Some(&b"kept\n"[..]));
        assert_eq!(wtr.into_inner()?, b"kept\n");

        Ok(())
    }

    #[test]
    fn bom_should_precede_the_first_record() -> Result<(), Box<dyn Error>> {
        let mut wtr = unix().byte_order_mark(true).from_writer(vec![])?;
        wtr.write_record(["a"])?;
        wtr.write_record(["b"])?;

        assert_eq!(wtr.into_inner()?, b"\xEF\xBB\xBFa\nb\n");

        Ok(())
    }

    #[test]
    fn records_should_be_encoded() -> Result<(), Box<dyn Error>> {
        let mut wtr = unix().encoding(WINDOWS_1252).from_writer(vec![])?;
        wtr.write_record(["café", "naïve"])?;

        let result = wtr.write_record(["\u{4e2d}"]);
        assert!(matches!(result, Err(EncoderError::Unencodable { .. })));
        assert_eq!(wtr.record_count(), 1);
        assert_eq!(wtr.into_inner()?, b"caf\xe9,na\xefve\n");

        Ok(())
    }

    #[test]
    fn invalid_layout_should_be_rejected() {
        let result = CsvEncoderBuilder::new()
            .separator('"')
            .from_writer(vec![]);

        assert!(matches!(result, Err(EncoderError::InvalidArgument(_))));
    }

    #[test]
    fn records_should_be_written_to_path() -> Result<(), Box<dyn Error>> {
        let path = temp_dir().join("csv_stream_writer_foo.csv");
        {
            let mut wtr = unix().from_path(&path)?;
            wtr.write_record(["Boston", "United States", "4628910"])?;
            wtr.write_record(["Concord", "United States", "42695"])?;
        }

        let content = fs::read_to_string(&path)?;
        assert_eq!(
            content,
            "Boston,United States,4628910\nConcord,United States,42695\n"
        );
        fs::remove_file(&path).ok();

        Ok(())
    }
}
