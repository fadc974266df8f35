use crate::{
    core::{field::Field, format::CsvFormat},
    error::EncoderError,
};

/// Renders records into a reusable byte buffer.
///
/// Both the blocking and the async encoder go through this type, so the
/// bytes handed to a sink never depend on the calling convention. Rendering
/// and encoding finish before the sink sees anything: a record that cannot be
/// encoded leaves the sink untouched.
#[derive(Debug)]
pub(crate) struct RecordEncoder {
    format: CsvFormat,
    text: String,
    bytes: Vec<u8>,
    preamble_pending: bool,
}

impl RecordEncoder {
    pub(crate) fn new(format: CsvFormat, byte_order_mark: bool) -> Self {
        let preamble_pending = byte_order_mark && !format.preamble().is_empty();
        RecordEncoder {
            format,
            text: String::new(),
            bytes: Vec::new(),
            preamble_pending,
        }
    }

    pub(crate) fn format(&self) -> &CsvFormat {
        &self.format
    }

    /// Renders one record and returns the bytes to hand to the sink.
    ///
    /// The byte order mark, when still pending, is prepended. Call
    /// [`RecordEncoder::record_written`] once the sink accepted the bytes.
    pub(crate) fn encode<I>(&mut self, fields: I) -> Result<&[u8], EncoderError>
    where
        I: IntoIterator,
        I::Item: Field,
    {
        self.text.clear();
        self.format.render_record(fields, &mut self.text);

        self.bytes.clear();
        if self.preamble_pending {
            self.bytes.extend_from_slice(self.format.preamble());
        }
        let encoded = self.format.encode_text(&self.text)?;
        self.bytes.extend_from_slice(&encoded);

        Ok(&self.bytes)
    }

    pub(crate) fn record_written(&mut self) {
        self.preamble_pending = false;
    }
}
