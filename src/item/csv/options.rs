use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::{
    core::format::{CsvFormat, DEFAULT_ESCAPE, DEFAULT_LINE_TERMINATOR, DEFAULT_SEPARATOR},
    error::EncoderError,
};

/// Default capacity of the buffer placed in front of the sink.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Serializable encoder settings.
///
/// Every field has a default, so a configuration file only needs to name
/// what it changes. The encoding is a WHATWG label such as `"utf-8"` or
/// `"windows-1252"`.
///
/// # Examples
///
/// ```
/// use csv_stream_writer::item::csv::options::CsvEncoderOptions;
///
/// let options: CsvEncoderOptions =
///     serde_json::from_str(r#"{ "separator": ";", "encoding": "latin1" }"#).unwrap();
///
/// let format = options.format().unwrap();
/// assert_eq!(format.separator(), ';');
/// assert_eq!(format.escape(), '"');
/// assert_eq!(format.encoding(), encoding_rs::WINDOWS_1252);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvEncoderOptions {
    pub separator: char,
    pub escape: char,
    pub line_terminator: String,
    pub encoding: String,
    /// Write a byte order mark before the first record (UTF-8 only).
    pub byte_order_mark: bool,
    /// Keep the sink alive after the encoder is closed.
    pub leave_open: bool,
    pub buffer_capacity: usize,
}

impl Default for CsvEncoderOptions {
    fn default() -> Self {
        CsvEncoderOptions {
            separator: DEFAULT_SEPARATOR,
            escape: DEFAULT_ESCAPE,
            line_terminator: DEFAULT_LINE_TERMINATOR.to_string(),
            encoding: "utf-8".to_string(),
            byte_order_mark: false,
            leave_open: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl CsvEncoderOptions {
    /// Resolves the encoding label.
    pub fn resolve_encoding(&self) -> Result<&'static Encoding, EncoderError> {
        Encoding::for_label(self.encoding.trim().as_bytes()).ok_or_else(|| {
            EncoderError::InvalidArgument(format!("unknown encoding label {:?}", self.encoding))
        })
    }

    /// Validates the text layout settings.
    pub fn format(&self) -> Result<CsvFormat, EncoderError> {
        CsvFormat::new(
            self.separator,
            self.escape,
            self.line_terminator.clone(),
            self.resolve_encoding()?,
        )
    }
}
