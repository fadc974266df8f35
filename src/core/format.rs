use std::borrow::Cow;

use encoding_rs::{BIG5, EUC_JP, EUC_KR, Encoding, GB18030, GBK, SHIFT_JIS, UTF_8};

use crate::{core::field::Field, error::EncoderError};

/// Field separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = ',';

/// Escape (quote) character used when none is configured.
pub const DEFAULT_ESCAPE: char = '"';

/// Record terminator used when none is configured: the host's line ending.
#[cfg(windows)]
pub const DEFAULT_LINE_TERMINATOR: &str = "\r\n";

/// Record terminator used when none is configured: the host's line ending.
#[cfg(not(windows))]
pub const DEFAULT_LINE_TERMINATOR: &str = "\n";

const UTF_8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Immutable description of how records are laid out as text.
///
/// A `CsvFormat` is validated once, at construction, and never changes
/// afterwards. It owns the per-field escaping rules:
///
/// - a field is enclosed in the escape character iff it contains the
///   separator, the escape character, `\r` or `\n`;
/// - every escape character inside a field is doubled, enclosed or not.
///
/// # Examples
///
/// ```
/// use csv_stream_writer::core::format::CsvFormat;
///
/// let format = CsvFormat::default();
/// let mut line = String::new();
/// format.render_record(["a,b", "c\"d", "plain"], &mut line);
///
/// assert!(line.starts_with("\"a,b\",\"c\"\"d\",plain"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFormat {
    separator: char,
    escape: char,
    line_terminator: String,
    encoding: &'static Encoding,
}

impl Default for CsvFormat {
    fn default() -> Self {
        CsvFormat {
            separator: DEFAULT_SEPARATOR,
            escape: DEFAULT_ESCAPE,
            line_terminator: DEFAULT_LINE_TERMINATOR.to_string(),
            encoding: UTF_8,
        }
    }
}

impl CsvFormat {
    /// Validates and builds a format.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::InvalidArgument`] when:
    /// - separator and escape are the same character,
    /// - either of them is `\r` or `\n`,
    /// - the line terminator is empty,
    /// - the encoding does not encode to itself (UTF-16 and `replacement`),
    /// - separator or escape cannot be represented in the encoding,
    /// - separator or escape encodes to a byte that the encoding also uses
    ///   inside multi-byte characters (`\` in Shift_JIS, for instance).
    pub fn new(
        separator: char,
        escape: char,
        line_terminator: impl Into<String>,
        encoding: &'static Encoding,
    ) -> Result<Self, EncoderError> {
        let line_terminator = line_terminator.into();

        if separator == escape {
            return Err(EncoderError::InvalidArgument(format!(
                "separator and escape must differ, both are {:?}",
                separator
            )));
        }
        for (name, c) in [("separator", separator), ("escape", escape)] {
            if c == '\r' || c == '\n' {
                return Err(EncoderError::InvalidArgument(format!(
                    "{} must not be a line break, got {:?}",
                    name, c
                )));
            }
        }
        if line_terminator.is_empty() {
            return Err(EncoderError::InvalidArgument(
                "line terminator must not be empty".to_string(),
            ));
        }
        if encoding.output_encoding() != encoding {
            return Err(EncoderError::InvalidArgument(format!(
                "{} cannot be used as an output encoding",
                encoding.name()
            )));
        }

        let format = CsvFormat {
            separator,
            escape,
            line_terminator,
            encoding,
        };

        let mut reserved = String::new();
        reserved.push(separator);
        reserved.push(escape);
        reserved.push_str(&format.line_terminator);
        if format.encode_text(&reserved).is_err() {
            return Err(EncoderError::InvalidArgument(format!(
                "separator, escape and terminator must be representable in {}",
                encoding.name()
            )));
        }
        for (name, c) in [("separator", separator), ("escape", escape)] {
            if collides_with_trail_bytes(encoding, c) {
                return Err(EncoderError::InvalidArgument(format!(
                    "{} {:?} is ambiguous in {}: multi-byte characters can contain its byte",
                    name,
                    c,
                    encoding.name()
                )));
            }
        }

        Ok(format)
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn escape(&self) -> char {
        self.escape
    }

    pub fn line_terminator(&self) -> &str {
        &self.line_terminator
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Whether `field` must be wrapped in the escape character.
    pub fn needs_enclosing(&self, field: &str) -> bool {
        field.contains(|c: char| {
            c == self.separator || c == self.escape || c == '\r' || c == '\n'
        })
    }

    /// Appends one escaped field to `out`.
    pub fn push_field(&self, field: &str, out: &mut String) {
        let enclose = self.needs_enclosing(field);

        if enclose {
            out.push(self.escape);
        }
        for c in field.chars() {
            if c == self.escape {
                out.push(c);
            }
            out.push(c);
        }
        if enclose {
            out.push(self.escape);
        }
    }

    /// Appends a whole record, terminator included, to `out`.
    ///
    /// Null fields are written as empty text. A record without fields is just
    /// the terminator.
    pub fn render_record<I>(&self, fields: I, out: &mut String)
    where
        I: IntoIterator,
        I::Item: Field,
    {
        for (index, field) in fields.into_iter().enumerate() {
            if index > 0 {
                out.push(self.separator);
            }
            self.push_field(field.as_field().unwrap_or_default(), out);
        }
        out.push_str(&self.line_terminator);
    }

    /// Converts rendered text to the configured encoding.
    ///
    /// UTF-8 is a no-op borrow.
    pub fn encode_text<'a>(&self, text: &'a str) -> Result<Cow<'a, [u8]>, EncoderError> {
        if self.encoding == UTF_8 {
            return Ok(Cow::Borrowed(text.as_bytes()));
        }

        let (bytes, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(EncoderError::Unencodable {
                encoding: self.encoding.name(),
            });
        }
        Ok(bytes)
    }

    /// Byte order mark for the configured encoding, empty when it has none.
    pub fn preamble(&self) -> &'static [u8] {
        if self.encoding == UTF_8 { UTF_8_BOM } else { &[] }
    }
}

/// Whether the encoded form of `c` can also show up as part of another
/// character's encoding, so a reader could split a field in the wrong place.
fn collides_with_trail_bytes(encoding: &'static Encoding, c: char) -> bool {
    if encoding == UTF_8 || encoding.is_single_byte() {
        return false;
    }
    if !c.is_ascii() {
        return true;
    }

    let byte = c as u8;
    if encoding == SHIFT_JIS || encoding == BIG5 || encoding == GBK {
        (0x40..=0x7E).contains(&byte)
    } else if encoding == GB18030 {
        (0x30..=0x39).contains(&byte) || (0x40..=0x7E).contains(&byte)
    } else {
        // EUC trail bytes are all above 0xA0, ISO-2022-JP reuses every
        // printable ASCII byte
        encoding != EUC_JP && encoding != EUC_KR
    }
}
