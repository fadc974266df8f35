//! CSV support for writing records to a byte sink.
//!
//! This module provides encoders that turn sequences of nullable text fields
//! into escaped, delimiter-separated records, written incrementally to a
//! buffered sink.
//!
//! # Module Architecture
//!
//! The CSV module consists of three components:
//!
//! 1. **CsvEncoder**: the blocking encoder over any `std::io::Write`. It
//!    implements the [`RecordWriter`](crate::core::item::RecordWriter) trait
//!    and closes itself on drop.
//!
//! 2. **AsyncCsvEncoder**: the async encoder over any `tokio::io::AsyncWrite`
//!    (feature `async`, enabled by default). It produces the same bytes as the
//!    blocking encoder and supports cancellation tokens.
//!
//! 3. **CsvEncoderOptions**: serde-friendly settings, for encoders configured
//!    from a file.
//!
//! Both encoders are created through [`CsvEncoderBuilder`](csv_writer::CsvEncoderBuilder).
//!
//! # Output format
//!
//! - a field is enclosed in the escape character iff it contains the
//!   separator, the escape character, `\r` or `\n`;
//! - escape characters inside a field are always doubled;
//! - null fields are written as empty text;
//! - the line terminator follows every record, the last one included;
//! - a header row is just the first record.
//!
//! # Ownership and Borrowing Considerations
//!
//! An encoder owns its sink. To read a buffer back after writing to it, either:
//!   1. call `into_inner()`, which flushes and returns the sink, or
//!   2. build the encoder with `leave_open(true)` and call `into_inner()`
//!      after `close()`, or
//!   3. hand the encoder a `&mut` reference and drop the encoder first.
//!
//! # Examples
//!
//! ## Writing to a buffer
//!
//! ```
//! use csv_stream_writer::core::item::RecordWriter;
//! use csv_stream_writer::item::csv::csv_writer::CsvEncoderBuilder;
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut encoder = CsvEncoderBuilder::new()
//!         .line_terminator("\n")
//!         .from_writer(&mut buffer)
//!         .unwrap();
//!
//!     encoder.write_record(["name", "age", "occupation"]).unwrap();
//!     encoder.write_record(["Alice", "28", "Engineer"]).unwrap();
//!     encoder.write_record(["Bob", "35", "Designer, Senior"]).unwrap();
//! } // encoder is dropped here, flushing and releasing the borrow
//!
//! let csv_output = String::from_utf8(buffer).unwrap();
//! assert_eq!(
//!     csv_output,
//!     "name,age,occupation\nAlice,28,Engineer\nBob,35,\"Designer, Senior\"\n"
//! );
//! ```
//!
//! ## Writing from configuration
//!
//! ```
//! use csv_stream_writer::core::item::RecordWriter;
//! use csv_stream_writer::item::csv::{
//!     csv_writer::CsvEncoderBuilder, options::CsvEncoderOptions,
//! };
//!
//! let options: CsvEncoderOptions = serde_json::from_str(
//!     r#"{ "separator": "\t", "line_terminator": "\r\n", "encoding": "windows-1252" }"#,
//! )
//! .unwrap();
//!
//! let mut encoder = CsvEncoderBuilder::from_options(&options)
//!     .unwrap()
//!     .from_writer(Vec::new())
//!     .unwrap();
//! encoder.write_record(["crème", "brûlée"]).unwrap();
//!
//! assert_eq!(encoder.into_inner().unwrap(), b"cr\xe8me\tbr\xfbl\xe9e\r\n");
//! ```

/// The async encoder.
#[cfg(feature = "async")]
pub mod csv_async_writer;

/// The blocking encoder and the builder for both encoders.
pub mod csv_writer;

/// Serializable encoder settings.
pub mod options;
