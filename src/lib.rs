#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 <div align="center">
   <h1>csv-stream-writer</h1>
   <h3>A streaming CSV record encoder with blocking and async write paths</h3>

   ![license](https://shields.io/badge/license-MIT%2FApache--2.0-blue)

  </div>

 # csv-stream-writer

 **csv-stream-writer** turns sequences of nullable text fields into correctly
 escaped, delimiter-separated records and appends them to a byte sink as they
 are produced. The same encoder logic drives a blocking writer over
 `std::io::Write` and an async writer over `tokio::io::AsyncWrite`; both emit
 byte-identical output.

 ## Core Concepts

- **Field:** one nullable text value. `None` is written as empty text.
- **Record:** zero or more fields followed by the line terminator.
- **CsvFormat:** the separator, escape character, line terminator and text
  encoding. Validated once and immutable afterwards.
- **CsvEncoder / AsyncCsvEncoder:** own the sink, count the records written and
  tear down exactly once: flush, then release the sink.

 ## Escaping rules

- A field is enclosed in the escape character iff it contains the separator,
  the escape character, `\r` or `\n`.
- Every escape character inside a field is doubled, whether or not the field
  is enclosed.

 ## Features

| **Feature** | **Description**                                              |
|-------------|--------------------------------------------------------------|
| async       | Enables `AsyncCsvEncoder` on top of tokio (default)          |
| full        | Enables all available features                               |

 ## Getting Started

```rust
use csv_stream_writer::{
    core::item::RecordWriter,
    error::EncoderError,
    item::csv::csv_writer::CsvEncoderBuilder,
};

fn main() -> Result<(), EncoderError> {
    let mut encoder = CsvEncoderBuilder::new()
        .separator(',')
        .escape('"')
        .line_terminator("\n")
        .from_writer(Vec::new())?;

    encoder.write_record(["year", "make", "model", "description"])?;
    encoder.write_record(["1948", "Porsche", "356", "Luxury sports car"])?;
    encoder.write_record([Some("1967"), Some("Ford"), Some("Mustang"), None])?;
    let written = encoder.write_record(["1995", "Peugeot", "205", "City car, \"Junior\""])?;
    assert_eq!(written, 4);

    let csv = String::from_utf8(encoder.into_inner()?).unwrap();
    assert_eq!(
        csv,
        "year,make,model,description\n\
         1948,Porsche,356,Luxury sports car\n\
         1967,Ford,Mustang,\n\
         1995,Peugeot,205,\"City car, \"\"Junior\"\"\"\n"
    );

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 ## Contribution
 Unless you explicitly state otherwise, any contribution intentionally submitted
 for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
 dual licensed as above, without any additional terms or conditions

 */

/// Core building blocks: record format, fields and the writer trait
pub mod core;

/// Error types for encoder operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// CSV encoders and their configuration
pub mod item;
