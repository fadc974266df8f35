use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
/// Encoder error
pub enum EncoderError {
    /// A construction setting was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The encoder was already torn down.
    #[error("Encoder is closed")]
    Closed,

    /// The underlying sink reported an I/O error.
    ///
    /// The encoder stays open after this error; the caller decides whether to
    /// retry or close. The sink position is unknown if the failure happened
    /// in the middle of a record.
    #[error("Sink failure while {context}: {source}")]
    SinkFailure {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    /// A cancellable operation observed its cancellation token.
    #[error("Operation cancelled")]
    Cancelled,

    /// A field holds characters the configured encoding cannot represent.
    #[error("Record cannot be represented in {encoding}")]
    Unencodable { encoding: &'static str },
}

impl EncoderError {
    pub(crate) fn sink(context: &'static str, source: io::Error) -> Self {
        EncoderError::SinkFailure { context, source }
    }
}
