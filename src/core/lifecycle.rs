use crate::error::EncoderError;

/// Record counter and the one-way open/closed latch shared by all encoders.
#[derive(Debug, Default)]
pub(crate) struct WriterState {
    record_count: u64,
    closed: bool,
}

impl WriterState {
    pub(crate) fn ensure_open(&self) -> Result<(), EncoderError> {
        if self.closed {
            Err(EncoderError::Closed)
        } else {
            Ok(())
        }
    }

    /// Counts a fully written record and returns the new total.
    pub(crate) fn record_completed(&mut self) -> u64 {
        self.record_count += 1;
        self.record_count
    }

    pub(crate) fn record_count(&self) -> u64 {
        self.record_count
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Latches the closed flag. Returns `true` only for the first caller,
    /// which is the one that must run the teardown.
    pub(crate) fn begin_teardown(&mut self) -> bool {
        !std::mem::replace(&mut self.closed, true)
    }
}
