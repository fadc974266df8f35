/// This module provides the CSV record encoders, blocking and async.
pub mod csv;
