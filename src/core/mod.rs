/// Text-level layout of records: separator, escape, terminator, encoding.
pub mod format;

/// Nullable field values.
pub mod field;

/// The blocking writer trait.
pub mod item;

pub(crate) mod lifecycle;

pub(crate) mod record;
