//! Error types for dictcol-core.

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type shared by the build, query, and persistence layers.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file cannot be opened, read, or decoded as line text.
    #[error("input unavailable: {0}")]
    InputUnavailable(String),

    /// An insert would exceed the configured dictionary ceiling.
    #[error("dictionary full: ceiling of {ceiling} entries reached")]
    DictionaryFull { ceiling: usize },

    /// A persisted image failed structural validation.
    #[error("persisted image corrupt: {0}")]
    PersistenceCorrupt(String),

    /// I/O failure outside the input path (e.g. writing an image).
    #[error("I/O error: {0}")]
    Io(String),

    /// A baseline search variant was invoked on a column built without
    /// retained originals.
    #[error("baseline search requires retained originals")]
    BaselineUnavailable,
}

impl Error {
    /// Create an input-unavailable error
    pub fn input(msg: impl Into<String>) -> Self {
        Error::InputUnavailable(msg.into())
    }

    /// Create a persistence-corrupt error
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Error::PersistenceCorrupt(msg.into())
    }

    /// Create an I/O error
    pub fn io(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }
}
