// Error types for the detection pipeline.
//
// Only the construction and persistence surfaces can legitimately fail;
// the frame path itself never returns an error to the audio producer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Detection store errors
    #[error("detection store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type using the crate Error
pub type Result<T> = std::result::Result<T, Error>;
