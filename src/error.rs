use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The caller requested something the target format cannot express,
    /// e.g. replacing the transformation matrix wholesale.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// Failure writing to the underlying output sink. Not retryable; the
    /// partially written document must be discarded.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
