use thiserror::Error;

pub type Result<T> = std::result::Result<T, WemError>;

#[derive(Error, Debug)]
pub enum WemError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no {0} head found")]
    BadHead(&'static str),
    #[error("truncated {0}")]
    TruncatedChunk(&'static str),
    #[error("bad {what} size: {value:#X}")]
    BadSize { what: &'static str, value: u64 },
    #[error("unsupported shape: {0}")]
    UnsupportedShape(&'static str),
    #[error("bad invariant: {0}")]
    BadInvariant(&'static str),
}
