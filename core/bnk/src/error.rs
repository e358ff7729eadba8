use thiserror::Error;

pub type Result<T> = std::result::Result<T, BnkError>;

#[derive(Error, Debug)]
pub enum BnkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid {0} head")]
    BadHead(&'static str),
    #[error("invalid soundbank version: {0:#X}")]
    BadVersion(u32),
    #[error("invalid {what} length: {value}")]
    BadSize { what: &'static str, value: u64 },
    #[error("invalid object {id}: expected {expected} payload bytes, consumed {consumed}")]
    ObjectLengthMismatch { id: u32, expected: u32, consumed: u64 },
    #[error("bad invariant: {0}")]
    BadInvariant(&'static str),
    #[error("{0} not found within soundbank")]
    NotFound(String),
    #[error("{0} is not a WEM file")]
    NotWem(String),
    #[error("audio id {id} has no {what}")]
    NoOwners { id: u32, what: &'static str },
    #[error("id {0} already used")]
    IdInUse(u32),
    #[error("invalid object ids database")]
    DatabaseCorrupt,
    #[error("invalid playlist file: {0}")]
    PlaylistFormat(String),
    #[error("{0} is not supported")]
    NotSupported(&'static str),
    #[error("wem: {0}")]
    Wem(#[from] wem::WemError),
}
