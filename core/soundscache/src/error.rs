use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid cache magic: expected CS3W")]
    BadHead,
    #[error("invalid bit length: {0}")]
    BadBitLength(u32),
    #[error("{0} is not a cacheable file")]
    NotCacheable(String),
    #[error("no files to cache")]
    Empty,
    #[error("bad invariant: {0}")]
    BadInvariant(&'static str),
}
