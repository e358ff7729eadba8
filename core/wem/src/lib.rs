pub mod error;
pub mod merge;
pub mod reader;
pub mod types;
pub mod wave;
pub mod writer;

pub use error::{Result, WemError};
pub use merge::merge;
pub use types::*;
