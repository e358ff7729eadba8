pub mod error;
pub mod ids;
pub mod objects;
pub mod playlist;
pub mod process;
pub mod reader;
pub mod sound_structure;
pub mod types;
pub mod writer;

pub use error::{BnkError, Result};
pub use ids::IdDatabase;
pub use objects::*;
pub use sound_structure::*;
pub use types::*;
