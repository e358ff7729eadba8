pub mod bnk;
pub mod cache;
pub mod sounds;
pub mod wem;
