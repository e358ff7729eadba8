//! The external database of ids already claimed by the game's own banks:
//! a 20-byte SHA-1 digest of the payload followed by a packed array of
//! 32-bit ids.

use crate::error::{BnkError, Result};
use sha1::{Digest, Sha1};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IdDatabase {
    ids: HashSet<u32>,
}

impl IdDatabase {
    /// A database with no reserved ids, for banks edited without one.
    pub fn empty() -> Self {
        IdDatabase::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(&fs::read(path)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 20 {
            return Err(BnkError::DatabaseCorrupt);
        }

        let (digest, payload) = bytes.split_at(20);
        if Sha1::digest(payload).as_slice() != digest {
            return Err(BnkError::DatabaseCorrupt);
        }
        if payload.len() % 4 != 0 {
            return Err(BnkError::DatabaseCorrupt);
        }

        let ids = payload
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();

        Ok(IdDatabase { ids })
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
