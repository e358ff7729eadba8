use crate::error::{CacheError, Result};
use crate::fnv::fnv1a64;
use crate::types::*;
use byteorder::{LE, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use utils::BinReadExt;

/// A decoded cache: header fields plus the three raw regions.
#[derive(Debug, Clone)]
pub struct Cache {
    pub bitlength: BitLength,
    pub unk_field32_1: u32,
    pub unk_field32_2: u32,
    pub info_offset: u64,
    pub file_count: u64,
    pub names_offset: u64,
    pub names_size: u32,
    /// Present only in 64-bit images (observed value 1).
    pub unk_field32_3: Option<u32>,
    pub bufsize: u64,
    pub checksum: u64,
    pub data_offset: u64,
    pub data: Vec<u8>,
    pub names: Vec<u8>,
    pub info: Vec<u8>,
}

impl Cache {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader)
    }

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        if reader.read_tag()? != CACHE_MAGIC {
            return Err(CacheError::BadHead);
        }

        let bitlength_tag = reader.read_u32::<LE>()?;
        let bitlength =
            BitLength::from_tag(bitlength_tag).ok_or(CacheError::BadBitLength(bitlength_tag))?;

        let unk_field32_1 = reader.read_u32::<LE>()?;
        let unk_field32_2 = reader.read_u32::<LE>()?;

        let (info_offset, file_count, names_offset) = match bitlength {
            BitLength::B32 => (
                reader.read_u32::<LE>()? as u64,
                reader.read_u32::<LE>()? as u64,
                reader.read_u32::<LE>()? as u64,
            ),
            BitLength::B64 => (
                reader.read_u64::<LE>()?,
                reader.read_u64::<LE>()?,
                reader.read_u64::<LE>()?,
            ),
        };

        let names_size = reader.read_u32::<LE>()?;
        let unk_field32_3 = match bitlength {
            BitLength::B32 => None,
            BitLength::B64 => Some(reader.read_u32::<LE>()?),
        };

        let bufsize = reader.read_u64::<LE>()?;
        let checksum = reader.read_u64::<LE>()?;

        let data_offset = reader.stream_position()?;
        if names_offset < data_offset {
            return Err(CacheError::BadInvariant("names region before data region"));
        }

        let data = reader.read_bytes((names_offset - data_offset) as usize)?;
        let names = reader.read_bytes(names_size as usize)?;
        let mut info = Vec::new();
        reader.read_to_end(&mut info)?;

        Ok(Cache {
            bitlength,
            unk_field32_1,
            unk_field32_2,
            info_offset,
            file_count,
            names_offset,
            names_size,
            unk_field32_3,
            bufsize,
            checksum,
            data_offset,
            data,
            names,
            info,
        })
    }

    pub fn null_bytes_in_names(&self) -> usize {
        self.names.iter().filter(|&&b| b == 0).count()
    }

    pub fn names_found(&self) -> usize {
        self.null_bytes_in_names()
    }

    /// Info entry count and the division remainder; a non-zero remainder
    /// means the region is broken.
    pub fn info_entries(&self) -> (usize, usize) {
        let entry_size = (self.bitlength.field_width() * 3) as usize;
        (self.info.len() / entry_size, self.info.len() % entry_size)
    }

    pub fn verify_checksum(&self) -> bool {
        let mut hashed = self.names.clone();
        hashed.extend_from_slice(&self.info);
        fnv1a64(&hashed) == self.checksum
    }

    /// Materialise every file the info region describes.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let mut cursor = std::io::Cursor::new(&self.info);
        let mut entries = Vec::with_capacity(self.file_count as usize);

        for _ in 0..self.file_count {
            let name_offset = self.read_field(&mut cursor)?;
            let data_offset = self.read_field(&mut cursor)?;
            let size = self.read_field(&mut cursor)?;

            let name_start = name_offset as usize;
            if name_start >= self.names.len() {
                return Err(CacheError::BadInvariant("name offset past names region"));
            }
            let name_end = self.names[name_start..]
                .iter()
                .position(|&b| b == 0)
                .map(|p| name_start + p)
                .ok_or(CacheError::BadInvariant("unterminated name"))?;
            let name = String::from_utf8_lossy(&self.names[name_start..name_end]).into_owned();

            if data_offset < self.data_offset {
                return Err(CacheError::BadInvariant("data offset inside header"));
            }
            let start = (data_offset - self.data_offset) as usize;
            let end = start + size as usize;
            if end > self.data.len() {
                return Err(CacheError::BadInvariant("entry past data region"));
            }

            entries.push(CacheEntry {
                name,
                data: self.data[start..end].to_vec(),
            });
        }

        Ok(entries)
    }

    fn read_field<R: Read>(&self, reader: &mut R) -> Result<u64> {
        Ok(match self.bitlength {
            BitLength::B32 => reader.read_u32::<LE>()? as u64,
            BitLength::B64 => reader.read_u64::<LE>()?,
        })
    }
}
