//! Plain uncompressed WAVE handling for the cue-preparation tool: read a
//! PCM file, then re-emit it with a cue point, an `adtl` label, and the
//! payload repeated a requested number of extra times.

use crate::error::{Result, WemError};
use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use utils::{BinReadExt, BinWriteExt};

const CUE_LABEL: &[u8] = b"preparedM\0";

#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    pub riff_size: u32,
    pub fmt_size: u32,
    pub codec_id: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_second: u32,
    pub block_alignment: u16,
    pub bits_per_sample: u16,
    pub extra_fmt_length: Option<u16>,
    pub extra_fmt: Option<Vec<u8>>,
    pub data: Vec<u8>,
}

impl Wave {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader)
    }

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if &reader.read_tag()? != b"RIFF" {
            return Err(WemError::BadHead("RIFF"));
        }

        let riff_size = reader.read_u32::<LE>()?;
        if riff_size as u64 != file_size - 8 {
            return Err(WemError::TruncatedChunk("RIFF"));
        }

        if &reader.read_tag()? != b"WAVE" {
            return Err(WemError::BadHead("WAVE"));
        }

        let mut fmt: Option<(u32, u16, u16, u32, u32, u16, u16)> = None;
        let mut extra_fmt_length = None;
        let mut extra_fmt = None;
        let mut data: Option<Vec<u8>> = None;

        while let Some(chunk_type) = reader.read_tag_opt()? {
            match &chunk_type {
                b"fmt " => {
                    if fmt.is_some() {
                        return Err(WemError::BadInvariant("repeated fmt chunk"));
                    }

                    let fmt_size = reader.read_u32::<LE>()?;
                    let codec_id = reader.read_u16::<LE>()?;
                    if codec_id != 1 {
                        return Err(WemError::UnsupportedShape("compressed WAVE"));
                    }

                    let channels = reader.read_u16::<LE>()?;
                    let sample_rate = reader.read_u32::<LE>()?;
                    let avg_bytes_per_second = reader.read_u32::<LE>()?;
                    let block_alignment = reader.read_u16::<LE>()?;
                    let bits_per_sample = reader.read_u16::<LE>()?;

                    if fmt_size > 0x10 {
                        let len = reader.read_u16::<LE>()?;
                        extra_fmt_length = Some(len);
                        if len > 0 {
                            extra_fmt = Some(reader.read_bytes(len as usize)?);
                        }
                    }

                    fmt = Some((
                        fmt_size,
                        codec_id,
                        channels,
                        sample_rate,
                        avg_bytes_per_second,
                        block_alignment,
                        bits_per_sample,
                    ));
                }
                b"data" => {
                    if data.is_some() {
                        return Err(WemError::BadInvariant("repeated data chunk"));
                    }
                    let data_size = reader.read_u32::<LE>()?;
                    data = Some(reader.read_bytes(data_size as usize)?);
                }
                _ => {
                    let chunk_size = reader.read_u32::<LE>()?;
                    reader.seek(SeekFrom::Current(chunk_size as i64))?;
                }
            }
        }

        let (fmt_size, codec_id, channels, sample_rate, avg_bytes_per_second,
            block_alignment, bits_per_sample) =
            fmt.ok_or(WemError::BadInvariant("no fmt chunk found"))?;
        let data = data.ok_or(WemError::BadInvariant("no data chunk found"))?;

        Ok(Wave {
            riff_size,
            fmt_size,
            codec_id,
            channels,
            sample_rate,
            avg_bytes_per_second,
            block_alignment,
            bits_per_sample,
            extra_fmt_length,
            extra_fmt,
            data,
        })
    }

    /// Emit the cued variant: fmt, a single cue point, an `adtl` label, and
    /// the data payload written `count + 1` times.
    pub fn write_cued(&self, count: u32) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        buf.write_tag(b"RIFF")?;
        buf.write_u32::<LE>(0)?; // patched below
        buf.write_tag(b"WAVE")?;

        buf.write_tag(b"fmt ")?;
        buf.write_u32::<LE>(self.fmt_size)?;
        buf.write_u16::<LE>(self.codec_id)?;
        buf.write_u16::<LE>(self.channels)?;
        buf.write_u32::<LE>(self.sample_rate)?;
        buf.write_u32::<LE>(self.avg_bytes_per_second)?;
        buf.write_u16::<LE>(self.block_alignment)?;
        buf.write_u16::<LE>(self.bits_per_sample)?;

        if let Some(len) = self.extra_fmt_length {
            buf.write_u16::<LE>(len)?;
            if let Some(extra) = &self.extra_fmt {
                buf.write_all(extra)?;
            }
        }

        buf.write_tag(b"cue ")?;
        buf.write_u32::<LE>(0x1C)?;
        buf.write_u32::<LE>(1)?; // cue count
        buf.write_u32::<LE>(1)?; // cue id
        buf.write_u32::<LE>(0)?; // position
        buf.write_tag(b"data")?;
        buf.write_u32::<LE>(0)?; // chunk start
        buf.write_u32::<LE>(0)?; // block start
        buf.write_u32::<LE>(0)?; // sample offset

        let label_len = CUE_LABEL.len() as u32;
        buf.write_tag(b"LIST")?;
        buf.write_u32::<LE>(16 + label_len)?;
        buf.write_tag(b"adtl")?;
        buf.write_tag(b"labl")?;
        buf.write_u32::<LE>(4 + label_len)?;
        buf.write_u32::<LE>(1)?; // label id
        buf.write_all(CUE_LABEL)?;

        buf.write_tag(b"data")?;
        let data_size = self.data.len() as u32;
        buf.write_u32::<LE>(data_size + data_size * count)?;
        for _ in 0..=count {
            buf.write_all(&self.data)?;
        }

        crate::writer::patch_riff_size(&mut buf);

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pcm_wave(data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&0x10u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&2u16.to_le_bytes()); // channels
        buf.extend_from_slice(&48000u32.to_le_bytes());
        buf.extend_from_slice(&192000u32.to_le_bytes());
        buf.extend_from_slice(&4u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(data);
        let size = (buf.len() as u32 - 8).to_le_bytes();
        buf[4..8].copy_from_slice(&size);
        buf
    }

    #[test]
    fn cued_output_repeats_data() {
        let data = [0xABu8; 64];
        let wave = Wave::read(&mut Cursor::new(pcm_wave(&data))).unwrap();
        assert_eq!(wave.data, data);

        let cued = wave.write_cued(3).unwrap();

        // data chunk payload is data_size * (count + 1); the real data
        // chunk is the last "data" tag in the file.
        let pos = (0..cued.len() - 3)
            .rev()
            .find(|&i| &cued[i..i + 4] == b"data")
            .unwrap();
        let size = u32::from_le_bytes(cued[pos + 4..pos + 8].try_into().unwrap());
        assert_eq!(size, 64 * 4);

        // RIFF size word covers the whole file
        let riff = u32::from_le_bytes(cued[4..8].try_into().unwrap());
        assert_eq!(riff as usize, cued.len() - 8);
    }

    #[test]
    fn compressed_wave_is_rejected() {
        let mut bytes = pcm_wave(&[0u8; 8]);
        bytes[20] = 2; // codec id
        assert!(matches!(
            Wave::read(&mut Cursor::new(bytes)),
            Err(WemError::UnsupportedShape(_))
        ));
    }
}
