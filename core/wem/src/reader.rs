use crate::error::{Result, WemError};
use crate::types::*;
use byteorder::{LE, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use utils::BinReadExt;

impl Wem {
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
        let riff_end = riff_size as u64 + 8;

        if riff_end > file_size {
            return Err(WemError::TruncatedChunk("RIFF"));
        }

        if &reader.read_tag()? != b"WAVE" {
            return Err(WemError::BadHead("WAVE"));
        }

        // Chunk scan. Extents are validated against the RIFF size.
        let mut fmt_loc: Option<(u64, u32)> = None;
        let mut cue_loc: Option<(u64, u32)> = None;
        let mut list_loc: Option<(u64, u32)> = None;
        let mut smpl_loc: Option<(u64, u32)> = None;
        let mut vorb_loc: Option<(u64, u32)> = None;
        let mut data_loc: Option<(u64, u32)> = None;

        let mut chunk_offset = 12u64;

        while chunk_offset < riff_end {
            if chunk_offset + 8 > riff_end {
                return Err(WemError::TruncatedChunk("chunk header"));
            }

            reader.seek(SeekFrom::Start(chunk_offset))?;
            let chunk_type = reader.read_tag()?;
            let chunk_size = reader.read_u32::<LE>()?;
            let loc = Some((chunk_offset + 8, chunk_size));

            match &chunk_type {
                b"fmt " => fmt_loc = loc,
                b"cue " => cue_loc = loc,
                b"LIST" => list_loc = loc,
                b"smpl" => smpl_loc = loc,
                b"vorb" => vorb_loc = loc,
                b"data" => data_loc = loc,
                _ => {}
            }

            chunk_offset += 8 + chunk_size as u64;
        }

        if chunk_offset > riff_end {
            return Err(WemError::TruncatedChunk("chunk"));
        }

        let (fmt_offset, fmt_size) =
            fmt_loc.ok_or(WemError::BadInvariant("no fmt chunk found"))?;
        let (data_offset, data_size) =
            data_loc.ok_or(WemError::BadInvariant("no data chunk found"))?;

        // Vorb shape selection. Only the synthetic vorb embedded in an
        // oversized fmt chunk is composable; a real vorb chunk of a
        // recognised size is deliberately not handled.
        let vorb_offset = match vorb_loc {
            Some((_, size)) => {
                if !KNOWN_VORB_SIZES.contains(&size) {
                    return Err(WemError::BadSize {
                        what: "vorb",
                        value: size as u64,
                    });
                }
                return Err(WemError::UnsupportedShape("standalone vorb chunk"));
            }
            None => {
                if fmt_size != 0x42 {
                    return Err(WemError::BadSize {
                        what: "fmt",
                        value: fmt_size as u64,
                    });
                }
                fmt_offset + 0x18
            }
        };
        let fake_vorb = true;

        reader.seek(SeekFrom::Start(fmt_offset))?;

        let codec_id = reader.read_u16::<LE>()?;
        if codec_id != 0xFFFF {
            return Err(WemError::BadInvariant("codec id is not 0xFFFF"));
        }

        let channels = reader.read_u16::<LE>()?;
        let sample_rate = reader.read_u32::<LE>()?;
        let avg_bytes_per_second = reader.read_u32::<LE>()?;

        let block_alignment = reader.read_u16::<LE>()?;
        if block_alignment != 0 {
            return Err(WemError::BadInvariant("block alignment is not 0"));
        }

        let bits_per_sample = reader.read_u16::<LE>()?;
        if bits_per_sample != 0 {
            return Err(WemError::BadInvariant("bits per sample is not 0"));
        }

        let extra_fmt_length = reader.read_u16::<LE>()?;
        if extra_fmt_length as u32 != fmt_size - 0x12 {
            return Err(WemError::BadInvariant("bad extra fmt length"));
        }

        let mut ext_unk = 0u16;
        let mut subtype = 0u32;
        if fmt_size - 0x12 >= 2 {
            ext_unk = reader.read_u16::<LE>()?;
            if fmt_size - 0x12 >= 6 {
                subtype = reader.read_u32::<LE>()?;
            }
        }

        let cue = match cue_loc {
            Some((offset, size)) => {
                reader.seek(SeekFrom::Start(offset))?;
                Some(CueChunk {
                    size,
                    count: reader.read_u32::<LE>()?,
                    id: reader.read_u32::<LE>()?,
                    position: reader.read_u32::<LE>()?,
                    data_chunk_id: reader.read_u32::<LE>()?,
                    chunk_start: reader.read_u32::<LE>()?,
                    block_start: reader.read_u32::<LE>()?,
                    sample_offset: reader.read_u32::<LE>()?,
                })
            }
            None => None,
        };

        let list = match list_loc {
            Some((offset, size)) => {
                reader.seek(SeekFrom::Start(offset))?;
                if &reader.read_tag()? != b"adtl" {
                    return Err(WemError::BadHead("adtl"));
                }
                Some(ListChunk {
                    size,
                    remain: reader.read_bytes(size as usize - 4)?,
                })
            }
            None => None,
        };

        let mut smpl = match smpl_loc {
            Some((offset, size)) => {
                reader.seek(SeekFrom::Start(offset))?;
                let raw = reader.read_bytes(size as usize)?;

                reader.seek(SeekFrom::Start(offset + 0x1C))?;
                let loop_count = reader.read_u32::<LE>()?;
                if loop_count != 1 {
                    return Err(WemError::BadInvariant("smpl loop count is not 1"));
                }

                reader.seek(SeekFrom::Start(offset + 0x2C))?;
                let loop_start = reader.read_u32::<LE>()?;
                let loop_end = reader.read_u32::<LE>()?;

                Some(SmplChunk {
                    raw,
                    loop_count,
                    loop_start,
                    loop_end,
                })
            }
            None => None,
        };

        // Synthetic vorb: the granule-less layout.
        reader.seek(SeekFrom::Start(vorb_offset))?;
        let sample_count = reader.read_u32::<LE>()?;

        let no_granule = true;
        reader.seek(SeekFrom::Start(vorb_offset + 0x4))?;
        let mod_signal = reader.read_u32::<LE>()?;
        let mod_packets = !PLAIN_MOD_SIGNALS.contains(&mod_signal);
        let fmt_unk_field32_1 = reader.read_u32::<LE>()?;
        let fmt_unk_field32_2 = reader.read_u32::<LE>()?;

        reader.seek(SeekFrom::Start(vorb_offset + 0x10))?;
        let setup_packet_offset = reader.read_u32::<LE>()?;
        let first_audio_packet_offset = reader.read_u32::<LE>()?;
        let fmt_unk_field32_3 = reader.read_u32::<LE>()?;
        let fmt_unk_field32_4 = reader.read_u32::<LE>()?;
        let fmt_unk_field32_5 = reader.read_u32::<LE>()?;

        reader.seek(SeekFrom::Start(vorb_offset + 0x24))?;
        let uid = reader.read_u32::<LE>()?;
        let blocksize_0_pow = reader.read_u8()?;
        let blocksize_1_pow = reader.read_u8()?;

        if let Some(smpl) = smpl.as_mut() {
            if smpl.loop_end == 0 {
                smpl.loop_end = sample_count;
            } else {
                smpl.loop_end += 1;
            }

            if smpl.loop_start >= sample_count
                || smpl.loop_end > sample_count
                || smpl.loop_start > smpl.loop_end
            {
                return Err(WemError::BadInvariant("loops out of range"));
            }
        }

        // Setup packet sanity check.
        reader.seek(SeekFrom::Start(data_offset + setup_packet_offset as u64))?;
        let packet = PacketHeader {
            size: reader.read_u16::<LE>()?,
            absolute_granule: if no_granule {
                0
            } else {
                reader.read_u32::<LE>()?
            },
            no_granule,
        };
        if packet.absolute_granule != 0 {
            return Err(WemError::BadInvariant("setup packet granule is not 0"));
        }

        let setup_len = setup_packet_offset as u64;
        let first_len = first_audio_packet_offset as u64;
        if setup_len + first_len > data_size as u64 {
            return Err(WemError::BadInvariant("packet offsets past data size"));
        }

        reader.seek(SeekFrom::Start(data_offset))?;
        let pre_data = reader.read_bytes(setup_len as usize)?;
        let data_setup = reader.read_bytes(first_len as usize)?;
        let data = reader.read_bytes((data_size as u64 - setup_len - first_len) as usize)?;

        Ok(Wem {
            riff_size,
            fmt_size,
            codec_id,
            channels,
            sample_rate,
            avg_bytes_per_second,
            block_alignment,
            bits_per_sample,
            extra_fmt_length,
            ext_unk,
            subtype,
            sample_count,
            no_granule,
            mod_signal,
            mod_packets,
            fmt_unk_field32_1,
            fmt_unk_field32_2,
            setup_packet_offset,
            first_audio_packet_offset,
            fmt_unk_field32_3,
            fmt_unk_field32_4,
            fmt_unk_field32_5,
            header_triad_present: false,
            old_packet_headers: false,
            uid,
            blocksize_0_pow,
            blocksize_1_pow,
            fake_vorb,
            cue,
            list,
            smpl,
            data_size,
            pre_data,
            data_setup,
            data,
        })
    }
}
