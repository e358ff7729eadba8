use crate::error::Result;
use crate::types::Wem;
use byteorder::{LE, WriteBytesExt};
use std::io::Write;
use utils::BinWriteExt;

impl Wem {
    /// Re-emit the parsed file. Chunks come out in the canonical order
    /// (fmt, cue, LIST, smpl, data) and the RIFF size word is recomputed.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
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
        buf.write_u16::<LE>(self.extra_fmt_length)?;
        buf.write_u16::<LE>(self.ext_unk)?;
        buf.write_u32::<LE>(self.subtype)?;

        // Synthetic vorb tail of the 0x42-byte fmt chunk.
        buf.write_u32::<LE>(self.sample_count)?;
        buf.write_u32::<LE>(self.mod_signal)?;
        buf.write_u32::<LE>(self.fmt_unk_field32_1)?;
        buf.write_u32::<LE>(self.fmt_unk_field32_2)?;
        buf.write_u32::<LE>(self.setup_packet_offset)?;
        buf.write_u32::<LE>(self.first_audio_packet_offset)?;
        buf.write_u32::<LE>(self.fmt_unk_field32_3)?;
        buf.write_u32::<LE>(self.fmt_unk_field32_4)?;
        buf.write_u32::<LE>(self.fmt_unk_field32_5)?;
        buf.write_u32::<LE>(self.uid)?;
        buf.write_u8(self.blocksize_0_pow)?;
        buf.write_u8(self.blocksize_1_pow)?;

        if let Some(cue) = &self.cue {
            buf.write_tag(b"cue ")?;
            buf.write_u32::<LE>(cue.size)?;
            buf.write_u32::<LE>(cue.count)?;
            buf.write_u32::<LE>(cue.id)?;
            buf.write_u32::<LE>(cue.position)?;
            buf.write_u32::<LE>(cue.data_chunk_id)?;
            buf.write_u32::<LE>(cue.chunk_start)?;
            buf.write_u32::<LE>(cue.block_start)?;
            buf.write_u32::<LE>(cue.sample_offset)?;
        }

        if let Some(list) = &self.list {
            buf.write_tag(b"LIST")?;
            buf.write_u32::<LE>(list.size)?;
            buf.write_tag(b"adtl")?;
            buf.write_all(&list.remain)?;
        }

        if let Some(smpl) = &self.smpl {
            buf.write_tag(b"smpl")?;
            buf.write_u32::<LE>(smpl.raw.len() as u32)?;
            buf.write_all(&smpl.raw)?;
        }

        buf.write_tag(b"data")?;
        let data_size = self.pre_data.len() + self.data_setup.len() + self.data.len();
        buf.write_u32::<LE>(data_size as u32)?;
        buf.write_all(&self.pre_data)?;
        buf.write_all(&self.data_setup)?;
        buf.write_all(&self.data)?;

        patch_riff_size(&mut buf);

        Ok(buf)
    }
}

/// Overwrite the RIFF size word with `total - 8`.
pub(crate) fn patch_riff_size(buf: &mut [u8]) {
    let size = (buf.len() as u32 - 8).to_le_bytes();
    buf[4..8].copy_from_slice(&size);
}
