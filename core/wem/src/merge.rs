use crate::error::{Result, WemError};
use crate::types::Wem;
use crate::writer::patch_riff_size;
use byteorder::{LE, WriteBytesExt};
use std::io::Write;
use utils::BinWriteExt;

/// Compose a merged file: the target's container and fmt identity with the
/// source's codec metadata grafted in.
///
/// Imported from the source: subtype, the five extra fmt words, uid,
/// mod_signal, the blocksize exponents, and the packet-offset delta. The
/// packet offsets are recomputed against the emitted data region:
/// `setup = len(pre_data)` and `first_audio = setup + (source.first -
/// source.setup)`. A cue chunk is emitted only when the source carries one.
/// Everything the two files disagree on otherwise (channels, sample rate,
/// sample count, ...) keeps the target's value.
pub fn merge(source: &Wem, target: &Wem) -> Result<Vec<u8>> {
    if !target.fake_vorb || !source.fake_vorb {
        return Err(WemError::UnsupportedShape("merge needs the fake-vorb shape"));
    }

    let setup_packet_offset = target.pre_data.len() as u32;
    let first_audio_packet_offset = setup_packet_offset
        + (source.first_audio_packet_offset - source.setup_packet_offset);

    let mut buf = Vec::new();

    buf.write_tag(b"RIFF")?;
    buf.write_u32::<LE>(0)?; // patched below
    buf.write_tag(b"WAVE")?;

    buf.write_tag(b"fmt ")?;
    buf.write_u32::<LE>(target.fmt_size)?;
    buf.write_u16::<LE>(target.codec_id)?;
    buf.write_u16::<LE>(target.channels)?;
    buf.write_u32::<LE>(target.sample_rate)?;
    buf.write_u32::<LE>(target.avg_bytes_per_second)?;
    buf.write_u16::<LE>(target.block_alignment)?;
    buf.write_u16::<LE>(target.bits_per_sample)?;
    buf.write_u16::<LE>(target.extra_fmt_length)?;
    buf.write_u16::<LE>(target.ext_unk)?;
    buf.write_u32::<LE>(source.subtype)?;
    buf.write_u32::<LE>(target.sample_count)?;
    buf.write_u32::<LE>(source.mod_signal)?;
    buf.write_u32::<LE>(source.fmt_unk_field32_1)?;
    buf.write_u32::<LE>(source.fmt_unk_field32_2)?;
    buf.write_u32::<LE>(setup_packet_offset)?;
    buf.write_u32::<LE>(first_audio_packet_offset)?;
    buf.write_u32::<LE>(source.fmt_unk_field32_3)?;
    buf.write_u32::<LE>(source.fmt_unk_field32_4)?;
    buf.write_u32::<LE>(source.fmt_unk_field32_5)?;
    buf.write_u32::<LE>(source.uid)?;
    buf.write_u8(source.blocksize_0_pow)?;
    buf.write_u8(source.blocksize_1_pow)?;

    if let Some(cue) = &source.cue {
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

    buf.write_tag(b"data")?;
    let data_size =
        target.pre_data.len() + target.data_setup.len() + target.data.len();
    buf.write_u32::<LE>(data_size as u32)?;
    buf.write_all(&target.pre_data)?;
    buf.write_all(&target.data_setup)?;
    buf.write_all(&target.data)?;

    patch_riff_size(&mut buf);

    Ok(buf)
}
