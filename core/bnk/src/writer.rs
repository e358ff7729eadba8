use crate::error::{BnkError, Result};
use crate::objects::{ObjectBody, SoundInclude};
use crate::types::Soundbank;
use byteorder::{LE, WriteBytesExt};
use std::io::Write;
use utils::BinWriteExt;

impl Soundbank {
    /// Rebuild the bank image. Every chunk length is recomputed from its
    /// payload, DIDX offsets become the running sum of entry sizes, and
    /// embedded Sound objects are re-pointed into the freshly written DATA
    /// region. Init-style banks are rejected.
    pub fn build(&mut self) -> Result<Vec<u8>> {
        if self.is_init {
            return Err(BnkError::NotSupported("rebuilding the Init bank"));
        }

        let mut buf = Vec::new();

        // BKHD
        let header = &self.header;
        buf.write_tag(b"BKHD")?;
        buf.write_u32::<LE>(16 + header.unk_data.len() as u32)?;
        buf.write_u32::<LE>(header.version)?;
        buf.write_u32::<LE>(header.id)?;
        buf.write_u32::<LE>(header.unk_field32_1)?;
        buf.write_u32::<LE>(header.unk_field32_2)?;
        buf.write_all(&header.unk_data)?;

        // DIDX
        if let Some(index) = self.data_index.as_mut() {
            index.calculate_offsets();

            buf.write_tag(b"DIDX")?;
            buf.write_u32::<LE>(index.entries.len() as u32 * 12)?;
            for entry in &index.entries {
                buf.write_u32::<LE>(entry.id)?;
                buf.write_u32::<LE>(entry.offset)?;
                buf.write_u32::<LE>(entry.size)?;
            }
        }

        // DATA: the length is the unpadded sum of entry sizes.
        let mut data_payload_pos = None;
        if self.data.is_some() {
            let index = self
                .data_index
                .as_ref()
                .ok_or(BnkError::BadInvariant("DATA without DIDX"))?;

            buf.write_tag(b"DATA")?;
            buf.write_u32::<LE>(index.total_size())?;
            data_payload_pos = Some(buf.len() as u64);
            for entry in &index.entries {
                buf.write_all(&entry.data)?;
            }
        }

        // HIRC
        let mut hirc = Vec::new();
        hirc.write_u32::<LE>(self.hirc.objects.len() as u32)?;
        for object in self.hirc.objects.iter_mut() {
            if let ObjectBody::Sound(sound) = &mut object.body {
                if let (SoundInclude::Embedded { .. }, Some(index), Some(payload_pos)) = (
                    &sound.include,
                    self.data_index.as_ref(),
                    data_payload_pos,
                ) {
                    // Re-point at the freshly written payload; sounds
                    // without a matching index entry keep their fields.
                    if let Some(entry) = index.entry(sound.audio_id) {
                        sound.include = SoundInclude::Embedded {
                            offset: (payload_pos + entry.offset as u64) as u32,
                            size: entry.size,
                        };
                    }
                }
            }
            object.write(&mut hirc)?;
        }

        buf.write_tag(b"HIRC")?;
        buf.write_u32::<LE>(hirc.len() as u32)?;
        buf.write_all(&hirc)?;

        // STID
        if let Some(stid) = &self.stid {
            buf.write_tag(b"STID")?;
            buf.write_u32::<LE>(8 + stid.remaining.len() as u32)?;
            buf.write_u32::<LE>(stid.unk_field32_1)?;
            buf.write_u32::<LE>(stid.quantity)?;
            buf.write_all(&stid.remaining)?;
        }

        Ok(buf)
    }

    pub fn write<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        let bytes = self.build()?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}
