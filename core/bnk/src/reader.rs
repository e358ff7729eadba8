use crate::error::{BnkError, Result};
use crate::objects::HircObject;
use crate::types::*;
use byteorder::{LE, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use utils::BinReadExt;

/// Basename of the global bank; it carries STMG/ENVS instead of the
/// embedded-audio chunks and cannot be rebuilt.
pub const INIT_BANK_NAME: &str = "Init.bnk";

impl Soundbank {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_init = path
            .file_name()
            .is_some_and(|name| name == INIT_BANK_NAME);
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader, is_init)
    }

    pub fn read<R: Read + Seek>(reader: &mut R, is_init: bool) -> Result<Self> {
        let header = read_bkhd(reader)?;

        let mut data_index = None;
        let mut data = None;
        let mut stmg = None;

        if !is_init {
            data_index = read_didx(reader)?;
            data = read_data(reader, data_index.as_mut())?;
        } else {
            stmg = Some(read_stmg(reader)?);
        }

        let hirc = read_hirc(reader)?;

        let mut stid = None;
        let mut envs = None;
        if !is_init {
            stid = read_stid(reader)?;
        } else {
            envs = Some(read_envs(reader)?);
        }

        Ok(Soundbank {
            header,
            is_init,
            data_index,
            data,
            stmg,
            hirc,
            stid,
            envs,
        })
    }
}

fn read_bkhd<R: Read + Seek>(reader: &mut R) -> Result<BankHeader> {
    if &reader.read_tag()? != b"BKHD" {
        return Err(BnkError::BadHead("BKHD"));
    }

    let length = reader.read_u32::<LE>()?;
    if length < 16 {
        return Err(BnkError::BadSize {
            what: "BKHD",
            value: length as u64,
        });
    }

    let version = reader.read_u32::<LE>()?;
    if version != BANK_VERSION {
        return Err(BnkError::BadVersion(version));
    }

    let id = reader.read_u32::<LE>()?;
    let unk_field32_1 = reader.read_u32::<LE>()?;
    let unk_field32_2 = reader.read_u32::<LE>()?;
    let unk_data = reader.read_bytes(length as usize - 16)?;

    Ok(BankHeader {
        length,
        version,
        id,
        unk_field32_1,
        unk_field32_2,
        unk_data,
    })
}

/// Probe for an optional chunk: if the next tag is not the expected one,
/// rewind and report absence.
fn probe_tag<R: Read + Seek>(reader: &mut R, expected: &[u8; 4]) -> Result<bool> {
    match reader.read_tag_opt()? {
        Some(tag) if &tag == expected => Ok(true),
        Some(_) => {
            reader.seek(SeekFrom::Current(-4))?;
            Ok(false)
        }
        None => Ok(false),
    }
}

fn read_didx<R: Read + Seek>(reader: &mut R) -> Result<Option<DataIndex>> {
    if !probe_tag(reader, b"DIDX")? {
        return Ok(None);
    }

    let length = reader.read_u32::<LE>()?;
    if length % 12 != 0 {
        return Err(BnkError::BadSize {
            what: "DIDX",
            value: length as u64,
        });
    }

    let mut entries = Vec::with_capacity((length / 12) as usize);
    for _ in 0..length / 12 {
        entries.push(DidxEntry {
            id: reader.read_u32::<LE>()?,
            offset: reader.read_u32::<LE>()?,
            size: reader.read_u32::<LE>()?,
            data: Vec::new(),
        });
    }

    Ok(Some(DataIndex { length, entries }))
}

fn read_data<R: Read + Seek>(
    reader: &mut R,
    data_index: Option<&mut DataIndex>,
) -> Result<Option<DataChunk>> {
    if !probe_tag(reader, b"DATA")? {
        return Ok(None);
    }

    let length = reader.read_u32::<LE>()?;
    let offset = reader.stream_position()?;

    // Slice the payload region into per-entry blobs.
    if let Some(index) = data_index {
        for entry in &mut index.entries {
            if entry.offset as u64 + entry.size as u64 > length as u64 {
                return Err(BnkError::BadInvariant("DIDX entry outside DATA"));
            }
            reader.seek(SeekFrom::Start(offset + entry.offset as u64))?;
            entry.data = reader.read_bytes(entry.size as usize)?;
        }
    }

    reader.seek(SeekFrom::Start(offset + length as u64))?;

    Ok(Some(DataChunk { length, offset }))
}

fn read_stmg<R: Read + Seek>(reader: &mut R) -> Result<StmgChunk> {
    if &reader.read_tag()? != b"STMG" {
        return Err(BnkError::BadHead("STMG"));
    }

    let length = reader.read_u32::<LE>()?;
    let volume = reader.read_f32::<LE>()?;
    let max_voice_instances = reader.read_u16::<LE>()?;

    let state_group_count = reader.read_u32::<LE>()?;
    let mut state_groups = Vec::with_capacity(state_group_count as usize);
    for _ in 0..state_group_count {
        let id = reader.read_u32::<LE>()?;
        let default_transition_time = reader.read_u32::<LE>()?;
        let custom_count = reader.read_u32::<LE>()?;
        let mut custom_transitions = Vec::with_capacity(custom_count as usize);
        for _ in 0..custom_count {
            custom_transitions.push(CustomTransition {
                from_id: reader.read_u32::<LE>()?,
                to_id: reader.read_u32::<LE>()?,
                transition_time: reader.read_u32::<LE>()?,
            });
        }
        state_groups.push(StateGroup {
            id,
            default_transition_time,
            custom_transitions,
        });
    }

    let switch_group_count = reader.read_u32::<LE>()?;
    let mut switch_groups = Vec::with_capacity(switch_group_count as usize);
    for _ in 0..switch_group_count {
        let id = reader.read_u32::<LE>()?;
        let game_parameter_id = reader.read_u32::<LE>()?;
        let point_count = reader.read_u32::<LE>()?;
        let mut points = Vec::with_capacity(point_count as usize);
        for _ in 0..point_count {
            points.push(SwitchPoint {
                value: reader.read_f32::<LE>()?,
                switch_id: reader.read_u32::<LE>()?,
                shape_curve: reader.read_u32::<LE>()?,
            });
        }
        switch_groups.push(SwitchGroup {
            id,
            game_parameter_id,
            points,
        });
    }

    let parameter_count = reader.read_u32::<LE>()?;
    let mut game_parameters = Vec::with_capacity(parameter_count as usize);
    for _ in 0..parameter_count {
        game_parameters.push(GameParameter {
            id: reader.read_u32::<LE>()?,
            default_value: reader.read_f32::<LE>()?,
        });
    }

    Ok(StmgChunk {
        length,
        volume,
        max_voice_instances,
        state_groups,
        switch_groups,
        game_parameters,
    })
}

fn read_hirc<R: Read + Seek>(reader: &mut R) -> Result<HircChunk> {
    if &reader.read_tag()? != b"HIRC" {
        return Err(BnkError::BadHead("HIRC"));
    }

    let length = reader.read_u32::<LE>()?;
    let quantity = reader.read_u32::<LE>()?;

    let mut objects = Vec::with_capacity(quantity as usize);
    for _ in 0..quantity {
        let object_type = reader.read_u8()?;
        let object_length = reader.read_u32::<LE>()?;
        if object_length < 4 {
            return Err(BnkError::BadSize {
                what: "object",
                value: object_length as u64,
            });
        }
        let id = reader.read_u32::<LE>()?;
        let payload = reader.read_bytes(object_length as usize - 4)?;
        objects.push(HircObject::read(object_type, id, &payload)?);
    }

    Ok(HircChunk { length, objects })
}

fn read_stid<R: Read + Seek>(reader: &mut R) -> Result<Option<StidChunk>> {
    let tag = match reader.read_tag_opt()? {
        Some(tag) => tag,
        None => return Ok(None),
    };
    if &tag != b"STID" {
        return Err(BnkError::BadHead("STID"));
    }

    let length = reader.read_u32::<LE>()?;
    if length < 8 {
        return Err(BnkError::BadSize {
            what: "STID",
            value: length as u64,
        });
    }

    Ok(Some(StidChunk {
        length,
        unk_field32_1: reader.read_u32::<LE>()?,
        quantity: reader.read_u32::<LE>()?,
        remaining: reader.read_bytes(length as usize - 8)?,
    }))
}

fn read_envs<R: Read + Seek>(reader: &mut R) -> Result<EnvsChunk> {
    if &reader.read_tag()? != b"ENVS" {
        return Err(BnkError::BadHead("ENVS"));
    }

    let length = reader.read_u32::<LE>()?;
    Ok(EnvsChunk {
        length,
        unk_data: reader.read_bytes(length as usize)?,
    })
}
