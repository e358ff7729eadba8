//! HIRC object records. Each record on disk is an 8-bit type, a 32-bit
//! length, a 32-bit id, and a payload of `length - 4` bytes; the decoded
//! variants must consume their payload exactly and re-emit it byte for
//! byte. Types this toolkit does not decode are preserved opaque.

use crate::error::{BnkError, Result};
use crate::sound_structure::{ParamValue, SoundStructure};
use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};
use utils::{BinReadExt, BinWriteExt};

pub const TYPE_SOUND: u8 = 0x02;
pub const TYPE_EVENT_ACTION: u8 = 0x03;
pub const TYPE_EVENT: u8 = 0x04;
pub const TYPE_MUSIC_SEGMENT: u8 = 0x0A;
pub const TYPE_MUSIC_TRACK: u8 = 0x0B;
pub const TYPE_MUSIC_SWITCH: u8 = 0x0C;
pub const TYPE_MUSIC_PLAYLIST: u8 = 0x0D;

pub const ACTION_TYPE_SET_STATE: u8 = 0x12;
pub const ACTION_TYPE_SET_SWITCH: u8 = 0x19;

pub const PLAYLIST_ELEMENT_SIZE: u64 = 0x1A;

#[derive(Debug, Clone, PartialEq)]
pub struct HircObject {
    pub id: u32,
    pub body: ObjectBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectBody {
    Sound(SoundObject),
    EventAction(EventActionObject),
    Event(EventObject),
    MusicSegment(MusicSegmentObject),
    MusicTrack(MusicTrackObject),
    /// The fixed injection layout; written with the music-track type byte.
    CustomMusicTrack(CustomMusicTrack),
    MusicPlaylist(MusicPlaylistObject),
    Unknown { object_type: u8, data: Vec<u8> },
}

impl HircObject {
    /// Parse one record. `payload` is everything past the id field; the
    /// variant must consume it exactly.
    pub fn read(object_type: u8, id: u32, payload: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(payload);
        let body = match object_type {
            TYPE_SOUND => ObjectBody::Sound(SoundObject::read(&mut cursor)?),
            TYPE_EVENT_ACTION => {
                ObjectBody::EventAction(EventActionObject::read(&mut cursor, payload.len() as u64)?)
            }
            TYPE_EVENT => ObjectBody::Event(EventObject::read(&mut cursor)?),
            TYPE_MUSIC_SEGMENT => {
                ObjectBody::MusicSegment(MusicSegmentObject::read(&mut cursor, payload.len() as u64)?)
            }
            TYPE_MUSIC_TRACK => {
                ObjectBody::MusicTrack(MusicTrackObject::read(&mut cursor, payload.len() as u64)?)
            }
            TYPE_MUSIC_PLAYLIST => ObjectBody::MusicPlaylist(MusicPlaylistObject::read(
                &mut cursor,
                payload.len() as u64,
            )?),
            other => {
                let data = cursor.read_bytes(payload.len())?;
                ObjectBody::Unknown {
                    object_type: other,
                    data,
                }
            }
        };

        if cursor.position() != payload.len() as u64 {
            return Err(BnkError::ObjectLengthMismatch {
                id,
                expected: payload.len() as u32,
                consumed: cursor.position(),
            });
        }

        Ok(HircObject { id, body })
    }

    pub fn object_type(&self) -> u8 {
        self.body.type_byte()
    }

    /// Serialised payload (the bytes past the id field).
    pub fn payload(&self) -> Result<Vec<u8>> {
        self.body.to_bytes()
    }

    /// Emit the full record: type, length, id, payload. The length is
    /// recomputed from the payload.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = self.payload()?;
        writer.write_u8(self.object_type())?;
        writer.write_u32::<LE>(payload.len() as u32 + 4)?;
        writer.write_u32::<LE>(self.id)?;
        writer.write_all(&payload)?;
        Ok(())
    }
}

impl ObjectBody {
    pub fn type_byte(&self) -> u8 {
        match self {
            ObjectBody::Sound(_) => TYPE_SOUND,
            ObjectBody::EventAction(_) => TYPE_EVENT_ACTION,
            ObjectBody::Event(_) => TYPE_EVENT,
            ObjectBody::MusicSegment(_) => TYPE_MUSIC_SEGMENT,
            ObjectBody::MusicTrack(_) | ObjectBody::CustomMusicTrack(_) => TYPE_MUSIC_TRACK,
            ObjectBody::MusicPlaylist(_) => TYPE_MUSIC_PLAYLIST,
            ObjectBody::Unknown { object_type, .. } => *object_type,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            ObjectBody::Sound(object) => object.write(&mut buf)?,
            ObjectBody::EventAction(object) => object.write(&mut buf)?,
            ObjectBody::Event(object) => object.write(&mut buf)?,
            ObjectBody::MusicSegment(object) => object.write(&mut buf)?,
            ObjectBody::MusicTrack(object) => object.write(&mut buf)?,
            ObjectBody::CustomMusicTrack(object) => object.write(&mut buf)?,
            ObjectBody::MusicPlaylist(object) => object.write(&mut buf)?,
            ObjectBody::Unknown { data, .. } => buf.write_all(data)?,
        }
        Ok(buf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundInclude {
    Embedded { offset: u32, size: u32 },
    Streamed,
    Prefetched,
}

impl SoundInclude {
    pub fn tag(&self) -> u32 {
        match self {
            SoundInclude::Embedded { .. } => 0,
            SoundInclude::Streamed => 1,
            SoundInclude::Prefetched => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundType {
    Sfx = 0,
    Voice = 1,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundObject {
    pub unk_field32_1: u32,
    pub audio_id: u32,
    pub source_id: u32,
    pub include: SoundInclude,
    pub sound_type: SoundType,
    pub structure: SoundStructure,
}

impl SoundObject {
    fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let unk_field32_1 = reader.read_u32::<LE>()?;
        let include_tag = reader.read_u32::<LE>()?;
        if include_tag > 2 {
            return Err(BnkError::BadInvariant("invalid include type"));
        }

        let audio_id = reader.read_u32::<LE>()?;
        let source_id = reader.read_u32::<LE>()?;

        let include = match include_tag {
            0 => SoundInclude::Embedded {
                offset: reader.read_u32::<LE>()?,
                size: reader.read_u32::<LE>()?,
            },
            1 => SoundInclude::Streamed,
            _ => SoundInclude::Prefetched,
        };

        let sound_type = match reader.read_u8()? {
            0 => SoundType::Sfx,
            1 => SoundType::Voice,
            _ => return Err(BnkError::BadInvariant("invalid sound type")),
        };

        let structure = SoundStructure::read(reader)?;

        Ok(SoundObject {
            unk_field32_1,
            audio_id,
            source_id,
            include,
            sound_type,
            structure,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LE>(self.unk_field32_1)?;
        writer.write_u32::<LE>(self.include.tag())?;
        writer.write_u32::<LE>(self.audio_id)?;
        writer.write_u32::<LE>(self.source_id)?;
        if let SoundInclude::Embedded { offset, size } = self.include {
            writer.write_u32::<LE>(offset)?;
            writer.write_u32::<LE>(size)?;
        }
        writer.write_u8(self.sound_type as u8)?;
        self.structure.write(writer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionParameter {
    pub param_type: u8,
    pub value: ParamValue,
}

/// Typed tail for the action types this toolkit decodes; everything else
/// lands in the opaque trailing bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionTail {
    SetState { state_group_id: u32, state_id: u32 },
    SetSwitch { switch_group_id: u32, switch_id: u32 },
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventActionObject {
    pub scope: u8,
    pub action_type: u8,
    pub game_object_id: u32,
    pub unk_field8_1: u8,
    pub additional_parameters: Vec<ActionParameter>,
    pub unk_field8_2: u8,
    pub tail: ActionTail,
    pub unk_data: Vec<u8>,
}

impl EventActionObject {
    fn read(cursor: &mut Cursor<&[u8]>, payload_len: u64) -> Result<Self> {
        let scope = cursor.read_u8()?;
        let action_type = cursor.read_u8()?;
        let game_object_id = cursor.read_u32::<LE>()?;
        let unk_field8_1 = cursor.read_u8()?;

        let count = cursor.read_u8()?;
        let mut param_types = Vec::with_capacity(count as usize);
        for _ in 0..count {
            param_types.push(cursor.read_u8()?);
        }
        let mut additional_parameters = Vec::with_capacity(count as usize);
        for param_type in param_types {
            let value = if param_type == 0x10 {
                ParamValue::read_float(cursor)?
            } else {
                ParamValue::read_uint(cursor)?
            };
            additional_parameters.push(ActionParameter { param_type, value });
        }

        let unk_field8_2 = cursor.read_u8()?;

        let tail = match action_type {
            ACTION_TYPE_SET_STATE => ActionTail::SetState {
                state_group_id: cursor.read_u32::<LE>()?,
                state_id: cursor.read_u32::<LE>()?,
            },
            ACTION_TYPE_SET_SWITCH => ActionTail::SetSwitch {
                switch_group_id: cursor.read_u32::<LE>()?,
                switch_id: cursor.read_u32::<LE>()?,
            },
            _ => ActionTail::None,
        };

        let remaining = payload_len - cursor.position();
        let unk_data = cursor.read_bytes(remaining as usize)?;

        Ok(EventActionObject {
            scope,
            action_type,
            game_object_id,
            unk_field8_1,
            additional_parameters,
            unk_field8_2,
            tail,
            unk_data,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.scope)?;
        writer.write_u8(self.action_type)?;
        writer.write_u32::<LE>(self.game_object_id)?;
        writer.write_u8(self.unk_field8_1)?;

        writer.write_u8(self.additional_parameters.len() as u8)?;
        for parameter in &self.additional_parameters {
            writer.write_u8(parameter.param_type)?;
        }
        for parameter in &self.additional_parameters {
            parameter.value.write(writer)?;
        }

        writer.write_u8(self.unk_field8_2)?;

        match &self.tail {
            ActionTail::SetState {
                state_group_id,
                state_id,
            } => {
                writer.write_u32::<LE>(*state_group_id)?;
                writer.write_u32::<LE>(*state_id)?;
            }
            ActionTail::SetSwitch {
                switch_group_id,
                switch_id,
            } => {
                writer.write_u32::<LE>(*switch_group_id)?;
                writer.write_u32::<LE>(*switch_id)?;
            }
            ActionTail::None => {}
        }

        writer.write_all(&self.unk_data)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventObject {
    pub action_ids: Vec<u32>,
}

impl EventObject {
    fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let count = reader.read_u32::<LE>()?;
        let mut action_ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            action_ids.push(reader.read_u32::<LE>()?);
        }
        Ok(EventObject { action_ids })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LE>(self.action_ids.len() as u32)?;
        for action_id in &self.action_ids {
            writer.write_u32::<LE>(*action_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicSegmentObject {
    pub structure: SoundStructure,
    pub child_ids: Vec<u32>,
    pub unk_double_1: f64,
    pub unk_field64_1: u64,
    pub tempo: f32,
    pub time_sig1: u8,
    pub time_sig2: u8,
    pub unk_field32_1: u32,
    pub unk_field8_1: u8,
    pub time_length: f64,
    pub unk_field32_2: u32,
    pub unk_field32_3: u32,
    pub unk_field64_2: u64,
    pub unk_field32_4: u32,
    pub unk_field32_5: u32,
    pub time_length_next: f64,
    pub unk_field32_6: u32,
    pub unk_data: Vec<u8>,
}

impl MusicSegmentObject {
    fn read(cursor: &mut Cursor<&[u8]>, payload_len: u64) -> Result<Self> {
        let structure = SoundStructure::read(cursor)?;

        let children = cursor.read_u32::<LE>()?;
        let mut child_ids = Vec::with_capacity(children as usize);
        for _ in 0..children {
            child_ids.push(cursor.read_u32::<LE>()?);
        }

        let unk_double_1 = cursor.read_f64::<LE>()?;
        let unk_field64_1 = cursor.read_u64::<LE>()?;
        let tempo = cursor.read_f32::<LE>()?;
        let time_sig1 = cursor.read_u8()?;
        let time_sig2 = cursor.read_u8()?;
        let unk_field32_1 = cursor.read_u32::<LE>()?;
        let unk_field8_1 = cursor.read_u8()?;
        let time_length = cursor.read_f64::<LE>()?;
        let unk_field32_2 = cursor.read_u32::<LE>()?;
        let unk_field32_3 = cursor.read_u32::<LE>()?;
        let unk_field64_2 = cursor.read_u64::<LE>()?;
        let unk_field32_4 = cursor.read_u32::<LE>()?;
        let unk_field32_5 = cursor.read_u32::<LE>()?;
        let time_length_next = cursor.read_f64::<LE>()?;
        let unk_field32_6 = cursor.read_u32::<LE>()?;

        let remaining = payload_len - cursor.position();
        let unk_data = cursor.read_bytes(remaining as usize)?;

        Ok(MusicSegmentObject {
            structure,
            child_ids,
            unk_double_1,
            unk_field64_1,
            tempo,
            time_sig1,
            time_sig2,
            unk_field32_1,
            unk_field8_1,
            time_length,
            unk_field32_2,
            unk_field32_3,
            unk_field64_2,
            unk_field32_4,
            unk_field32_5,
            time_length_next,
            unk_field32_6,
            unk_data,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.structure.write(writer)?;

        writer.write_u32::<LE>(self.child_ids.len() as u32)?;
        for child_id in &self.child_ids {
            writer.write_u32::<LE>(*child_id)?;
        }

        writer.write_f64::<LE>(self.unk_double_1)?;
        writer.write_u64::<LE>(self.unk_field64_1)?;
        writer.write_f32::<LE>(self.tempo)?;
        writer.write_u8(self.time_sig1)?;
        writer.write_u8(self.time_sig2)?;
        writer.write_u32::<LE>(self.unk_field32_1)?;
        writer.write_u8(self.unk_field8_1)?;
        writer.write_f64::<LE>(self.time_length)?;
        writer.write_u32::<LE>(self.unk_field32_2)?;
        writer.write_u32::<LE>(self.unk_field32_3)?;
        writer.write_u64::<LE>(self.unk_field64_2)?;
        writer.write_u32::<LE>(self.unk_field32_4)?;
        writer.write_u32::<LE>(self.unk_field32_5)?;
        writer.write_f64::<LE>(self.time_length_next)?;
        writer.write_u32::<LE>(self.unk_field32_6)?;
        writer.write_all(&self.unk_data)?;
        Ok(())
    }
}

/// The audio-source block present when `id1 > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicTrackSource {
    pub id2: u32,
    pub unk_field32_4: u32,
    pub unk_field32_5: u32,
    pub unk_field8_1: u8,
    pub id3: u32,
    pub unk_field64_1: u64,
    pub unk_field64_2: u64,
    pub unk_field64_3: u64,
    pub time_length: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicTrackObject {
    pub unk_field32_1: u32,
    pub unk_field32_2: u32,
    pub unk_field32_3: u32,
    /// Audio-source id; zero means the track carries no source block.
    pub id1: u32,
    pub source: Option<MusicTrackSource>,
    pub unk_data: Vec<u8>,
}

impl MusicTrackObject {
    fn read(cursor: &mut Cursor<&[u8]>, payload_len: u64) -> Result<Self> {
        let unk_field32_1 = cursor.read_u32::<LE>()?;
        let unk_field32_2 = cursor.read_u32::<LE>()?;
        let unk_field32_3 = cursor.read_u32::<LE>()?;
        let id1 = cursor.read_u32::<LE>()?;

        let source = if id1 > 0 {
            Some(MusicTrackSource {
                id2: cursor.read_u32::<LE>()?,
                unk_field32_4: cursor.read_u32::<LE>()?,
                unk_field32_5: cursor.read_u32::<LE>()?,
                unk_field8_1: cursor.read_u8()?,
                id3: cursor.read_u32::<LE>()?,
                unk_field64_1: cursor.read_u64::<LE>()?,
                unk_field64_2: cursor.read_u64::<LE>()?,
                unk_field64_3: cursor.read_u64::<LE>()?,
                time_length: cursor.read_f64::<LE>()?,
            })
        } else {
            None
        };

        let remaining = payload_len - cursor.position();
        let unk_data = cursor.read_bytes(remaining as usize)?;

        Ok(MusicTrackObject {
            unk_field32_1,
            unk_field32_2,
            unk_field32_3,
            id1,
            source,
            unk_data,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LE>(self.unk_field32_1)?;
        writer.write_u32::<LE>(self.unk_field32_2)?;
        writer.write_u32::<LE>(self.unk_field32_3)?;
        writer.write_u32::<LE>(self.id1)?;

        if self.id1 > 0 {
            let source = self
                .source
                .as_ref()
                .ok_or(BnkError::BadInvariant("music track with id1 but no source"))?;
            writer.write_u32::<LE>(source.id2)?;
            writer.write_u32::<LE>(source.unk_field32_4)?;
            writer.write_u32::<LE>(source.unk_field32_5)?;
            writer.write_u8(source.unk_field8_1)?;
            writer.write_u32::<LE>(source.id3)?;
            writer.write_u64::<LE>(source.unk_field64_1)?;
            writer.write_u64::<LE>(source.unk_field64_2)?;
            writer.write_u64::<LE>(source.unk_field64_3)?;
            writer.write_f64::<LE>(source.time_length)?;
        }

        writer.write_all(&self.unk_data)?;
        Ok(())
    }
}

/// Music track emitted by the injection paths: a fixed 25-field layout
/// derived from the audio id, the track duration, and the parent segment.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMusicTrack {
    pub audio_id: u32,
    pub time_length: f64,
    pub parent: u32,
}

impl CustomMusicTrack {
    pub fn new(audio_id: u32, time_length: f64, parent: u32) -> Self {
        CustomMusicTrack {
            audio_id,
            time_length,
            parent,
        }
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LE>(1)?;
        writer.write_u32::<LE>(0x0004_0001)?;
        writer.write_u32::<LE>(1)?;
        writer.write_u32::<LE>(self.audio_id)?; // id1
        writer.write_u32::<LE>(self.audio_id)?; // id2
        writer.write_u32::<LE>(0x0000_0100)?;
        writer.write_u32::<LE>(0)?;
        writer.write_u8(0)?;
        writer.write_u32::<LE>(self.audio_id)?; // id3
        writer.write_u64::<LE>(0)?;
        writer.write_u64::<LE>(0)?;
        writer.write_u64::<LE>(0x8000_0000_0000_0000)?;
        writer.write_f64::<LE>(self.time_length)?;
        writer.write_u32::<LE>(1)?;
        writer.write_u64::<LE>(0)?;
        writer.write_u16::<LE>(0)?;
        writer.write_u32::<LE>(self.parent)?;
        writer.write_u64::<LE>(0)?;
        writer.write_u8(0)?;
        writer.write_u32::<LE>(1)?;
        writer.write_u64::<LE>(0)?;
        writer.write_u64::<LE>(0)?;
        writer.write_u16::<LE>(0)?;
        writer.write_u8(0)?;
        writer.write_u32::<LE>(0x0000_0064)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistTransition {
    pub source_id: u32,
    pub dest_id: u32,
    pub source_fadeout: i32,
    pub source_shape_curve_fadeout: u32,
    pub source_fadeout_offset: i32,
    pub unk_field32_1: u32,
    pub unk_field32_2: u32,
    pub unk_field32_3: u32,
    pub src_type: u8,
    pub dest_fadein: i32,
    pub dest_shape_curve_fadein: u32,
    pub dest_fadein_offset: i32,
    pub unk_field32_4: u32,
    pub unk_field32_5: u32,
    pub unk_field16_1: u16,
    pub dest_type: u8,
    pub unk_field8_1: u8,
    pub has_segment: bool,
    pub trans_segment_id: u32,
    pub trans_fadein: i32,
    pub trans_shape_curve_fadein: u32,
    pub trans_fadein_offset: i32,
    pub trans_fadeout: i32,
    pub trans_shape_curve_fadeout: u32,
    pub trans_fadeout_offset: i32,
    pub trans_fadein_type: u8,
    pub trans_fadeout_type: u8,
}

impl PlaylistTransition {
    fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(PlaylistTransition {
            source_id: reader.read_u32::<LE>()?,
            dest_id: reader.read_u32::<LE>()?,
            source_fadeout: reader.read_i32::<LE>()?,
            source_shape_curve_fadeout: reader.read_u32::<LE>()?,
            source_fadeout_offset: reader.read_i32::<LE>()?,
            unk_field32_1: reader.read_u32::<LE>()?,
            unk_field32_2: reader.read_u32::<LE>()?,
            unk_field32_3: reader.read_u32::<LE>()?,
            src_type: reader.read_u8()?,
            dest_fadein: reader.read_i32::<LE>()?,
            dest_shape_curve_fadein: reader.read_u32::<LE>()?,
            dest_fadein_offset: reader.read_i32::<LE>()?,
            unk_field32_4: reader.read_u32::<LE>()?,
            unk_field32_5: reader.read_u32::<LE>()?,
            unk_field16_1: reader.read_u16::<LE>()?,
            dest_type: reader.read_u8()?,
            unk_field8_1: reader.read_u8()?,
            has_segment: reader.read_bool()?,
            trans_segment_id: reader.read_u32::<LE>()?,
            trans_fadein: reader.read_i32::<LE>()?,
            trans_shape_curve_fadein: reader.read_u32::<LE>()?,
            trans_fadein_offset: reader.read_i32::<LE>()?,
            trans_fadeout: reader.read_i32::<LE>()?,
            trans_shape_curve_fadeout: reader.read_u32::<LE>()?,
            trans_fadeout_offset: reader.read_i32::<LE>()?,
            trans_fadein_type: reader.read_u8()?,
            trans_fadeout_type: reader.read_u8()?,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LE>(self.source_id)?;
        writer.write_u32::<LE>(self.dest_id)?;
        writer.write_i32::<LE>(self.source_fadeout)?;
        writer.write_u32::<LE>(self.source_shape_curve_fadeout)?;
        writer.write_i32::<LE>(self.source_fadeout_offset)?;
        writer.write_u32::<LE>(self.unk_field32_1)?;
        writer.write_u32::<LE>(self.unk_field32_2)?;
        writer.write_u32::<LE>(self.unk_field32_3)?;
        writer.write_u8(self.src_type)?;
        writer.write_i32::<LE>(self.dest_fadein)?;
        writer.write_u32::<LE>(self.dest_shape_curve_fadein)?;
        writer.write_i32::<LE>(self.dest_fadein_offset)?;
        writer.write_u32::<LE>(self.unk_field32_4)?;
        writer.write_u32::<LE>(self.unk_field32_5)?;
        writer.write_u16::<LE>(self.unk_field16_1)?;
        writer.write_u8(self.dest_type)?;
        writer.write_u8(self.unk_field8_1)?;
        writer.write_bool(self.has_segment)?;
        writer.write_u32::<LE>(self.trans_segment_id)?;
        writer.write_i32::<LE>(self.trans_fadein)?;
        writer.write_u32::<LE>(self.trans_shape_curve_fadein)?;
        writer.write_i32::<LE>(self.trans_fadein_offset)?;
        writer.write_i32::<LE>(self.trans_fadeout)?;
        writer.write_u32::<LE>(self.trans_shape_curve_fadeout)?;
        writer.write_i32::<LE>(self.trans_fadeout_offset)?;
        writer.write_u8(self.trans_fadein_type)?;
        writer.write_u8(self.trans_fadeout_type)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistElement {
    pub music_segment_id: u32,
    pub id: u32,
    pub child_elements: u32,
    pub playlist_type: i32,
    pub loop_count: u16,
    pub weight: u32,
    pub times_in_row: u16,
    pub unk_field8_1: u8,
    pub random_type: u8,
}

impl PlaylistElement {
    fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(PlaylistElement {
            music_segment_id: reader.read_u32::<LE>()?,
            id: reader.read_u32::<LE>()?,
            child_elements: reader.read_u32::<LE>()?,
            playlist_type: reader.read_i32::<LE>()?,
            loop_count: reader.read_u16::<LE>()?,
            weight: reader.read_u32::<LE>()?,
            times_in_row: reader.read_u16::<LE>()?,
            unk_field8_1: reader.read_u8()?,
            random_type: reader.read_u8()?,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LE>(self.music_segment_id)?;
        writer.write_u32::<LE>(self.id)?;
        writer.write_u32::<LE>(self.child_elements)?;
        writer.write_i32::<LE>(self.playlist_type)?;
        writer.write_u16::<LE>(self.loop_count)?;
        writer.write_u32::<LE>(self.weight)?;
        writer.write_u16::<LE>(self.times_in_row)?;
        writer.write_u8(self.unk_field8_1)?;
        writer.write_u8(self.random_type)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicPlaylistObject {
    pub structure: SoundStructure,
    pub segment_ids: Vec<u32>,
    pub unk_double_1: f64,
    pub unk_field64_1: u64,
    pub tempo: f32,
    pub time_sig1: u8,
    pub time_sig2: u8,
    pub unk_field8_1: u8,
    pub unk_field32_1: u32,
    pub transitions: Vec<PlaylistTransition>,
    /// Stored element count; does not match the element array and is
    /// preserved verbatim. The real count is the remaining payload divided
    /// by the element size.
    pub playlist_elements_count: u32,
    pub elements: Vec<PlaylistElement>,
}

impl MusicPlaylistObject {
    fn read(cursor: &mut Cursor<&[u8]>, payload_len: u64) -> Result<Self> {
        let structure = SoundStructure::read(cursor)?;

        let segments = cursor.read_u32::<LE>()?;
        let mut segment_ids = Vec::with_capacity(segments as usize);
        for _ in 0..segments {
            segment_ids.push(cursor.read_u32::<LE>()?);
        }

        let unk_double_1 = cursor.read_f64::<LE>()?;
        let unk_field64_1 = cursor.read_u64::<LE>()?;
        let tempo = cursor.read_f32::<LE>()?;
        let time_sig1 = cursor.read_u8()?;
        let time_sig2 = cursor.read_u8()?;
        let unk_field8_1 = cursor.read_u8()?;
        let unk_field32_1 = cursor.read_u32::<LE>()?;

        let transition_count = cursor.read_u32::<LE>()?;
        let mut transitions = Vec::with_capacity(transition_count as usize);
        for _ in 0..transition_count {
            transitions.push(PlaylistTransition::read(cursor)?);
        }

        let playlist_elements_count = cursor.read_u32::<LE>()?;
        let element_count = (payload_len - cursor.position()) / PLAYLIST_ELEMENT_SIZE;
        let mut elements = Vec::with_capacity(element_count as usize);
        for _ in 0..element_count {
            elements.push(PlaylistElement::read(cursor)?);
        }

        Ok(MusicPlaylistObject {
            structure,
            segment_ids,
            unk_double_1,
            unk_field64_1,
            tempo,
            time_sig1,
            time_sig2,
            unk_field8_1,
            unk_field32_1,
            transitions,
            playlist_elements_count,
            elements,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.structure.write(writer)?;

        writer.write_u32::<LE>(self.segment_ids.len() as u32)?;
        for segment_id in &self.segment_ids {
            writer.write_u32::<LE>(*segment_id)?;
        }

        writer.write_f64::<LE>(self.unk_double_1)?;
        writer.write_u64::<LE>(self.unk_field64_1)?;
        writer.write_f32::<LE>(self.tempo)?;
        writer.write_u8(self.time_sig1)?;
        writer.write_u8(self.time_sig2)?;
        writer.write_u8(self.unk_field8_1)?;
        writer.write_u32::<LE>(self.unk_field32_1)?;

        writer.write_u32::<LE>(self.transitions.len() as u32)?;
        for transition in &self.transitions {
            transition.write(writer)?;
        }

        writer.write_u32::<LE>(self.playlist_elements_count)?;
        for element in &self.elements {
            element.write(writer)?;
        }

        Ok(())
    }
}
