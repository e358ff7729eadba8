//! The routing/positioning/priority sub-record shared by sound and music
//! objects. Every optional section is gated by an inline boolean or
//! counter; read and write are exact inverses.

use crate::error::Result;
use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use utils::{BinReadExt, BinWriteExt};

/// A 32-bit parameter slot whose interpretation depends on the type byte
/// next to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Uint(u32),
    Float(f32),
}

impl ParamValue {
    pub fn read_uint<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(ParamValue::Uint(reader.read_u32::<LE>()?))
    }

    pub fn read_float<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(ParamValue::Float(reader.read_f32::<LE>()?))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            ParamValue::Uint(value) => writer.write_u32::<LE>(*value)?,
            ParamValue::Float(value) => writer.write_f32::<LE>(*value)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub index: u8,
    pub id: u32,
    pub unk_field16_1: u16,
}

/// Effects block; present only when the effect count is non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Effects {
    pub bitmask: u8,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalParameter {
    pub param_type: u8,
    pub value: ParamValue,
}

/// Positioning sub-record; the shape follows the positioning type byte.
#[derive(Debug, Clone, PartialEq)]
pub enum Positioning {
    /// Type 0x2D.
    TwoDimensional { enable_panner: bool },
    /// Type 0x3D.
    ThreeDimensional {
        attenuation_id: u32,
        enable_spatialization: bool,
        source: PositionSource,
    },
    /// Type 0x01.
    Legacy { unk_field16_1: u16 },
    /// Any other type byte: two undecoded words.
    Other {
        positioning_type: u8,
        unk_field32_1: u32,
        unk_field32_2: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionSource {
    /// Source 0x02: user-defined automation.
    UserDefined {
        play_type: u32,
        do_loop: bool,
        transition_time: u32,
        follow_listener_orientation: bool,
    },
    /// Source 0x03: game-defined position.
    GameDefined { update_at_each_frame: bool },
    Other(u32),
}

impl PositionSource {
    fn tag(&self) -> u32 {
        match self {
            PositionSource::UserDefined { .. } => 0x02,
            PositionSource::GameDefined { .. } => 0x03,
            PositionSource::Other(tag) => *tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceLimit {
    pub priority_equal: u8,
    pub limit_reached: u8,
    pub limit_sound_instances: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateGroupBinding {
    pub id: u32,
    pub change_occurs: u8,
    pub states: Vec<StateBinding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateBinding {
    pub id: u32,
    pub object_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rtpc {
    pub x_axis_id: u32,
    pub y_axis_type: u32,
    pub unk_field32_1: u32,
    pub unk_field8_1: u8,
    pub unk_field8_2: u8,
    pub points: Vec<RtpcPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RtpcPoint {
    pub x: f32,
    pub y: f32,
    pub curve_shape: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundStructure {
    pub effects_override: bool,
    pub effects: Option<Effects>,
    pub output_bus_id: u32,
    pub parent_id: u32,
    pub override_playback_priority: bool,
    pub offset_priority: bool,
    pub additional_parameters: Vec<AdditionalParameter>,
    pub unk_field8_1: u8,
    pub positioning: Option<Positioning>,
    pub override_game_auxiliary_sends: bool,
    pub use_game_auxiliary_sends: bool,
    pub override_user_auxiliary_sends: bool,
    pub user_auxiliary_sends: Option<[u32; 4]>,
    pub voice_limit: Option<VoiceLimit>,
    pub how_to_limit_sound_instances: u8,
    pub virtual_voice_behavior: u8,
    pub override_playback_limit: bool,
    pub override_virtual_voice: bool,
    pub state_groups: Vec<StateGroupBinding>,
    pub rtpcs: Vec<Rtpc>,
    pub unk_field32_3: u32,
    /// Exactly 0x3F undecoded bytes, present iff `unk_field32_3 != 0`.
    pub unk_data: Option<Vec<u8>>,
}

impl SoundStructure {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let effects_override = reader.read_bool()?;
        let effects_count = reader.read_u8()?;
        let effects = if effects_count > 0 {
            let bitmask = reader.read_u8()?;
            let mut effects = Vec::with_capacity(effects_count as usize);
            for _ in 0..effects_count {
                effects.push(Effect {
                    index: reader.read_u8()?,
                    id: reader.read_u32::<LE>()?,
                    unk_field16_1: reader.read_u16::<LE>()?,
                });
            }
            Some(Effects { bitmask, effects })
        } else {
            None
        };

        let output_bus_id = reader.read_u32::<LE>()?;
        let parent_id = reader.read_u32::<LE>()?;
        let override_playback_priority = reader.read_bool()?;
        let offset_priority = reader.read_bool()?;

        // Two passes over the same list: type bytes first, then values.
        let additional_count = reader.read_u8()?;
        let mut param_types = Vec::with_capacity(additional_count as usize);
        for _ in 0..additional_count {
            param_types.push(reader.read_u8()?);
        }
        let mut additional_parameters = Vec::with_capacity(additional_count as usize);
        for param_type in param_types {
            let value = if param_type == 0x07 {
                ParamValue::read_uint(reader)?
            } else {
                ParamValue::read_float(reader)?
            };
            additional_parameters.push(AdditionalParameter { param_type, value });
        }

        let unk_field8_1 = reader.read_u8()?;

        let positioning = if reader.read_bool()? {
            let positioning_type = reader.read_u8()?;
            Some(match positioning_type {
                0x2D => Positioning::TwoDimensional {
                    enable_panner: reader.read_bool()?,
                },
                0x3D => {
                    let source_tag = reader.read_u32::<LE>()?;
                    let attenuation_id = reader.read_u32::<LE>()?;
                    let enable_spatialization = reader.read_bool()?;
                    let source = match source_tag {
                        0x02 => PositionSource::UserDefined {
                            play_type: reader.read_u32::<LE>()?,
                            do_loop: reader.read_bool()?,
                            transition_time: reader.read_u32::<LE>()?,
                            follow_listener_orientation: reader.read_bool()?,
                        },
                        0x03 => PositionSource::GameDefined {
                            update_at_each_frame: reader.read_bool()?,
                        },
                        other => PositionSource::Other(other),
                    };
                    Positioning::ThreeDimensional {
                        attenuation_id,
                        enable_spatialization,
                        source,
                    }
                }
                0x01 => Positioning::Legacy {
                    unk_field16_1: reader.read_u16::<LE>()?,
                },
                other => Positioning::Other {
                    positioning_type: other,
                    unk_field32_1: reader.read_u32::<LE>()?,
                    unk_field32_2: reader.read_u32::<LE>()?,
                },
            })
        } else {
            None
        };

        let override_game_auxiliary_sends = reader.read_bool()?;
        let use_game_auxiliary_sends = reader.read_bool()?;
        let override_user_auxiliary_sends = reader.read_bool()?;
        let user_auxiliary_sends = if reader.read_bool()? {
            Some([
                reader.read_u32::<LE>()?,
                reader.read_u32::<LE>()?,
                reader.read_u32::<LE>()?,
                reader.read_u32::<LE>()?,
            ])
        } else {
            None
        };

        let voice_limit = if reader.read_bool()? {
            Some(VoiceLimit {
                priority_equal: reader.read_u8()?,
                limit_reached: reader.read_u8()?,
                limit_sound_instances: reader.read_u16::<LE>()?,
            })
        } else {
            None
        };

        let how_to_limit_sound_instances = reader.read_u8()?;
        let virtual_voice_behavior = reader.read_u8()?;
        let override_playback_limit = reader.read_bool()?;
        let override_virtual_voice = reader.read_bool()?;

        let state_group_count = reader.read_u32::<LE>()?;
        let mut state_groups = Vec::with_capacity(state_group_count as usize);
        for _ in 0..state_group_count {
            let id = reader.read_u32::<LE>()?;
            let change_occurs = reader.read_u8()?;
            let different = reader.read_u16::<LE>()?;
            let mut states = Vec::with_capacity(different as usize);
            for _ in 0..different {
                states.push(StateBinding {
                    id: reader.read_u32::<LE>()?,
                    object_id: reader.read_u32::<LE>()?,
                });
            }
            state_groups.push(StateGroupBinding {
                id,
                change_occurs,
                states,
            });
        }

        let rtpc_count = reader.read_u16::<LE>()?;
        let mut rtpcs = Vec::with_capacity(rtpc_count as usize);
        for _ in 0..rtpc_count {
            let x_axis_id = reader.read_u32::<LE>()?;
            let y_axis_type = reader.read_u32::<LE>()?;
            let unk_field32_1 = reader.read_u32::<LE>()?;
            let unk_field8_1 = reader.read_u8()?;
            let points_count = reader.read_u8()?;
            let unk_field8_2 = reader.read_u8()?;
            let mut points = Vec::with_capacity(points_count as usize);
            for _ in 0..points_count {
                points.push(RtpcPoint {
                    x: reader.read_f32::<LE>()?,
                    y: reader.read_f32::<LE>()?,
                    curve_shape: reader.read_u32::<LE>()?,
                });
            }
            rtpcs.push(Rtpc {
                x_axis_id,
                y_axis_type,
                unk_field32_1,
                unk_field8_1,
                unk_field8_2,
                points,
            });
        }

        let unk_field32_3 = reader.read_u32::<LE>()?;
        let unk_data = if unk_field32_3 > 0 {
            Some(reader.read_bytes(0x3F)?)
        } else {
            None
        };

        Ok(SoundStructure {
            effects_override,
            effects,
            output_bus_id,
            parent_id,
            override_playback_priority,
            offset_priority,
            additional_parameters,
            unk_field8_1,
            positioning,
            override_game_auxiliary_sends,
            use_game_auxiliary_sends,
            override_user_auxiliary_sends,
            user_auxiliary_sends,
            voice_limit,
            how_to_limit_sound_instances,
            virtual_voice_behavior,
            override_playback_limit,
            override_virtual_voice,
            state_groups,
            rtpcs,
            unk_field32_3,
            unk_data,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_bool(self.effects_override)?;
        match &self.effects {
            Some(block) => {
                writer.write_u8(block.effects.len() as u8)?;
                writer.write_u8(block.bitmask)?;
                for effect in &block.effects {
                    writer.write_u8(effect.index)?;
                    writer.write_u32::<LE>(effect.id)?;
                    writer.write_u16::<LE>(effect.unk_field16_1)?;
                }
            }
            None => writer.write_u8(0)?,
        }

        writer.write_u32::<LE>(self.output_bus_id)?;
        writer.write_u32::<LE>(self.parent_id)?;
        writer.write_bool(self.override_playback_priority)?;
        writer.write_bool(self.offset_priority)?;

        writer.write_u8(self.additional_parameters.len() as u8)?;
        for parameter in &self.additional_parameters {
            writer.write_u8(parameter.param_type)?;
        }
        for parameter in &self.additional_parameters {
            parameter.value.write(writer)?;
        }

        writer.write_u8(self.unk_field8_1)?;

        match &self.positioning {
            Some(positioning) => {
                writer.write_bool(true)?;
                match positioning {
                    Positioning::TwoDimensional { enable_panner } => {
                        writer.write_u8(0x2D)?;
                        writer.write_bool(*enable_panner)?;
                    }
                    Positioning::ThreeDimensional {
                        attenuation_id,
                        enable_spatialization,
                        source,
                    } => {
                        writer.write_u8(0x3D)?;
                        writer.write_u32::<LE>(source.tag())?;
                        writer.write_u32::<LE>(*attenuation_id)?;
                        writer.write_bool(*enable_spatialization)?;
                        match source {
                            PositionSource::UserDefined {
                                play_type,
                                do_loop,
                                transition_time,
                                follow_listener_orientation,
                            } => {
                                writer.write_u32::<LE>(*play_type)?;
                                writer.write_bool(*do_loop)?;
                                writer.write_u32::<LE>(*transition_time)?;
                                writer.write_bool(*follow_listener_orientation)?;
                            }
                            PositionSource::GameDefined {
                                update_at_each_frame,
                            } => {
                                writer.write_bool(*update_at_each_frame)?;
                            }
                            PositionSource::Other(_) => {}
                        }
                    }
                    Positioning::Legacy { unk_field16_1 } => {
                        writer.write_u8(0x01)?;
                        writer.write_u16::<LE>(*unk_field16_1)?;
                    }
                    Positioning::Other {
                        positioning_type,
                        unk_field32_1,
                        unk_field32_2,
                    } => {
                        writer.write_u8(*positioning_type)?;
                        writer.write_u32::<LE>(*unk_field32_1)?;
                        writer.write_u32::<LE>(*unk_field32_2)?;
                    }
                }
            }
            None => writer.write_bool(false)?,
        }

        writer.write_bool(self.override_game_auxiliary_sends)?;
        writer.write_bool(self.use_game_auxiliary_sends)?;
        writer.write_bool(self.override_user_auxiliary_sends)?;
        match &self.user_auxiliary_sends {
            Some(bus_ids) => {
                writer.write_bool(true)?;
                for bus_id in bus_ids {
                    writer.write_u32::<LE>(*bus_id)?;
                }
            }
            None => writer.write_bool(false)?,
        }

        match &self.voice_limit {
            Some(limit) => {
                writer.write_bool(true)?;
                writer.write_u8(limit.priority_equal)?;
                writer.write_u8(limit.limit_reached)?;
                writer.write_u16::<LE>(limit.limit_sound_instances)?;
            }
            None => writer.write_bool(false)?,
        }

        writer.write_u8(self.how_to_limit_sound_instances)?;
        writer.write_u8(self.virtual_voice_behavior)?;
        writer.write_bool(self.override_playback_limit)?;
        writer.write_bool(self.override_virtual_voice)?;

        writer.write_u32::<LE>(self.state_groups.len() as u32)?;
        for group in &self.state_groups {
            writer.write_u32::<LE>(group.id)?;
            writer.write_u8(group.change_occurs)?;
            writer.write_u16::<LE>(group.states.len() as u16)?;
            for state in &group.states {
                writer.write_u32::<LE>(state.id)?;
                writer.write_u32::<LE>(state.object_id)?;
            }
        }

        writer.write_u16::<LE>(self.rtpcs.len() as u16)?;
        for rtpc in &self.rtpcs {
            writer.write_u32::<LE>(rtpc.x_axis_id)?;
            writer.write_u32::<LE>(rtpc.y_axis_type)?;
            writer.write_u32::<LE>(rtpc.unk_field32_1)?;
            writer.write_u8(rtpc.unk_field8_1)?;
            writer.write_u8(rtpc.points.len() as u8)?;
            writer.write_u8(rtpc.unk_field8_2)?;
            for point in &rtpc.points {
                writer.write_f32::<LE>(point.x)?;
                writer.write_f32::<LE>(point.y)?;
                writer.write_u32::<LE>(point.curve_shape)?;
            }
        }

        writer.write_u32::<LE>(self.unk_field32_3)?;
        if let Some(unk_data) = &self.unk_data {
            writer.write_all(unk_data)?;
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }

    /// A minimal structure with every optional section absent, used as the
    /// base when synthesising objects in tests.
    pub fn empty() -> Self {
        SoundStructure {
            effects_override: false,
            effects: None,
            output_bus_id: 0,
            parent_id: 0,
            override_playback_priority: false,
            offset_priority: false,
            additional_parameters: Vec::new(),
            unk_field8_1: 0,
            positioning: None,
            override_game_auxiliary_sends: false,
            use_game_auxiliary_sends: false,
            override_user_auxiliary_sends: false,
            user_auxiliary_sends: None,
            voice_limit: None,
            how_to_limit_sound_instances: 0,
            virtual_voice_behavior: 0,
            override_playback_limit: false,
            override_virtual_voice: false,
            state_groups: Vec::new(),
            rtpcs: Vec::new(),
            unk_field32_3: 0,
            unk_data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(structure: &SoundStructure) {
        let bytes = structure.to_bytes().unwrap();
        let reparsed = SoundStructure::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(&reparsed, structure);
        assert_eq!(reparsed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn empty_structure_round_trips() {
        round_trip(&SoundStructure::empty());
    }

    #[test]
    fn fully_populated_structure_round_trips() {
        let structure = SoundStructure {
            effects_override: true,
            effects: Some(Effects {
                bitmask: 0x03,
                effects: vec![Effect {
                    index: 0,
                    id: 0x1234,
                    unk_field16_1: 7,
                }],
            }),
            output_bus_id: 0xAABBCCDD,
            parent_id: 42,
            override_playback_priority: true,
            offset_priority: false,
            additional_parameters: vec![
                AdditionalParameter {
                    param_type: 0x07,
                    value: ParamValue::Uint(100),
                },
                AdditionalParameter {
                    param_type: 0x00,
                    value: ParamValue::Float(-9.5),
                },
            ],
            unk_field8_1: 1,
            positioning: Some(Positioning::ThreeDimensional {
                attenuation_id: 9,
                enable_spatialization: true,
                source: PositionSource::UserDefined {
                    play_type: 2,
                    do_loop: true,
                    transition_time: 500,
                    follow_listener_orientation: false,
                },
            }),
            override_game_auxiliary_sends: false,
            use_game_auxiliary_sends: true,
            override_user_auxiliary_sends: false,
            user_auxiliary_sends: Some([1, 2, 3, 4]),
            voice_limit: Some(VoiceLimit {
                priority_equal: 1,
                limit_reached: 0,
                limit_sound_instances: 8,
            }),
            how_to_limit_sound_instances: 1,
            virtual_voice_behavior: 2,
            override_playback_limit: false,
            override_virtual_voice: true,
            state_groups: vec![StateGroupBinding {
                id: 77,
                change_occurs: 1,
                states: vec![StateBinding {
                    id: 5,
                    object_id: 6,
                }],
            }],
            rtpcs: vec![Rtpc {
                x_axis_id: 11,
                y_axis_type: 2,
                unk_field32_1: 0,
                unk_field8_1: 0,
                unk_field8_2: 4,
                points: vec![
                    RtpcPoint {
                        x: 0.0,
                        y: 1.0,
                        curve_shape: 9,
                    },
                    RtpcPoint {
                        x: 100.0,
                        y: 0.25,
                        curve_shape: 4,
                    },
                ],
            }],
            unk_field32_3: 1,
            unk_data: Some(vec![0xEE; 0x3F]),
        };

        round_trip(&structure);
    }

    #[test]
    fn positioning_variants_round_trip() {
        let mut structure = SoundStructure::empty();
        for positioning in [
            Positioning::TwoDimensional {
                enable_panner: true,
            },
            Positioning::Legacy { unk_field16_1: 3 },
            Positioning::Other {
                positioning_type: 0x22,
                unk_field32_1: 1,
                unk_field32_2: 2,
            },
            Positioning::ThreeDimensional {
                attenuation_id: 1,
                enable_spatialization: false,
                source: PositionSource::GameDefined {
                    update_at_each_frame: true,
                },
            },
            Positioning::ThreeDimensional {
                attenuation_id: 1,
                enable_spatialization: false,
                source: PositionSource::Other(0x11),
            },
        ] {
            structure.positioning = Some(positioning);
            round_trip(&structure);
        }
    }

    #[test]
    fn truncated_unk_block_fails() {
        let mut structure = SoundStructure::empty();
        structure.unk_field32_3 = 1;
        structure.unk_data = Some(vec![0u8; 0x3F]);
        let mut bytes = structure.to_bytes().unwrap();
        bytes.truncate(bytes.len() - 1);
        assert!(SoundStructure::read(&mut Cursor::new(&bytes)).is_err());
    }
}
