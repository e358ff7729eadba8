use crate::objects::HircObject;

/// The only bank version this toolkit understands.
pub const BANK_VERSION: u32 = 0x58;

#[derive(Debug, Clone, PartialEq)]
pub struct BankHeader {
    pub length: u32,
    pub version: u32,
    pub id: u32,
    pub unk_field32_1: u32,
    pub unk_field32_2: u32,
    /// Trailing header bytes past the known fields, preserved verbatim.
    pub unk_data: Vec<u8>,
}

/// One DIDX entry together with its DATA payload slice.
#[derive(Debug, Clone, PartialEq)]
pub struct DidxEntry {
    pub id: u32,
    pub offset: u32,
    pub size: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataIndex {
    pub length: u32,
    pub entries: Vec<DidxEntry>,
}

impl DataIndex {
    pub fn total_size(&self) -> u32 {
        self.entries.iter().map(|entry| entry.size).sum()
    }

    pub fn entry(&self, id: u32) -> Option<&DidxEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Recompute entry offsets as the running sum of sizes in list order.
    pub fn calculate_offsets(&mut self) {
        let mut offset = 0;
        for entry in &mut self.entries {
            entry.offset = offset;
            offset += entry.size;
        }
    }
}

/// DATA chunk bookkeeping; the payloads live on the DIDX entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DataChunk {
    pub length: u32,
    /// Absolute position of the payload region in the source file.
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HircChunk {
    pub length: u32,
    pub objects: Vec<HircObject>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StidChunk {
    pub length: u32,
    pub unk_field32_1: u32,
    pub quantity: u32,
    /// Name table bytes, preserved verbatim.
    pub remaining: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateGroup {
    pub id: u32,
    pub default_transition_time: u32,
    pub custom_transitions: Vec<CustomTransition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomTransition {
    pub from_id: u32,
    pub to_id: u32,
    pub transition_time: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchGroup {
    pub id: u32,
    pub game_parameter_id: u32,
    pub points: Vec<SwitchPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchPoint {
    pub value: f32,
    pub switch_id: u32,
    pub shape_curve: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameParameter {
    pub id: u32,
    pub default_value: f32,
}

/// STMG chunk of the global (Init-style) bank. Read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct StmgChunk {
    pub length: u32,
    pub volume: f32,
    pub max_voice_instances: u16,
    pub state_groups: Vec<StateGroup>,
    pub switch_groups: Vec<SwitchGroup>,
    pub game_parameters: Vec<GameParameter>,
}

/// ENVS chunk of the global bank, preserved opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvsChunk {
    pub length: u32,
    pub unk_data: Vec<u8>,
}

/// A parsed soundbank. Non-init banks carry DIDX/DATA/HIRC/STID; the
/// global Init-style bank carries STMG/HIRC/ENVS instead and can only be
/// inspected, not rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct Soundbank {
    pub header: BankHeader,
    pub is_init: bool,
    pub data_index: Option<DataIndex>,
    pub data: Option<DataChunk>,
    pub stmg: Option<StmgChunk>,
    pub hirc: HircChunk,
    pub stid: Option<StidChunk>,
    pub envs: Option<EnvsChunk>,
}

impl Soundbank {
    pub fn object_by_id(&self, id: u32) -> Option<&HircObject> {
        self.hirc.objects.iter().find(|object| object.id == id)
    }
}
