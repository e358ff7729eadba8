/// Signal values for which the stream does not use modified packets.
pub const PLAIN_MOD_SIGNALS: [u32; 4] = [0x4A, 0x4B, 0x69, 0x70];

/// Vorb chunk sizes the format is known to use. A file carrying one of
/// these as a real chunk is recognised but not composable; anything else
/// is rejected outright.
pub const KNOWN_VORB_SIZES: [u32; 5] = [0x28, 0x2A, 0x2C, 0x32, 0x34];

/// Decoded `cue ` chunk (single cue point, as emitted by the encoder).
#[derive(Debug, Clone, PartialEq)]
pub struct CueChunk {
    pub size: u32,
    pub count: u32,
    pub id: u32,
    pub position: u32,
    pub data_chunk_id: u32,
    pub chunk_start: u32,
    pub block_start: u32,
    pub sample_offset: u32,
}

/// `LIST` chunk: must be an `adtl` list; the body past the list type is
/// preserved verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ListChunk {
    pub size: u32,
    pub remain: Vec<u8>,
}

/// `smpl` chunk. The payload is preserved verbatim; the loop fields are
/// decoded out of it (and normalised against the sample count).
#[derive(Debug, Clone, PartialEq)]
pub struct SmplChunk {
    pub raw: Vec<u8>,
    pub loop_count: u32,
    pub loop_start: u32,
    pub loop_end: u32,
}

/// A parsed WEM: the vendor-extended RIFF/WAVE header plus the data
/// region split at the packet offsets. Only the "fake vorb" shape (fmt
/// size 0x42, no standalone vorb chunk) parses to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Wem {
    /// RIFF size word as stored (file length minus 8).
    pub riff_size: u32,
    pub fmt_size: u32,
    pub codec_id: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_second: u32,
    pub block_alignment: u16,
    pub bits_per_sample: u16,
    pub extra_fmt_length: u16,
    pub ext_unk: u16,
    pub subtype: u32,

    pub sample_count: u32,
    pub no_granule: bool,
    pub mod_signal: u32,
    pub mod_packets: bool,
    pub fmt_unk_field32_1: u32,
    pub fmt_unk_field32_2: u32,
    pub setup_packet_offset: u32,
    pub first_audio_packet_offset: u32,
    pub fmt_unk_field32_3: u32,
    pub fmt_unk_field32_4: u32,
    pub fmt_unk_field32_5: u32,
    pub header_triad_present: bool,
    pub old_packet_headers: bool,
    pub uid: u32,
    pub blocksize_0_pow: u8,
    pub blocksize_1_pow: u8,
    pub fake_vorb: bool,

    pub cue: Option<CueChunk>,
    pub list: Option<ListChunk>,
    pub smpl: Option<SmplChunk>,

    pub data_size: u32,
    /// Bytes before the setup packet.
    pub pre_data: Vec<u8>,
    /// Setup packet region (`first_audio_packet_offset` bytes past it).
    pub data_setup: Vec<u8>,
    /// Remaining audio packets.
    pub data: Vec<u8>,
}

impl Wem {
    pub fn loop_count(&self) -> u32 {
        self.smpl.as_ref().map_or(0, |s| s.loop_count)
    }
}

/// Packet header at a given offset inside the data region: a 16-bit size,
/// preceded by a 32-bit absolute granule unless the stream is granule-less.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketHeader {
    pub size: u16,
    pub absolute_granule: u32,
    pub no_granule: bool,
}

impl PacketHeader {
    pub fn header_size(&self) -> u32 {
        if self.no_granule { 2 } else { 6 }
    }
}
