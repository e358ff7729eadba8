use std::io::Cursor;
use wem::{Wem, WemError, merge};

struct Fixture {
    sample_count: u32,
    sample_rate: u32,
    subtype: u32,
    uid: u32,
    setup_offset: u32,
    first_audio_offset: u32,
    data_len: u32,
    with_cue: bool,
    with_smpl: bool,
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture {
            sample_count: 48000,
            sample_rate: 48000,
            subtype: 0x33,
            uid: 0xDEAD_BEEF,
            setup_offset: 4,
            first_audio_offset: 10,
            data_len: 20,
            with_cue: false,
            with_smpl: false,
        }
    }
}

impl Fixture {
    /// Assemble a fake-vorb WEM: 0x42-byte fmt with the synthetic vorb
    /// tail, optional cue/smpl chunks, then a data chunk split at the
    /// packet offsets.
    fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&0x42u32.to_le_bytes());
        buf.extend_from_slice(&0xFFFFu16.to_le_bytes()); // codec id
        buf.extend_from_slice(&2u16.to_le_bytes()); // channels
        buf.extend_from_slice(&self.sample_rate.to_le_bytes());
        buf.extend_from_slice(&32000u32.to_le_bytes()); // avg bytes/s
        buf.extend_from_slice(&0u16.to_le_bytes()); // block alignment
        buf.extend_from_slice(&0u16.to_le_bytes()); // bps
        buf.extend_from_slice(&0x30u16.to_le_bytes()); // extra fmt length
        buf.extend_from_slice(&6u16.to_le_bytes()); // ext unk
        buf.extend_from_slice(&self.subtype.to_le_bytes());
        // synthetic vorb tail
        buf.extend_from_slice(&self.sample_count.to_le_bytes());
        buf.extend_from_slice(&0x4Au32.to_le_bytes()); // mod signal
        buf.extend_from_slice(&0x11u32.to_le_bytes());
        buf.extend_from_slice(&0x22u32.to_le_bytes());
        buf.extend_from_slice(&self.setup_offset.to_le_bytes());
        buf.extend_from_slice(&self.first_audio_offset.to_le_bytes());
        buf.extend_from_slice(&0x33u32.to_le_bytes());
        buf.extend_from_slice(&0x44u32.to_le_bytes());
        buf.extend_from_slice(&0x55u32.to_le_bytes());
        buf.extend_from_slice(&self.uid.to_le_bytes());
        buf.push(8); // blocksize 0 pow
        buf.push(11); // blocksize 1 pow

        if self.with_cue {
            buf.extend_from_slice(b"cue ");
            buf.extend_from_slice(&0x1Cu32.to_le_bytes());
            for value in [1u32, 1, 0, u32::from_le_bytes(*b"data"), 0, 0, 123] {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }

        if self.with_smpl {
            buf.extend_from_slice(b"smpl");
            buf.extend_from_slice(&0x3Cu32.to_le_bytes());
            let mut smpl = vec![0u8; 0x3C];
            smpl[0x1C..0x20].copy_from_slice(&1u32.to_le_bytes()); // loop count
            smpl[0x2C..0x30].copy_from_slice(&0u32.to_le_bytes()); // loop start
            smpl[0x30..0x34].copy_from_slice(&0u32.to_le_bytes()); // loop end
            buf.extend_from_slice(&smpl);
        }

        buf.extend_from_slice(b"data");
        let data_size = self.setup_offset + self.first_audio_offset + self.data_len;
        buf.extend_from_slice(&data_size.to_le_bytes());
        buf.extend((0..self.setup_offset).map(|i| i as u8));
        buf.extend((0..self.first_audio_offset).map(|i| 0x80 | i as u8));
        buf.extend((0..self.data_len).map(|i| 0x40 | i as u8));

        let riff_size = (buf.len() as u32 - 8).to_le_bytes();
        buf[4..8].copy_from_slice(&riff_size);
        buf
    }
}

#[test]
fn parse_fake_vorb_wem() {
    let bytes = Fixture::default().build();
    let wem = Wem::read(&mut Cursor::new(&bytes)).unwrap();

    assert_eq!(wem.channels, 2);
    assert_eq!(wem.sample_rate, 48000);
    assert_eq!(wem.sample_count, 48000);
    assert!(wem.fake_vorb);
    assert!(wem.no_granule);
    assert!(!wem.mod_packets); // 0x4A is a plain signal
    assert_eq!(wem.pre_data.len(), 4);
    assert_eq!(wem.data_setup.len(), 10);
    assert_eq!(wem.data.len(), 20);
}

#[test]
fn round_trip_is_byte_exact() {
    for (with_cue, with_smpl) in [(false, false), (true, false), (true, true)] {
        let bytes = Fixture {
            with_cue,
            with_smpl,
            ..Fixture::default()
        }
        .build();

        let wem = Wem::read(&mut Cursor::new(&bytes)).unwrap();
        let written = wem.to_bytes().unwrap();
        assert_eq!(written, bytes);

        let again = Wem::read(&mut Cursor::new(&written)).unwrap();
        assert_eq!(again, wem);
    }
}

#[test]
fn smpl_loop_end_zero_normalises_to_sample_count() {
    let bytes = Fixture {
        with_smpl: true,
        ..Fixture::default()
    }
    .build();
    let wem = Wem::read(&mut Cursor::new(&bytes)).unwrap();
    let smpl = wem.smpl.as_ref().unwrap();
    assert_eq!(smpl.loop_count, 1);
    assert_eq!(smpl.loop_end, wem.sample_count);
}

#[test]
fn standalone_vorb_chunk_is_unsupported() {
    let mut fixture = Fixture::default();
    fixture.with_cue = false;
    let mut bytes = fixture.build();

    // Splice a recognised-size vorb chunk between fmt and data.
    let data_pos = bytes.windows(4).position(|w| w == b"data").unwrap();
    let mut vorb = Vec::new();
    vorb.extend_from_slice(b"vorb");
    vorb.extend_from_slice(&0x2Au32.to_le_bytes());
    vorb.extend_from_slice(&[0u8; 0x2A]);
    bytes.splice(data_pos..data_pos, vorb);
    let riff_size = (bytes.len() as u32 - 8).to_le_bytes();
    bytes[4..8].copy_from_slice(&riff_size);

    assert!(matches!(
        Wem::read(&mut Cursor::new(&bytes)),
        Err(WemError::UnsupportedShape(_))
    ));
}

#[test]
fn bad_codec_id_is_rejected() {
    let mut bytes = Fixture::default().build();
    bytes[20] = 0xFE; // codec id low byte
    assert!(matches!(
        Wem::read(&mut Cursor::new(&bytes)),
        Err(WemError::BadInvariant(_))
    ));
}

#[test]
fn truncated_riff_is_rejected() {
    let mut bytes = Fixture::default().build();
    let oversize = (bytes.len() as u32).to_le_bytes();
    bytes[4..8].copy_from_slice(&oversize);
    assert!(matches!(
        Wem::read(&mut Cursor::new(&bytes)),
        Err(WemError::TruncatedChunk(_))
    ));
}

#[test]
fn merge_grafts_codec_metadata_onto_target() {
    let source = Wem::read(&mut Cursor::new(
        Fixture {
            subtype: 0x3B,
            uid: 0x1234_5678,
            setup_offset: 6,
            first_audio_offset: 9,
            sample_rate: 44100,
            sample_count: 88200,
            with_cue: true,
            ..Fixture::default()
        }
        .build(),
    ))
    .unwrap();
    let target = Wem::read(&mut Cursor::new(Fixture::default().build())).unwrap();

    let merged_bytes = merge(&source, &target).unwrap();
    let merged = Wem::read(&mut Cursor::new(&merged_bytes)).unwrap();

    // Source codec metadata
    assert_eq!(merged.subtype, source.subtype);
    assert_eq!(merged.uid, source.uid);
    assert_eq!(merged.fmt_unk_field32_1, source.fmt_unk_field32_1);
    assert_eq!(merged.blocksize_0_pow, source.blocksize_0_pow);
    assert!(merged.cue.is_some());

    // Target identity
    assert_eq!(merged.channels, target.channels);
    assert_eq!(merged.sample_rate, target.sample_rate);
    assert_eq!(merged.sample_count, target.sample_count);

    // Recomputed offsets
    assert_eq!(merged.setup_packet_offset, target.pre_data.len() as u32);
    assert_eq!(
        merged.first_audio_packet_offset,
        merged.setup_packet_offset
            + (source.first_audio_packet_offset - source.setup_packet_offset)
    );

    // RIFF size covers the file
    let riff = u32::from_le_bytes(merged_bytes[4..8].try_into().unwrap());
    assert_eq!(riff as usize, merged_bytes.len() - 8);

    // The data region is the target's, byte for byte
    let total: Vec<u8> = [&merged.pre_data[..], &merged.data_setup, &merged.data].concat();
    let expected: Vec<u8> = [&target.pre_data[..], &target.data_setup, &target.data].concat();
    assert_eq!(total, expected);
}
