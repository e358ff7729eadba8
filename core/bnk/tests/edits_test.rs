use bnk::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sha1::{Digest, Sha1};
use std::io::Cursor;
use std::path::PathBuf;

/// Minimal fake-vorb WEM accepted by the header parser.
fn wem_bytes(sample_count: u32, sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&0x42u32.to_le_bytes());
    buf.extend_from_slice(&0xFFFFu16.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&32000u32.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&0x30u16.to_le_bytes());
    buf.extend_from_slice(&6u16.to_le_bytes());
    buf.extend_from_slice(&0x33u32.to_le_bytes());
    buf.extend_from_slice(&sample_count.to_le_bytes());
    buf.extend_from_slice(&0x4Au32.to_le_bytes());
    buf.extend_from_slice(&[0u8; 8]); // unk words 1-2
    buf.extend_from_slice(&4u32.to_le_bytes()); // setup offset
    buf.extend_from_slice(&10u32.to_le_bytes()); // first audio offset
    buf.extend_from_slice(&[0u8; 12]); // unk words 3-5
    buf.extend_from_slice(&0x1234u32.to_le_bytes()); // uid
    buf.push(8);
    buf.push(11);

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&34u32.to_le_bytes());
    buf.extend_from_slice(&[0u8; 34]);

    let riff_size = (buf.len() as u32 - 8).to_le_bytes();
    buf[4..8].copy_from_slice(&riff_size);
    buf
}

fn write_wem(dir: &tempfile::TempDir, audio_id: u32, count: u32, rate: u32) -> PathBuf {
    let path = dir.path().join(format!("{audio_id}.wem"));
    std::fs::write(&path, wem_bytes(count, rate)).unwrap();
    path
}

fn segment(child_ids: Vec<u32>) -> MusicSegmentObject {
    MusicSegmentObject {
        structure: SoundStructure::empty(),
        child_ids,
        unk_double_1: 250.0,
        unk_field64_1: 7,
        tempo: 120.0,
        time_sig1: 4,
        time_sig2: 4,
        unk_field32_1: 0,
        unk_field8_1: 1,
        time_length: 4000.0,
        unk_field32_2: 0,
        unk_field32_3: 0,
        unk_field64_2: 9,
        unk_field32_4: 0,
        unk_field32_5: 0,
        time_length_next: 4000.0,
        unk_field32_6: 0,
        unk_data: Vec::new(),
    }
}

fn track(id1: u32) -> MusicTrackObject {
    MusicTrackObject {
        unk_field32_1: 1,
        unk_field32_2: 0x0004_0001,
        unk_field32_3: 1,
        id1,
        source: Some(MusicTrackSource {
            id2: id1,
            unk_field32_4: 0x100,
            unk_field32_5: 0,
            unk_field8_1: 0,
            id3: id1,
            unk_field64_1: 0,
            unk_field64_2: 0,
            unk_field64_3: 0x8000_0000_0000_0000,
            time_length: 4000.0,
        }),
        unk_data: Vec::new(),
    }
}

fn playlist(segment_ids: Vec<u32>, elements: Vec<PlaylistElement>) -> MusicPlaylistObject {
    MusicPlaylistObject {
        structure: SoundStructure::empty(),
        segment_ids,
        unk_double_1: 0.0,
        unk_field64_1: 0,
        tempo: 120.0,
        time_sig1: 4,
        time_sig2: 4,
        unk_field8_1: 1,
        unk_field32_1: 0,
        transitions: vec![PlaylistTransition {
            source_id: u32::MAX,
            dest_id: u32::MAX,
            source_fadeout: -500,
            source_shape_curve_fadeout: 4,
            source_fadeout_offset: 0,
            unk_field32_1: 0,
            unk_field32_2: 0,
            unk_field32_3: 7,
            src_type: 0,
            dest_fadein: 500,
            dest_shape_curve_fadein: 4,
            dest_fadein_offset: 0,
            unk_field32_4: 0,
            unk_field32_5: 0,
            unk_field16_1: 0,
            dest_type: 0,
            unk_field8_1: 0,
            has_segment: true,
            trans_segment_id: 601,
            trans_fadein: 100,
            trans_shape_curve_fadein: 4,
            trans_fadein_offset: -100,
            trans_fadeout: 100,
            trans_shape_curve_fadeout: 4,
            trans_fadeout_offset: 0,
            trans_fadein_type: 0,
            trans_fadeout_type: 1,
        }],
        playlist_elements_count: 3,
        elements,
    }
}

fn element(segment_id: u32, id: u32) -> PlaylistElement {
    PlaylistElement {
        music_segment_id: segment_id,
        id,
        child_elements: 0,
        playlist_type: -1,
        loop_count: 1,
        weight: 50000,
        times_in_row: 0,
        unk_field8_1: 1,
        random_type: 0,
    }
}

/// Two tracks (12345, 999) under two segments, one playlist over both.
fn music_bank() -> Soundbank {
    Soundbank {
        header: BankHeader {
            length: 16,
            version: BANK_VERSION,
            id: 1,
            unk_field32_1: 0,
            unk_field32_2: 0,
            unk_data: Vec::new(),
        },
        is_init: false,
        data_index: None,
        data: None,
        stmg: None,
        hirc: HircChunk {
            length: 0,
            objects: vec![
                HircObject {
                    id: 500,
                    body: ObjectBody::MusicTrack(track(12345)),
                },
                HircObject {
                    id: 501,
                    body: ObjectBody::MusicTrack(track(999)),
                },
                HircObject {
                    id: 600,
                    body: ObjectBody::MusicSegment(segment(vec![500])),
                },
                HircObject {
                    id: 601,
                    body: ObjectBody::MusicSegment(segment(vec![501])),
                },
                HircObject {
                    id: 700,
                    body: ObjectBody::MusicPlaylist(playlist(
                        vec![600, 601],
                        vec![element(600, 1), element(601, 2)],
                    )),
                },
            ],
        },
        stid: None,
        envs: None,
    }
}

#[test]
fn rebuild_music_replaces_tracks_and_retimes_segments() {
    let dir = tempfile::tempdir().unwrap();
    // 88200 samples at 44100 Hz: two seconds.
    let wem = write_wem(&dir, 12345, 88200, 44100);

    let mut bank = music_bank();
    bank.rebuild_music(&wem).unwrap();

    match &bank.object_by_id(500).unwrap().body {
        ObjectBody::CustomMusicTrack(track) => {
            assert_eq!(track.audio_id, 12345);
            assert_eq!(track.time_length, 2000.0);
            assert_eq!(track.parent, 600);
        }
        other => panic!("expected a custom track, got {other:?}"),
    }

    match &bank.object_by_id(600).unwrap().body {
        ObjectBody::MusicSegment(segment) => {
            assert_eq!(segment.child_ids, vec![500]);
            assert_eq!(segment.unk_double_1, 1000.0);
            assert_eq!(segment.unk_field64_1, 0);
            assert_eq!(segment.unk_field64_2, 0);
            assert_eq!(segment.time_length, 2000.0);
            assert_eq!(segment.time_length_next, 2000.0);
        }
        other => panic!("expected a segment, got {other:?}"),
    }

    // The unrelated track is untouched.
    assert!(matches!(
        bank.object_by_id(501).unwrap().body,
        ObjectBody::MusicTrack(_)
    ));
}

#[test]
fn rebuild_music_collapses_multi_child_segments() {
    let dir = tempfile::tempdir().unwrap();
    let wem = write_wem(&dir, 12345, 44100, 44100);

    let mut bank = music_bank();
    match &mut bank.hirc.objects[2].body {
        ObjectBody::MusicSegment(segment) => segment.child_ids = vec![501, 500, 502],
        _ => unreachable!(),
    }

    bank.rebuild_music(&wem).unwrap();

    match &bank.object_by_id(600).unwrap().body {
        ObjectBody::MusicSegment(segment) => {
            assert_eq!(segment.child_ids, vec![500]);
            assert_eq!(segment.time_length, 1000.0);
        }
        _ => unreachable!(),
    }
}

#[test]
fn rebuild_music_requires_a_known_id() {
    let dir = tempfile::tempdir().unwrap();
    let wem = write_wem(&dir, 4242, 44100, 44100);

    let mut bank = music_bank();
    assert!(matches!(
        bank.rebuild_music(&wem),
        Err(BnkError::NotFound(_))
    ));
}

fn database_with(ids: &[u32]) -> IdDatabase {
    let mut payload = Vec::new();
    for id in ids {
        payload.extend_from_slice(&id.to_le_bytes());
    }
    let mut bytes = Sha1::digest(&payload).to_vec();
    bytes.extend_from_slice(&payload);
    IdDatabase::from_bytes(&bytes).unwrap()
}

#[test]
fn add_music_appends_a_track_and_segment_pair() {
    let dir = tempfile::tempdir().unwrap();
    let wem = write_wem(&dir, 7777, 88200, 44100);

    let mut bank = music_bank();
    let before: Vec<Vec<u8>> = bank
        .hirc
        .objects
        .iter()
        .map(|object| object.payload().unwrap())
        .collect();

    let mut rng = StdRng::seed_from_u64(42);
    let segment_id = bank
        .add_music(&wem, &mut rng, &IdDatabase::empty())
        .unwrap();

    assert_eq!(bank.hirc.objects.len(), before.len() + 2);

    // Every pre-existing object is byte-identical.
    for (object, payload) in bank.hirc.objects.iter().zip(&before) {
        assert_eq!(&object.payload().unwrap(), payload);
    }

    let new_track = &bank.hirc.objects[before.len()];
    let new_segment = &bank.hirc.objects[before.len() + 1];
    assert_eq!(new_segment.id, segment_id);

    match &new_track.body {
        ObjectBody::CustomMusicTrack(track) => {
            assert_eq!(track.audio_id, 7777);
            assert_eq!(track.time_length, 2000.0);
            assert_eq!(track.parent, segment_id);
        }
        other => panic!("expected a custom track, got {other:?}"),
    }

    match &new_segment.body {
        ObjectBody::MusicSegment(segment) => {
            assert_eq!(segment.child_ids, vec![new_track.id]);
            assert_eq!(segment.time_length, 2000.0);
            assert_eq!(segment.time_length_next, 2000.0);
            assert_eq!(segment.structure.parent_id, 0);
        }
        other => panic!("expected a segment, got {other:?}"),
    }

    // The pair survives a rebuild round-trip.
    let bytes = bank.build().unwrap();
    let reparsed = Soundbank::read(&mut Cursor::new(&bytes), false).unwrap();
    assert_eq!(reparsed.hirc.objects.len(), before.len() + 2);
}

#[test]
fn add_music_rejects_a_used_id() {
    let dir = tempfile::tempdir().unwrap();
    let wem = write_wem(&dir, 12345, 88200, 44100);

    let mut bank = music_bank();
    let mut rng = StdRng::seed_from_u64(42);
    assert!(matches!(
        bank.add_music(&wem, &mut rng, &IdDatabase::empty()),
        Err(BnkError::IdInUse(12345))
    ));
}

#[test]
fn new_object_id_avoids_objects_and_database() {
    let bank = music_bank();

    // Pre-draw the sequence the allocator will see.
    let mut probe = StdRng::seed_from_u64(7);
    let first: u32 = rand::Rng::random(&mut probe);
    let second: u32 = rand::Rng::random(&mut probe);
    assert_ne!(first, second);

    // With the first draw burned in the database, the allocator must
    // land on the second.
    let database = database_with(&[first]);
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(bank.new_object_id(&mut rng, &database), second);

    let id = bank.new_object_id(&mut rng, &IdDatabase::empty());
    assert!(bank.hirc.objects.iter().all(|object| object.id != id));
}

#[test]
fn playlist_ids_resolve_transitively() {
    let bank = music_bank();
    assert_eq!(bank.get_playlist_ids(12345).unwrap(), vec![700]);
    assert!(matches!(
        bank.get_playlist_ids(1),
        Err(BnkError::NotFound(_))
    ));
}

#[test]
fn export_then_reimport_is_identity() {
    let mut bank = music_bank();
    let original = bank.build().unwrap();

    let text = bank.export_playlist(700).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    bank.reimport_playlist(700, &text, &mut rng).unwrap();

    assert_eq!(bank.build().unwrap(), original);
}

#[test]
fn exported_text_carries_every_field() {
    let bank = music_bank();
    let text = bank.export_playlist(700).unwrap();

    assert!(text.contains("[SEGMENTS]\nsegment1 = 600\nsegment2 = 601\n"));
    assert!(text.contains("[TRANSITION 1]"));
    assert!(text.contains("source_fadeout = -500"));
    assert!(text.contains("has_segment = True"));
    assert!(text.contains("[PLAYLIST ELEMENT 1]"));
    assert!(text.contains("tracks = 12345"));
    assert!(text.contains("music_segment_id = 600"));
    assert!(text.contains("playlist_type = -1"));
}

#[test]
fn reimport_replaces_new_id_placeholders() {
    let mut bank = music_bank();
    let text = bank.export_playlist(700).unwrap().replace("id = 2", "id = <NEW ID>");

    let mut rng = StdRng::seed_from_u64(3);
    bank.reimport_playlist(700, &text, &mut rng).unwrap();

    match &bank.object_by_id(700).unwrap().body {
        ObjectBody::MusicPlaylist(playlist) => {
            assert_eq!(playlist.elements.len(), 2);
            assert_eq!(playlist.elements[0].id, 1);
            let fresh = playlist.elements[1].id;
            assert_ne!(fresh, 1);
            assert_ne!(fresh, 2);
        }
        _ => unreachable!(),
    }
}

#[test]
fn reimport_moves_segments_next_to_the_playlist() {
    let mut bank = music_bank();
    // Put the playlist in front so that segment 601 sits after it.
    bank.hirc.objects.rotate_right(1);
    assert_eq!(bank.hirc.objects[0].id, 700);

    let mut text = bank.export_playlist(700).unwrap();
    text.push_str("[MOVE SEGMENTS]\nsegment1 = 601\n");

    let mut rng = StdRng::seed_from_u64(5);
    bank.reimport_playlist(700, &text, &mut rng).unwrap();

    let order: Vec<u32> = bank.hirc.objects.iter().map(|object| object.id).collect();
    // Track 501, then segment 601, inserted at the cursor ahead of the
    // playlist; everything else keeps its relative order.
    assert_eq!(order, vec![501, 601, 700, 500, 600]);

    // The moved segment is rebuilt from the base segment (600) but keeps
    // its own identity fields.
    match &bank.object_by_id(601).unwrap().body {
        ObjectBody::MusicSegment(segment) => {
            assert_eq!(segment.child_ids, vec![501]);
        }
        _ => unreachable!(),
    }
}
