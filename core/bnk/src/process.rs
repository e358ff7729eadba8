//! Structural edits on the object graph: swapping embedded audio,
//! re-skinning and injecting music, resolving playlist ownership, and
//! dumping embedded sounds.

use crate::error::{BnkError, Result};
use crate::ids::IdDatabase;
use crate::objects::*;
use crate::playlist;
use crate::types::Soundbank;
use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use wem::Wem;

/// The numeric basename of a WEM file is the audio id it replaces.
fn wem_audio_id(path: &Path) -> Result<u32> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.parse::<u32>().ok())
        .filter(|&id| id > 0)
        .ok_or(BnkError::BadInvariant("invalid WEM id"))
}

/// Track duration in milliseconds derived from the WEM header.
fn wem_duration_ms(path: &Path) -> Result<f64> {
    let wem = Wem::open(path)?;
    if wem.sample_rate == 0 {
        return Err(BnkError::BadInvariant("WEM sample rate is 0"));
    }
    Ok(wem.sample_count as f64 / wem.sample_rate as f64 * 1000.0)
}

/// Audio-source id carried by a track object, if it is one.
fn track_audio_id(body: &ObjectBody) -> Option<u32> {
    match body {
        ObjectBody::MusicTrack(track) => Some(track.id1),
        ObjectBody::CustomMusicTrack(track) => Some(track.audio_id),
        _ => None,
    }
}

fn is_track(body: &ObjectBody) -> bool {
    track_audio_id(body).is_some()
}

/// Reset a segment to carry a single freshly timed track.
fn retime_segment(segment: &mut MusicSegmentObject, new_time: f64) {
    segment.unk_double_1 = 1000.0;
    segment.unk_field64_1 = 0;
    segment.unk_field64_2 = 0;
    segment.time_length = new_time;
    segment.time_length_next = new_time;
}

impl Soundbank {
    /// Replace embedded payloads from a folder of `<id>.wem` files.
    pub fn rebuild_data<P: AsRef<Path>>(&mut self, folder: P) -> Result<()> {
        if self.data_index.is_none() {
            return Err(BnkError::BadInvariant(
                "soundbank does not contain embedded files",
            ));
        }

        let mut replacements: Vec<(u32, Vec<u8>)> = Vec::new();
        for entry in fs::read_dir(folder)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if !path.is_file() || path.extension().is_none_or(|ext| ext != "wem") {
                return Err(BnkError::NotWem(name));
            }

            let id = wem_audio_id(&path).map_err(|_| BnkError::NotWem(name))?;
            replacements.push((id, fs::read(&path)?));
        }

        let index = self.data_index.as_mut().unwrap();
        for (id, data) in replacements {
            if let Some(entry) = index.entries.iter_mut().find(|entry| entry.id == id) {
                entry.size = data.len() as u32;
                entry.data = data;
            }
        }

        Ok(())
    }

    /// Re-skin every music track using the WEM's audio id: matching tracks
    /// become the fixed custom layout and their owning segments are
    /// re-timed to the new duration.
    pub fn rebuild_music<P: AsRef<Path>>(&mut self, wem_path: P) -> Result<()> {
        let wem_path = wem_path.as_ref();
        let audio_id = wem_audio_id(wem_path)?;
        let new_time = wem_duration_ms(wem_path)?;

        // Track object ids (and positions) carrying the target audio id.
        let mut track_positions: HashMap<u32, usize> = HashMap::new();
        for (position, object) in self.hirc.objects.iter().enumerate() {
            if track_audio_id(&object.body) == Some(audio_id) {
                track_positions.insert(object.id, position);
            }
        }
        if track_positions.is_empty() {
            return Err(BnkError::NotFound(format!("id {audio_id}")));
        }

        // Segments owning those tracks: collapse to the first matching
        // track and take the new duration.
        let mut parent_segments: HashMap<u32, u32> = HashMap::new();
        for object in self.hirc.objects.iter_mut() {
            let segment_id = object.id;
            if let ObjectBody::MusicSegment(segment) = &mut object.body {
                if segment.child_ids.len() == 1 {
                    let child = segment.child_ids[0];
                    if track_positions.contains_key(&child) {
                        retime_segment(segment, new_time);
                        parent_segments.insert(child, segment_id);
                    }
                } else if let Some(&child) = segment
                    .child_ids
                    .iter()
                    .find(|child| track_positions.contains_key(child))
                {
                    segment.child_ids = vec![child];
                    retime_segment(segment, new_time);
                    parent_segments.insert(child, segment_id);
                }
            }
        }

        for (track_id, position) in track_positions {
            if let Some(&segment_id) = parent_segments.get(&track_id) {
                self.hirc.objects[position].body = ObjectBody::CustomMusicTrack(
                    CustomMusicTrack::new(audio_id, new_time, segment_id),
                );
            }
        }

        Ok(())
    }

    /// Inject a brand-new track/segment pair for a WEM whose audio id is
    /// not yet used. Returns the id of the appended segment.
    pub fn add_music<P: AsRef<Path>>(
        &mut self,
        wem_path: P,
        rng: &mut impl Rng,
        database: &IdDatabase,
    ) -> Result<u32> {
        let wem_path = wem_path.as_ref();
        let audio_id = wem_audio_id(wem_path)?;
        let new_time = wem_duration_ms(wem_path)?;

        let mut template: Option<MusicSegmentObject> = None;
        for object in &self.hirc.objects {
            if track_audio_id(&object.body) == Some(audio_id) {
                return Err(BnkError::IdInUse(audio_id));
            }
            if template.is_none() {
                if let ObjectBody::MusicSegment(segment) = &object.body {
                    template = Some(segment.clone());
                }
            }
        }
        let mut segment =
            template.ok_or_else(|| BnkError::NotFound("music segment".to_string()))?;

        let track_id = self.new_object_id(rng, database);
        self.hirc.objects.push(HircObject {
            id: track_id,
            body: ObjectBody::CustomMusicTrack(CustomMusicTrack::new(audio_id, new_time, 0)),
        });

        let segment_id = self.new_object_id(rng, database);
        if let Some(HircObject {
            body: ObjectBody::CustomMusicTrack(track),
            ..
        }) = self.hirc.objects.last_mut()
        {
            track.parent = segment_id;
        }

        segment.child_ids = vec![track_id];
        retime_segment(&mut segment, new_time);
        segment.structure.parent_id = 0;

        self.hirc.objects.push(HircObject {
            id: segment_id,
            body: ObjectBody::MusicSegment(segment),
        });

        Ok(segment_id)
    }

    /// Draw a fresh object id: uniform over 32-bit space, rerolled until
    /// it collides with neither a live object nor the external database.
    pub fn new_object_id(&self, rng: &mut impl Rng, database: &IdDatabase) -> u32 {
        loop {
            let id: u32 = rng.random();
            if database.contains(id) {
                continue;
            }
            if self.hirc.objects.iter().any(|object| object.id == id) {
                continue;
            }
            return id;
        }
    }

    /// Resolve audio id -> tracks -> segments -> playlists.
    pub fn get_playlist_ids(&self, audio_id: u32) -> Result<Vec<u32>> {
        let track_ids: Vec<u32> = self
            .hirc
            .objects
            .iter()
            .filter(|object| track_audio_id(&object.body) == Some(audio_id))
            .map(|object| object.id)
            .collect();
        if track_ids.is_empty() {
            return Err(BnkError::NotFound(format!("id {audio_id}")));
        }

        let segment_ids: Vec<u32> = self
            .hirc
            .objects
            .iter()
            .filter(|object| match &object.body {
                ObjectBody::MusicSegment(segment) => segment
                    .child_ids
                    .iter()
                    .any(|child| track_ids.contains(child)),
                _ => false,
            })
            .map(|object| object.id)
            .collect();
        if segment_ids.is_empty() {
            return Err(BnkError::NoOwners {
                id: audio_id,
                what: "music segments",
            });
        }

        let playlist_ids: Vec<u32> = self
            .hirc
            .objects
            .iter()
            .filter(|object| match &object.body {
                ObjectBody::MusicPlaylist(playlist) => playlist
                    .segment_ids
                    .iter()
                    .any(|segment| segment_ids.contains(segment)),
                _ => false,
            })
            .map(|object| object.id)
            .collect();
        if playlist_ids.is_empty() {
            return Err(BnkError::NoOwners {
                id: audio_id,
                what: "music playlists",
            });
        }

        Ok(playlist_ids)
    }

    /// Serialise a playlist to the flat text exchange format.
    pub fn export_playlist(&self, playlist_id: u32) -> Result<String> {
        let playlist = self
            .hirc
            .objects
            .iter()
            .find(|object| {
                object.id == playlist_id && matches!(object.body, ObjectBody::MusicPlaylist(_))
            })
            .ok_or_else(|| BnkError::NotFound(format!("playlist {playlist_id}")))?;

        match &playlist.body {
            ObjectBody::MusicPlaylist(playlist) => {
                Ok(playlist::export_text(playlist, &self.hirc.objects))
            }
            _ => unreachable!(),
        }
    }

    /// Apply an edited exchange file back onto a playlist, then relocate
    /// any `MOVE SEGMENTS` groups next to the playlist: tracks first, then
    /// their segment, with a cursor that advances past each insertion.
    pub fn reimport_playlist(
        &mut self,
        playlist_id: u32,
        text: &str,
        rng: &mut impl Rng,
    ) -> Result<()> {
        let playlist_index = self
            .hirc
            .objects
            .iter()
            .position(|object| {
                object.id == playlist_id && matches!(object.body, ObjectBody::MusicPlaylist(_))
            })
            .ok_or_else(|| BnkError::NotFound(format!("playlist {playlist_id}")))?;

        let old_segment_ids = match &self.hirc.objects[playlist_index].body {
            ObjectBody::MusicPlaylist(playlist) => playlist.segment_ids.clone(),
            _ => unreachable!(),
        };

        let move_segments = match &mut self.hirc.objects[playlist_index].body {
            ObjectBody::MusicPlaylist(playlist) => playlist::apply_import(playlist, text, rng)?,
            _ => unreachable!(),
        };

        if move_segments.is_empty() {
            return Ok(());
        }

        // A segment that stays put provides the template for the moved
        // ones; the objects being moved may sit anywhere in the list.
        let base_segment = self
            .hirc
            .objects
            .iter()
            .find_map(|object| match &object.body {
                ObjectBody::MusicSegment(segment)
                    if old_segment_ids.contains(&object.id)
                        && !move_segments.contains(&object.id) =>
                {
                    Some(segment.clone())
                }
                _ => None,
            })
            .ok_or(BnkError::BadInvariant("no base segment within playlist"))?;

        let mut cursor = playlist_index;

        for segment_id in move_segments {
            let objects = &mut self.hirc.objects;
            let segment_index = objects
                .iter()
                .position(|object| {
                    object.id == segment_id && matches!(object.body, ObjectBody::MusicSegment(_))
                })
                .ok_or_else(|| BnkError::NotFound(format!("music segment {segment_id}")))?;

            if segment_index < cursor {
                continue;
            }

            let moved = match &objects[segment_index].body {
                ObjectBody::MusicSegment(segment) => segment.clone(),
                _ => unreachable!(),
            };

            let mut segment = base_segment.clone();
            segment.child_ids = moved.child_ids.clone();
            segment.unk_double_1 = moved.unk_double_1;
            segment.unk_field64_1 = moved.unk_field64_1;
            segment.unk_field64_2 = moved.unk_field64_2;
            segment.time_length = moved.time_length;
            segment.time_length_next = moved.time_length_next;

            let track_ids: Vec<u32> = objects
                .iter()
                .filter(|object| is_track(&object.body) && segment.child_ids.contains(&object.id))
                .map(|object| object.id)
                .collect();
            if track_ids.is_empty() {
                return Err(BnkError::NotFound(format!(
                    "tracks of music segment {segment_id}"
                )));
            }

            for track_id in track_ids {
                let index = objects
                    .iter()
                    .position(|object| object.id == track_id && is_track(&object.body))
                    .expect("track position");
                let track = objects.remove(index);
                if index < cursor {
                    cursor -= 1;
                }
                objects.insert(cursor, track);
                cursor += 1;
            }

            let index = objects
                .iter()
                .position(|object| {
                    object.id == segment_id && matches!(object.body, ObjectBody::MusicSegment(_))
                })
                .expect("segment position");
            objects.remove(index);
            if index < cursor {
                cursor -= 1;
            }
            objects.insert(
                cursor,
                HircObject {
                    id: segment_id,
                    body: ObjectBody::MusicSegment(segment),
                },
            );
            cursor += 1;
        }

        Ok(())
    }

    /// Write every embedded payload as `<id>.wem` under `folder`.
    pub fn dump_sounds<P: AsRef<Path>>(&self, folder: P) -> Result<()> {
        let index = self.data_index.as_ref().ok_or(BnkError::BadInvariant(
            "soundbank does not contain embedded files",
        ))?;

        let folder = folder.as_ref();
        fs::create_dir_all(folder)?;
        for entry in &index.entries {
            fs::write(folder.join(format!("{}.wem", entry.id)), &entry.data)?;
        }

        Ok(())
    }
}
