//! Flat section-and-key text exchange for music playlists. The file is a
//! plain INI dialect: `[SEGMENTS]`, optional `[MOVE SEGMENTS]`, then one
//! `[TRANSITION i]` per transition and one `[PLAYLIST ELEMENT i]` per
//! element, processed in numeric index order.

use crate::error::{BnkError, Result};
use crate::objects::{
    HircObject, MusicPlaylistObject, ObjectBody, PlaylistElement, PlaylistTransition,
};
use rand::Rng;
use std::fmt::Write as _;

pub const NEW_ID_PLACEHOLDER: &str = "<NEW ID>";

pub fn export_text(playlist: &MusicPlaylistObject, objects: &[HircObject]) -> String {
    let mut out = String::new();

    if !playlist.segment_ids.is_empty() {
        out.push_str("[SEGMENTS]\n");
        for (i, segment_id) in playlist.segment_ids.iter().enumerate() {
            let _ = writeln!(out, "segment{} = {}", i + 1, segment_id);
        }
        out.push('\n');
    }

    for (i, transition) in playlist.transitions.iter().enumerate() {
        let _ = writeln!(out, "[TRANSITION {}]", i + 1);
        let _ = writeln!(out, "source_id = {}", transition.source_id);
        let _ = writeln!(out, "dest_id = {}", transition.dest_id);
        let _ = writeln!(out, "source_fadeout = {}", transition.source_fadeout);
        let _ = writeln!(
            out,
            "source_shape_curve_fadeout = {}",
            transition.source_shape_curve_fadeout
        );
        let _ = writeln!(
            out,
            "source_fadeout_offset = {}",
            transition.source_fadeout_offset
        );
        let _ = writeln!(out, "unk_field32_1 = {}", transition.unk_field32_1);
        let _ = writeln!(out, "unk_field32_2 = {}", transition.unk_field32_2);
        let _ = writeln!(out, "unk_field32_3 = {}", transition.unk_field32_3);
        let _ = writeln!(out, "src_type = {}", transition.src_type);
        let _ = writeln!(out, "dest_fadein = {}", transition.dest_fadein);
        let _ = writeln!(
            out,
            "dest_shape_curve_fadein = {}",
            transition.dest_shape_curve_fadein
        );
        let _ = writeln!(
            out,
            "dest_fadein_offset = {}",
            transition.dest_fadein_offset
        );
        let _ = writeln!(out, "unk_field32_4 = {}", transition.unk_field32_4);
        let _ = writeln!(out, "unk_field32_5 = {}", transition.unk_field32_5);
        let _ = writeln!(out, "unk_field16_1 = {}", transition.unk_field16_1);
        let _ = writeln!(out, "dest_type = {}", transition.dest_type);
        let _ = writeln!(out, "unk_field8_1 = {}", transition.unk_field8_1);
        let _ = writeln!(
            out,
            "has_segment = {}",
            if transition.has_segment { "True" } else { "False" }
        );
        let _ = writeln!(out, "trans_segment_id = {}", transition.trans_segment_id);
        let _ = writeln!(out, "trans_fadein = {}", transition.trans_fadein);
        let _ = writeln!(
            out,
            "trans_shape_curve_fadein = {}",
            transition.trans_shape_curve_fadein
        );
        let _ = writeln!(
            out,
            "trans_fadein_offset = {}",
            transition.trans_fadein_offset
        );
        let _ = writeln!(out, "trans_fadeout = {}", transition.trans_fadeout);
        let _ = writeln!(
            out,
            "trans_shape_curve_fadeout = {}",
            transition.trans_shape_curve_fadeout
        );
        let _ = writeln!(
            out,
            "trans_fadeout_offset = {}",
            transition.trans_fadeout_offset
        );
        let _ = writeln!(out, "trans_fadein_type = {}", transition.trans_fadein_type);
        let _ = writeln!(
            out,
            "trans_fadeout_type = {}",
            transition.trans_fadeout_type
        );
        out.push('\n');
    }

    for (i, element) in playlist.elements.iter().enumerate() {
        let _ = writeln!(out, "[PLAYLIST ELEMENT {}]", i + 1);

        // Informational: the audio ids of the tracks under the referenced
        // segment. Ignored on reimport.
        let tracks = element_tracks(element.music_segment_id, objects);
        if !tracks.is_empty() {
            let _ = writeln!(
                out,
                "tracks = {}",
                tracks
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let _ = writeln!(out, "music_segment_id = {}", element.music_segment_id);
        let _ = writeln!(out, "id = {}", element.id);
        let _ = writeln!(out, "child_elements = {}", element.child_elements);
        let _ = writeln!(out, "playlist_type = {}", element.playlist_type);
        let _ = writeln!(out, "loop_count = {}", element.loop_count);
        let _ = writeln!(out, "weight = {}", element.weight);
        let _ = writeln!(out, "times_in_row = {}", element.times_in_row);
        let _ = writeln!(out, "unk_field8_1 = {}", element.unk_field8_1);
        let _ = writeln!(out, "random_type = {}", element.random_type);
        out.push('\n');
    }

    out
}

fn element_tracks(segment_id: u32, objects: &[HircObject]) -> Vec<u32> {
    let segment = objects.iter().find_map(|object| match &object.body {
        ObjectBody::MusicSegment(segment) if object.id == segment_id => Some(segment),
        _ => None,
    });

    let Some(segment) = segment else {
        return Vec::new();
    };

    objects
        .iter()
        .filter(|object| segment.child_ids.contains(&object.id))
        .filter_map(|object| match &object.body {
            ObjectBody::MusicTrack(track) => Some(track.id1),
            ObjectBody::CustomMusicTrack(track) => Some(track.audio_id),
            _ => None,
        })
        .collect()
}

/// Apply an exchange file onto the playlist: non-empty sections replace
/// the corresponding arrays wholesale. Returns the segment ids listed
/// under `[MOVE SEGMENTS]`.
pub fn apply_import(
    playlist: &mut MusicPlaylistObject,
    text: &str,
    rng: &mut impl Rng,
) -> Result<Vec<u32>> {
    let document = parse_document(text)?;

    let mut segments = Vec::new();
    let mut move_segments = Vec::new();
    let mut transition_sections = Vec::new();
    let mut element_sections = Vec::new();

    for (index, (name, entries)) in document.iter().enumerate() {
        if name == "SEGMENTS" {
            for (_, value) in entries {
                segments.push(parse_number::<u32>("SEGMENTS", value)?);
            }
        } else if name == "MOVE SEGMENTS" {
            for (_, value) in entries {
                move_segments.push(parse_number::<u32>("MOVE SEGMENTS", value)?);
            }
        } else if let Some(rest) = name.strip_prefix("TRANSITION ") {
            transition_sections.push((parse_number::<usize>(name, rest)?, index));
        } else if let Some(rest) = name.strip_prefix("PLAYLIST ELEMENT ") {
            element_sections.push((parse_number::<usize>(name, rest)?, index));
        }
    }

    transition_sections.sort();
    element_sections.sort();

    let mut transitions = Vec::with_capacity(transition_sections.len());
    for (_, index) in transition_sections {
        let section = Section(&document[index]);
        transitions.push(PlaylistTransition {
            source_id: section.number("source_id")?,
            dest_id: section.number("dest_id")?,
            source_fadeout: section.number("source_fadeout")?,
            source_shape_curve_fadeout: section.number("source_shape_curve_fadeout")?,
            source_fadeout_offset: section.number("source_fadeout_offset")?,
            unk_field32_1: section.number("unk_field32_1")?,
            unk_field32_2: section.number("unk_field32_2")?,
            unk_field32_3: section.number("unk_field32_3")?,
            src_type: section.number("src_type")?,
            dest_fadein: section.number("dest_fadein")?,
            dest_shape_curve_fadein: section.number("dest_shape_curve_fadein")?,
            dest_fadein_offset: section.number("dest_fadein_offset")?,
            unk_field32_4: section.number("unk_field32_4")?,
            unk_field32_5: section.number("unk_field32_5")?,
            unk_field16_1: section.number("unk_field16_1")?,
            dest_type: section.number("dest_type")?,
            unk_field8_1: section.number("unk_field8_1")?,
            has_segment: section.boolean("has_segment")?,
            trans_segment_id: section.number("trans_segment_id")?,
            trans_fadein: section.number("trans_fadein")?,
            trans_shape_curve_fadein: section.number("trans_shape_curve_fadein")?,
            trans_fadein_offset: section.number("trans_fadein_offset")?,
            trans_fadeout: section.number("trans_fadeout")?,
            trans_shape_curve_fadeout: section.number("trans_shape_curve_fadeout")?,
            trans_fadeout_offset: section.number("trans_fadeout_offset")?,
            trans_fadein_type: section.number("trans_fadein_type")?,
            trans_fadeout_type: section.number("trans_fadeout_type")?,
        });
    }

    let mut elements = Vec::with_capacity(element_sections.len());
    for (_, index) in element_sections {
        let section = Section(&document[index]);

        let id = match section.get("id")? {
            NEW_ID_PLACEHOLDER => new_element_id(rng, &playlist.elements, &elements),
            value => parse_number(section.name(), value)?,
        };

        elements.push(PlaylistElement {
            music_segment_id: section.number("music_segment_id")?,
            id,
            child_elements: section.number("child_elements")?,
            playlist_type: section.number("playlist_type")?,
            loop_count: section.number("loop_count")?,
            weight: section.number("weight")?,
            times_in_row: section.number("times_in_row")?,
            unk_field8_1: section.number("unk_field8_1")?,
            random_type: section.number("random_type")?,
        });
    }

    if !segments.is_empty() {
        playlist.segment_ids = segments;
    }
    if !transitions.is_empty() {
        playlist.transitions = transitions;
    }
    if !elements.is_empty() {
        playlist.elements = elements;
    }

    Ok(move_segments)
}

/// Random element id unique within the playlist (both the elements being
/// replaced and the ones already imported).
fn new_element_id(
    rng: &mut impl Rng,
    old: &[PlaylistElement],
    imported: &[PlaylistElement],
) -> u32 {
    loop {
        let id: u32 = rng.random();
        if old.iter().chain(imported).any(|element| element.id == id) {
            continue;
        }
        return id;
    }
}

type SectionEntries = (String, Vec<(String, String)>);

fn parse_document(text: &str) -> Result<Vec<SectionEntries>> {
    let mut sections: Vec<SectionEntries> = Vec::new();

    for (line_number, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            sections.push((name.trim().to_string(), Vec::new()));
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(BnkError::PlaylistFormat(format!(
                "line {}: expected `key = value`",
                line_number + 1
            )));
        };
        let Some(section) = sections.last_mut() else {
            return Err(BnkError::PlaylistFormat(format!(
                "line {}: key outside any section",
                line_number + 1
            )));
        };
        section
            .1
            .push((key.trim().to_lowercase(), value.trim().to_string()));
    }

    Ok(sections)
}

struct Section<'a>(&'a SectionEntries);

impl<'a> Section<'a> {
    fn name(&self) -> &str {
        &self.0.0
    }

    fn get(&self, key: &str) -> Result<&'a str> {
        self.0
            .1
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| {
                BnkError::PlaylistFormat(format!("[{}] is missing key `{}`", self.0.0, key))
            })
    }

    fn number<T>(&self, key: &str) -> Result<T>
    where
        T: TryFrom<i64>,
    {
        parse_number(self.name(), self.get(key)?)
    }

    fn boolean(&self, key: &str) -> Result<bool> {
        match self.get(key)?.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            other => Err(BnkError::PlaylistFormat(format!(
                "[{}] `{}` is not a boolean: {}",
                self.0.0, key, other
            ))),
        }
    }
}

fn parse_number<T>(context: &str, value: &str) -> Result<T>
where
    T: TryFrom<i64>,
{
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|parsed| T::try_from(parsed).ok())
        .ok_or_else(|| {
            BnkError::PlaylistFormat(format!("[{context}] `{value}` is not a valid integer"))
        })
}
