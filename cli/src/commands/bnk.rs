use anyhow::{Context, Result, bail};
use bnk::{
    ActionTail, IdDatabase, ObjectBody, ParamValue, SoundInclude, Soundbank,
};
use clap::Args;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const ID_DATABASE: &str = "objectids.db";

#[derive(Args)]
pub struct RebuildArgs {
    /// Re-skin the music tracks matching the WEM's numeric id
    #[arg(long, group = "mode")]
    music: bool,
    /// Inject a new track/segment pair for the WEM (uses objectids.db)
    #[arg(long, group = "mode")]
    add_new_music: bool,
    /// Resolve the playlists owning a track's audio id
    #[arg(long, group = "mode")]
    playlist_id_from_track: bool,
    /// Export a playlist to <ID>_playlist.ini
    #[arg(long, group = "mode")]
    export_playlist: bool,
    /// Reimport <ID>_playlist.ini and rebuild
    #[arg(long, group = "mode")]
    reimport_playlist: bool,
    /// Dump every embedded sound as <id>.wem into FOLDER
    #[arg(long, group = "mode")]
    dump_sounds: bool,
    /// Print the chunk summary
    #[arg(long, group = "mode")]
    debug: bool,
    /// Print an event object and its actions
    #[arg(long, group = "mode")]
    debug_event: bool,
    /// Print a sound object
    #[arg(long, group = "mode")]
    debug_sound: bool,
    /// Print any object's raw payload
    #[arg(long, group = "mode")]
    debug_object: bool,
    /// Find the object owning an audio id
    #[arg(long, group = "mode")]
    debug_owner: bool,

    /// Soundbank file
    bnk: PathBuf,
    /// FOLDER, WEM file, or numeric id, depending on the mode
    value: Option<String>,
}

impl RebuildArgs {
    fn value(&self) -> Result<&str> {
        self.value.as_deref().context("missing argument")
    }

    fn id_value(&self) -> Result<u32> {
        let value = self.value()?;
        value
            .parse::<u32>()
            .with_context(|| format!("`{value}` is not a valid id"))
    }
}

pub fn handle(args: RebuildArgs) -> Result<()> {
    print!("Reading soundbank...");
    io::stdout().flush()?;
    let mut bank = Soundbank::open(&args.bnk)?;
    println!("Done!");

    if args.debug {
        println!();
        debug(&bank);
    } else if args.debug_event {
        println!();
        debug_event(&bank, args.id_value()?);
    } else if args.debug_sound {
        println!();
        debug_sound(&bank, args.id_value()?);
    } else if args.debug_object {
        println!();
        debug_object(&bank, args.id_value()?)?;
    } else if args.debug_owner {
        println!();
        debug_owner(&bank, args.id_value()?);
    } else if args.music {
        print!("Rebuilding music...");
        io::stdout().flush()?;
        bank.rebuild_music(args.value()?)?;
        write_rebuilt(&mut bank, &args.bnk)?;
        println!("Done!");
    } else if args.add_new_music {
        print!("Adding new music...");
        io::stdout().flush()?;
        let database = IdDatabase::load(ID_DATABASE)
            .with_context(|| format!("could not load {ID_DATABASE}"))?;
        let segment_id = bank.add_music(args.value()?, &mut rand::rng(), &database)?;
        write_rebuilt(&mut bank, &args.bnk)?;
        println!("Done!");
        println!("[*] Music segment object ID: '{segment_id}'");
    } else if args.playlist_id_from_track {
        println!();
        let playlist_ids = bank.get_playlist_ids(args.id_value()?)?;
        println!("[*] Playlists found: {}", playlist_ids.len());
        println!(
            "[*] Playlists IDs: {}",
            playlist_ids
                .iter()
                .map(|id| format!("'{id}'"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    } else if args.export_playlist {
        print!("Exporting playlist...");
        io::stdout().flush()?;
        let playlist_id = args.id_value()?;
        let text = bank.export_playlist(playlist_id)?;
        fs::write(playlist_file(playlist_id), text)?;
        println!("Done!");
    } else if args.reimport_playlist {
        print!("Reimporting playlist...");
        io::stdout().flush()?;
        let playlist_id = args.id_value()?;
        let file = playlist_file(playlist_id);
        let text = fs::read_to_string(&file).with_context(|| format!("could not read {file}"))?;
        bank.reimport_playlist(playlist_id, &text, &mut rand::rng())?;
        write_rebuilt(&mut bank, &args.bnk)?;
        println!("Done!");
    } else if args.dump_sounds {
        print!("Dumping sounds...");
        io::stdout().flush()?;
        bank.dump_sounds(args.value()?)?;
        println!("Done!");
    } else {
        // Default mode: replace embedded WEMs from a folder and rebuild.
        if bank.data_index.is_none() {
            bail!("soundbank does not contain embedded files");
        }
        print!("Rebuilding sounds...");
        io::stdout().flush()?;
        bank.rebuild_data(args.value()?)?;
        write_rebuilt(&mut bank, &args.bnk)?;
        println!("Done!");
    }

    Ok(())
}

fn playlist_file(playlist_id: u32) -> String {
    format!("{playlist_id}_playlist.ini")
}

/// Build the full image first; the output file only appears on success.
fn write_rebuilt(bank: &mut Soundbank, bnk_path: &Path) -> Result<()> {
    let image = bank.build()?;
    fs::write(format!("{}.rebuilt", bnk_path.display()), image)?;
    Ok(())
}

fn debug(bank: &Soundbank) {
    println!("--- HEADER ---");
    println!("HEAD: BKHD");
    println!("LENGTH: {}", bank.header.length);
    println!("VERSION: {}", bank.header.version);
    println!("ID: {}", bank.header.id);
    println!("UNK FIELD32 1: {}", bank.header.unk_field32_1);
    println!("UNK FIELD32 2: {}", bank.header.unk_field32_2);
    if !bank.header.unk_data.is_empty() {
        println!("UNK DATA LENGTH: {}", bank.header.unk_data.len());
    }
    println!("--- HEADER ---");
    println!();

    if !bank.is_init {
        if let Some(index) = &bank.data_index {
            println!("--- DATA INDEX ---");
            println!("HEAD: DIDX");
            println!("LENGTH: {}", index.length);
            for (i, entry) in index.entries.iter().enumerate() {
                println!(
                    "DATA INFO {}: (ID: {}), (OFFSET: {}), (SIZE: {})",
                    i + 1,
                    entry.id,
                    entry.offset,
                    entry.size
                );
            }
            println!("--- DATA INDEX ---");
            println!();
        }

        if let (Some(data), Some(index)) = (&bank.data, &bank.data_index) {
            println!("--- DATA ---");
            println!("HEAD: DATA");
            println!("LENGTH (NON PADDED): {}", index.total_size());
            println!("LENGTH: {}", data.length);
            println!("OFFSET: {}", data.offset);
            println!("--- DATA ---");
            println!();
        }
    } else if let Some(stmg) = &bank.stmg {
        println!("--- MANAGER ---");
        println!("HEAD: STMG");
        println!("LENGTH: {}", stmg.length);
        println!("VOLUME: {:.6}", stmg.volume);
        println!("MAX VOICE INSTANCES: {}", stmg.max_voice_instances);
        println!("STATE GROUPS: {}", stmg.state_groups.len());
        println!("SWITCH GROUPS: {}", stmg.switch_groups.len());
        println!("GAME PARAMETERS: {}", stmg.game_parameters.len());
        println!("--- MANAGER ---");
        println!();
    }

    println!("--- OBJECTS ---");
    println!("HEAD: HIRC");
    println!("LENGTH: {}", bank.hirc.length);
    println!("QUANTITY: {}", bank.hirc.objects.len());

    let mut type_counts: Vec<(u8, usize)> = Vec::new();
    for object in &bank.hirc.objects {
        let object_type = object.object_type();
        match type_counts.iter_mut().find(|(t, _)| *t == object_type) {
            Some((_, count)) => *count += 1,
            None => type_counts.push((object_type, 1)),
        }
    }
    for (object_type, count) in type_counts {
        println!("TYPE {object_type}: {count}");
    }

    println!("--- OBJECTS ---");
    println!();

    if !bank.is_init {
        if let Some(stid) = &bank.stid {
            println!("--- SOUND TYPE ID ---");
            println!("HEAD: STID");
            println!("LENGTH: {}", stid.length);
            println!("UNK FIELD32 1: {}", stid.unk_field32_1);
            println!("QUANTITY: {}", stid.quantity);
            println!("REMAINING SIZE: {}", stid.remaining.len());
            println!("--- SOUND TYPE ID ---");
            println!();
        }
    } else if let Some(envs) = &bank.envs {
        println!("--- ENVIRONMENTS ---");
        println!("HEAD: ENVS");
        println!("LENGTH: {}", envs.length);
        println!("UNK DATA LENGTH: {}", envs.unk_data.len());
        println!("--- ENVIRONMENTS ---");
        println!();
    }
}

fn debug_event(bank: &Soundbank, event_id: u32) {
    let Some(object) = bank.object_by_id(event_id) else {
        println!("No event object by ID {event_id}.");
        return;
    };

    match &object.body {
        ObjectBody::Event(event) => {
            println!("Event Object ID: {}", object.id);
            println!("Event Actions: {}", event.action_ids.len());
            println!();

            for (i, action_id) in event.action_ids.iter().enumerate() {
                println!("*** EVENT ACTION {:03} ***", i + 1);
                debug_event(bank, *action_id);
                println!();
            }
        }
        ObjectBody::EventAction(action) => {
            println!("Event Action Object ID: {}", object.id);
            println!("Event Action Scope: {}", action.scope);
            println!("Event Action Type: {}", action.action_type);
            println!("Event Action Game Object ID: {}", action.game_object_id);
            println!("UNK FIELD 8 1: {}", action.unk_field8_1);
            println!(
                "Event Action Additional Parameters Count: {}",
                action.additional_parameters.len()
            );
            println!(
                "Event Action Additional Parameters: {}",
                action
                    .additional_parameters
                    .iter()
                    .map(|parameter| match parameter.value {
                        ParamValue::Float(value) => {
                            format!("({}: {:.3})", parameter.param_type, value)
                        }
                        ParamValue::Uint(value) => format!("({}: {})", parameter.param_type, value),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("UNK FIELD 8 2: {}", action.unk_field8_2);

            match &action.tail {
                ActionTail::SetState {
                    state_group_id,
                    state_id,
                } => {
                    println!("Event Action State Group ID: {state_group_id}");
                    println!("Event Action State ID: {state_id}");
                }
                ActionTail::SetSwitch {
                    switch_group_id,
                    switch_id,
                } => {
                    println!("Event Action Switch Group ID: {switch_group_id}");
                    println!("Event Action Switch ID: {switch_id}");
                }
                ActionTail::None => {}
            }

            if !action.unk_data.is_empty() {
                println!("UNK DATA: {}", hex::encode_upper(&action.unk_data));
            }

            println!("---------- SOUND ----------");
            debug_sound(bank, action.game_object_id);
            println!("---------- SOUND ----------");
        }
        _ => println!("No event object by ID {event_id}."),
    }
}

fn debug_sound(bank: &Soundbank, sound_id: u32) {
    let Some(object) = bank.object_by_id(sound_id) else {
        println!("No sound object by ID {sound_id}.");
        return;
    };

    match &object.body {
        ObjectBody::Sound(sound) => {
            println!("Sound Object ID: {}", object.id);
            println!("UNK FIELD 32 1: {}", sound.unk_field32_1);
            println!("Sound Include Type: {}", sound.include.tag());
            println!("Sound Audio ID: {}", sound.audio_id);
            println!("Sound Source ID: {}", sound.source_id);

            if let SoundInclude::Embedded { offset, size } = sound.include {
                println!("Sound Offset: {offset}");
                println!("Sound Size: {size}");
            }

            println!("Sound Type: {}", sound.sound_type as u8);
            match sound.structure.to_bytes() {
                Ok(bytes) => println!("Sound Structure: {}", hex::encode_upper(&bytes)),
                Err(err) => println!("Sound Structure: <unserialisable: {err}>"),
            }
        }
        _ => println!("No sound object by ID {sound_id}."),
    }
}

fn debug_object(bank: &Soundbank, object_id: u32) -> Result<()> {
    match bank.object_by_id(object_id) {
        Some(object) => {
            let payload = object.payload()?;
            println!("Object ID: {}", object.id);
            println!("Object Type: {}", object.object_type());
            println!("Object Size: {}", payload.len());
            println!("Object Data: {}", hex::encode_upper(&payload));
        }
        None => println!("No object by ID {object_id}."),
    }
    Ok(())
}

fn debug_owner(bank: &Soundbank, audio_id: u32) {
    for object in &bank.hirc.objects {
        match &object.body {
            ObjectBody::Sound(sound) if sound.audio_id == audio_id => {
                println!("Object Owner ID: {}", object.id);
                println!("Object Owner Type: SOUND");
                return;
            }
            ObjectBody::MusicTrack(track) if track.id1 == audio_id => {
                println!("Object Owner ID: {}", object.id);
                println!("Object Owner Type: MUSIC");
                return;
            }
            ObjectBody::CustomMusicTrack(track) if track.audio_id == audio_id => {
                println!("Object Owner ID: {}", object.id);
                println!("Object Owner Type: MUSIC");
                return;
            }
            _ => {}
        }
    }

    println!("No object owner found for audio ID {audio_id}.");
}
