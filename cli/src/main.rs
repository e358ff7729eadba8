use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{bnk, cache, sounds, wem};

#[derive(Parser)]
#[command(name = "sbtool")]
#[command(about = "Toolkit for SoundBank/WEM audio assets and the sounds cache", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two WEM headers and optionally write OUTPUT.merged
    CompareWem {
        /// Source WEM (codec metadata donor)
        input: PathBuf,
        /// Target WEM (container identity)
        output: PathBuf,
    },
    /// Pack a folder of .bnk/.wem files into soundspc.cache
    CreateSoundsCache {
        folder: PathBuf,
    },
    /// Inspect a sounds cache header and its regions
    DecodeSoundsCache {
        input: PathBuf,
    },
    /// Copy SRC_FILE next to every matching entry of soundbanksinfo.xml
    GetSounds {
        sfx_type: String,
        substring: String,
        src_file: PathBuf,
    },
    /// Write FILE.cued with a cue point and the payload repeated
    PrepareWave {
        file: PathBuf,
        count: Option<u32>,
    },
    /// Rebuild or inspect a soundbank
    RebuildSoundbank(bnk::RebuildArgs),
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::CompareWem { input, output } => wem::compare_wem(&input, &output),
        Commands::CreateSoundsCache { folder } => cache::create_sounds_cache(&folder),
        Commands::DecodeSoundsCache { input } => cache::decode_sounds_cache(&input),
        Commands::GetSounds {
            sfx_type,
            substring,
            src_file,
        } => sounds::get_sounds(&sfx_type, &substring, &src_file),
        Commands::PrepareWave { file, count } => wem::prepare_wave(&file, count.unwrap_or(0)),
        Commands::RebuildSoundbank(args) => bnk::handle(args),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
