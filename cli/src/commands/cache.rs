use anyhow::Result;
use soundscache::{BitLength, Cache, pack, scan_folder};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const CACHE_FILE: &str = "soundspc.cache";

pub fn create_sounds_cache(folder: &Path) -> Result<()> {
    println!("Creating sounds cache...");
    println!();

    let inputs = scan_folder(folder)?;
    for input in &inputs {
        println!("[PACKING] {}", input.name);
    }

    let image = pack(&inputs)?;
    fs::write(CACHE_FILE, image)?;

    println!();
    println!("Finished!");
    Ok(())
}

pub fn decode_sounds_cache(input: &Path) -> Result<()> {
    print!("Decoding sounds cache...");
    io::stdout().flush()?;
    let cache = Cache::open(input)?;
    println!("Done!");
    println!();

    println!("ID: CS3W");
    println!(
        "BIT LENGTH: {}",
        match cache.bitlength {
            BitLength::B32 => 32,
            BitLength::B64 => 64,
        }
    );
    println!("UNK FIELD32 1: 0x{:X}", cache.unk_field32_1);
    println!("UNK FIELD32 2: 0x{:X}", cache.unk_field32_2);
    println!("INFO OFFSET: {}", cache.info_offset);
    println!("FILES: {}", cache.file_count);
    println!("NAMES OFFSET: {}", cache.names_offset);
    println!("NAMES SIZE: {}", cache.names_size);

    if let Some(value) = cache.unk_field32_3 {
        println!("UNK FIELD32 3 (POSSIBLY BUFFER COUNT): {value}");
    }

    println!("BUFFER SIZE: {}", cache.bufsize);
    println!("CHECKSUM: 0x{:X}", cache.checksum);
    println!("DATA OFFSET: {}", cache.data_offset);
    println!("DATA SIZE: {}", cache.data.len());
    println!("INFO SIZE: {}", cache.info.len());
    println!("NULL BYTES IN NAMES: {}", cache.null_bytes_in_names());
    println!("NAMES FOUND: {}", cache.names_found());

    let (entries, remainder) = cache.info_entries();
    if remainder != 0 {
        println!("INFO FOUND: BROKEN");
    } else {
        println!("INFO FOUND: {entries}");
    }
    println!();

    Ok(())
}
