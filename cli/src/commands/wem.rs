use anyhow::Result;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use wem::{Wem, merge, wave::Wave};

pub fn compare_wem(input: &Path, output: &Path) -> Result<()> {
    print!("Analyzing...");
    io::stdout().flush()?;

    let source = Wem::open(input)?;
    let target = Wem::open(output)?;

    println!("Done!");
    println!();

    show_table(&source, &target);
    println!();

    if yes_or_no("Merge headers")? {
        let merged = merge(&source, &target)?;
        let merged_path = format!("{}.merged", output.display());
        fs::write(&merged_path, merged)?;
        println!("Wrote {merged_path}");
    }

    Ok(())
}

pub fn prepare_wave(file: &Path, count: u32) -> Result<()> {
    print!("[*] Reading WAVE...");
    io::stdout().flush()?;
    let wave = Wave::open(file)?;
    println!(" Done!");

    print!("[*] Writing WAVE...");
    io::stdout().flush()?;
    let cued = wave.write_cued(count)?;
    fs::write(format!("{}.cued", file.display()), cued)?;
    println!(" Done!");

    Ok(())
}

fn yes_or_no(message: &str) -> Result<bool> {
    loop {
        print!("{message}? [Y]es/[N]o: ");
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;

        match answer.trim().to_lowercase().as_str() {
            "yes" | "ye" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => {}
        }
    }
}

fn yes_no(present: bool) -> &'static str {
    if present { "Yes" } else { "No" }
}

fn table_rows(wem: &Wem) -> Vec<String> {
    let mut rows = vec![
        format!("RIFF SIZE: {}", wem.riff_size),
        format!("CUE: {}", yes_no(wem.cue.is_some())),
        format!("LIST: {}", yes_no(wem.list.is_some())),
        format!("SMPL: {}", yes_no(wem.smpl.is_some())),
        format!("VORB: {}", yes_no(!wem.fake_vorb)),
        match &wem.list {
            Some(list) => format!("LIST SIZE: {}", list.size),
            None => String::new(),
        },
        format!("FMT SIZE: {}", wem.fmt_size),
        format!("DATA SIZE: {}", wem.data_size),
        format!("CODEC ID: {}", wem.codec_id),
        format!("CHANNELS: {}", wem.channels),
        format!("SAMPLE RATE: {}", wem.sample_rate),
        format!("AVG BYTES PER SECOND: {}", wem.avg_bytes_per_second),
        format!("BPS: {}", wem.bits_per_sample),
        format!("EXTRA FMT LENGTH: {}", wem.extra_fmt_length),
        format!("EXT UNKNOWN: {}", wem.ext_unk),
        format!("SUBTYPE: {}", wem.subtype),
        format!("SAMPLE COUNT: {}", wem.sample_count),
        format!("NO GRANULE: {}", yes_no(wem.no_granule)),
        format!("MOD SIGNAL: {}", wem.mod_signal),
        format!("MOD PACKETS: {}", yes_no(wem.mod_packets)),
        format!("SETUP PACKET OFFSET: {}", wem.setup_packet_offset),
        format!(
            "FIRST AUDIO PACKET OFFSET: {}",
            wem.first_audio_packet_offset
        ),
        format!(
            "HEADER TRIAD PRESENT: {}",
            yes_no(wem.header_triad_present)
        ),
        format!("OLD PACKET HEADERS: {}", yes_no(wem.old_packet_headers)),
        format!("UID: {}", wem.uid),
        format!("BLOCKSIZE 0: {}", wem.blocksize_0_pow),
        format!("BLOCKSIZE 1: {}", wem.blocksize_1_pow),
        format!(
            "UNK FMT FIELDS 32: {}, {}, {}, {}, {}",
            wem.fmt_unk_field32_1,
            wem.fmt_unk_field32_2,
            wem.fmt_unk_field32_3,
            wem.fmt_unk_field32_4,
            wem.fmt_unk_field32_5
        ),
    ];

    match &wem.cue {
        Some(cue) => rows.extend([
            format!("CUE COUNT: {}", cue.count),
            format!("CUE SIZE: {}", cue.size),
            format!("CUE ID: {}", cue.id),
            format!("CUE POSITION: {}", cue.position),
            format!("CUE DATACHUNKID: {}", cue.data_chunk_id),
            format!("CUE CHUNKSTART: {}", cue.chunk_start),
            format!("CUE BLOCKSTART: {}", cue.block_start),
            format!("CUE SAMPLEOFFSET: {}", cue.sample_offset),
        ]),
        None => rows.extend([
            "CUE COUNT: 0".to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ]),
    }

    rows.push(format!("LOOP COUNT: {}", wem.loop_count()));
    rows
}

fn show_table(source: &Wem, target: &Wem) {
    let left = table_rows(source);
    let right = table_rows(target);

    let left_width = left
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("INPUT".len());
    let right_width = right
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("OUTPUT".len());

    let header = format!("{:<left_width$} {:<right_width$}", "INPUT", "OUTPUT");
    let rule = "-".repeat(header.len());

    println!("{rule}");
    println!("{header}");
    for (a, b) in left.iter().zip(&right) {
        println!("{a:<left_width$} {b:<right_width$}");
    }
    println!("{rule}");
}
