use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

const XML_FILE: &str = "soundbanksinfo.xml";

/// Walk the third child of `<SoundBanksInfo>`; for every `<File>` with
/// `Language="SFX"` whose `<ShortName>` starts with `SFX_TYPE\` and
/// contains SUBSTRING, copy the source file to `<Id>.wem`.
pub fn get_sounds(sfx_type: &str, substring: &str, src_file: &Path) -> Result<()> {
    let sfx_type = sfx_type.trim().to_lowercase();
    let substring = substring.trim().to_lowercase();

    if src_file.extension().is_none_or(|ext| ext != "wem") {
        bail!("file type is not supported");
    }

    let mut reader = Reader::from_file(XML_FILE).context("could not open soundbanksinfo.xml")?;
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut root_children = 0usize;
    let mut current: Option<FileEntry> = None;
    let mut in_shortname = false;
    let mut copied = 0usize;

    struct FileEntry {
        id: u32,
        short_name: String,
    }

    let file_entry = |element: &BytesStart| -> Option<FileEntry> {
        let mut id = None;
        let mut language_sfx = false;
        for attribute in element.attributes().flatten() {
            match attribute.key.as_ref() {
                b"Id" => {
                    id = String::from_utf8_lossy(&attribute.value).parse::<u32>().ok();
                }
                b"Language" => {
                    language_sfx = attribute.value.as_ref() == b"SFX";
                }
                _ => {}
            }
        }
        match (id, language_sfx) {
            (Some(id), true) => Some(FileEntry {
                id,
                short_name: String::new(),
            }),
            _ => None,
        }
    };

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => {
                if depth == 1 {
                    root_children += 1;
                }

                // Only files under the third top-level section count.
                if depth == 2 && root_children == 3 && element.name().as_ref() == b"File" {
                    current = file_entry(&element);
                } else if depth == 3 && element.name().as_ref() == b"ShortName" {
                    in_shortname = current.is_some();
                }

                depth += 1;
            }
            Event::Empty(_) => {
                if depth == 1 {
                    root_children += 1;
                }
            }
            Event::Text(text) => {
                if in_shortname {
                    if let Some(entry) = current.as_mut() {
                        entry.short_name.push_str(&text.unescape()?);
                    }
                }
            }
            Event::End(element) => {
                depth -= 1;

                if element.name().as_ref() == b"ShortName" {
                    in_shortname = false;
                } else if depth == 2 && element.name().as_ref() == b"File" {
                    if let Some(entry) = current.take() {
                        let name = entry.short_name.to_lowercase();
                        if name.starts_with(&format!("{sfx_type}\\")) && name.contains(&substring)
                        {
                            let destination = format!("{}.wem", entry.id);
                            fs::copy(src_file, &destination)?;
                            println!("[*] {destination}");
                            copied += 1;
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    println!("[*] Copied {copied} file(s)");
    Ok(())
}
