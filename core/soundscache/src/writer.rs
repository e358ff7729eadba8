use crate::error::{CacheError, Result};
use crate::fnv::fnv1a64;
use crate::types::*;
use byteorder::{LE, WriteBytesExt};
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Enumerate a folder for packing. Only plain `.wem`/`.bnk` files are
/// allowed; `.bnk` entries sort first, then `.wem`, each group by
/// lowercase basename.
pub fn scan_folder<P: AsRef<Path>>(folder: P) -> Result<Vec<CacheInput>> {
    let mut bnks = Vec::new();
    let mut wems = Vec::new();

    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let is_bnk = name.ends_with(".bnk");
        let is_wem = name.ends_with(".wem");
        if !path.is_file() || (!is_bnk && !is_wem) {
            return Err(CacheError::NotCacheable(name));
        }

        let input = CacheInput {
            name,
            data: fs::read(&path)?,
        };
        if is_bnk {
            bnks.push(input);
        } else {
            wems.push(input);
        }
    }

    if bnks.is_empty() && wems.is_empty() {
        return Err(CacheError::Empty);
    }

    bnks.sort_by_key(|input| input.name.to_lowercase());
    wems.sort_by_key(|input| input.name.to_lowercase());

    bnks.extend(wems);
    Ok(bnks)
}

/// Pick the offset width: if the 32-bit encoding would push any absolute
/// offset past u32 range, everything is re-encoded with 64-bit fields.
pub fn required_bitlength(file_count: u64, unique_data_size: u64, names_size: u64) -> BitLength {
    let info_size = file_count * 12;
    if DATA_OFFSET_32 + unique_data_size + names_size + info_size > 0xFFFF_FFFF {
        BitLength::B64
    } else {
        BitLength::B32
    }
}

/// Pack the staged files into a cache image. Identical payloads (same
/// length, same SHA-1) are stored once and shared by offset.
pub fn pack(inputs: &[CacheInput]) -> Result<Vec<u8>> {
    if inputs.is_empty() {
        return Err(CacheError::Empty);
    }

    let dedup = dedup_map(inputs);
    let unique_size: u64 = inputs
        .iter()
        .enumerate()
        .filter(|(i, _)| dedup[*i].is_none())
        .map(|(_, input)| input.data.len() as u64)
        .sum();
    let names = build_names(inputs);

    let bitlength = required_bitlength(inputs.len() as u64, unique_size, names.len() as u64);
    assemble(inputs, &dedup, &names, bitlength)
}

/// For each input, the index of an earlier input with identical content.
fn dedup_map(inputs: &[CacheInput]) -> Vec<Option<usize>> {
    let digests: Vec<[u8; 20]> = inputs
        .iter()
        .map(|input| Sha1::digest(&input.data).into())
        .collect();

    let mut map = vec![None; inputs.len()];
    for i in 0..inputs.len() {
        for j in 0..i {
            if map[j].is_none()
                && inputs[i].data.len() == inputs[j].data.len()
                && digests[i] == digests[j]
            {
                map[i] = Some(j);
                break;
            }
        }
    }
    map
}

fn build_names(inputs: &[CacheInput]) -> Vec<u8> {
    let mut names = Vec::new();
    for input in inputs {
        names.extend_from_slice(input.name.as_bytes());
        names.push(0);
    }
    names
}

fn assemble(
    inputs: &[CacheInput],
    dedup: &[Option<usize>],
    names: &[u8],
    bitlength: BitLength,
) -> Result<Vec<u8>> {
    let data_offset = bitlength.data_offset();

    // Assign blob offsets in first-appearance order.
    let mut offsets = vec![0u64; inputs.len()];
    let mut cursor = data_offset;
    for (i, input) in inputs.iter().enumerate() {
        match dedup[i] {
            Some(earlier) => offsets[i] = offsets[earlier],
            None => {
                offsets[i] = cursor;
                cursor += input.data.len() as u64;
            }
        }
    }
    let unique_end = cursor;

    // Info region: (name offset, data offset, size) per file.
    let mut info = Vec::new();
    let mut name_offset = 0u64;
    for (i, input) in inputs.iter().enumerate() {
        write_field(&mut info, bitlength, name_offset)?;
        write_field(&mut info, bitlength, offsets[i])?;
        write_field(&mut info, bitlength, input.data.len() as u64)?;
        name_offset += input.name.len() as u64 + 1;
    }

    let checksum = {
        let mut hashed = names.to_vec();
        hashed.extend_from_slice(&info);
        fnv1a64(&hashed)
    };

    let bufsize = buffer_size(inputs);

    let mut out = Vec::new();
    out.write_all(&CACHE_MAGIC)?;
    out.write_u32::<LE>(bitlength.tag())?;
    out.write_u32::<LE>(0)?;
    out.write_u32::<LE>(0)?;
    write_field(&mut out, bitlength, unique_end + names.len() as u64)?; // info offset
    write_field(&mut out, bitlength, inputs.len() as u64)?;
    write_field(&mut out, bitlength, unique_end)?; // names offset
    out.write_u32::<LE>(names.len() as u32)?;
    if bitlength == BitLength::B64 {
        out.write_u32::<LE>(1)?;
    }
    out.write_u64::<LE>(bufsize)?;
    out.write_u64::<LE>(checksum)?;

    debug_assert_eq!(out.len() as u64, data_offset);

    for (i, input) in inputs.iter().enumerate() {
        if dedup[i].is_none() {
            out.write_all(&input.data)?;
        }
    }
    out.write_all(names)?;
    out.write_all(&info)?;

    Ok(out)
}

fn write_field<W: Write>(writer: &mut W, bitlength: BitLength, value: u64) -> Result<()> {
    match bitlength {
        BitLength::B32 => writer.write_u32::<LE>(value as u32)?,
        BitLength::B64 => writer.write_u64::<LE>(value)?,
    }
    Ok(())
}

/// Largest file size rounded up to the next 4096-byte boundary, never
/// below 4096.
fn buffer_size(inputs: &[CacheInput]) -> u64 {
    let largest = inputs
        .iter()
        .map(|input| input.data.len() as u64)
        .max()
        .unwrap_or(0);

    if largest <= CACHE_BUFFER_SIZE {
        CACHE_BUFFER_SIZE
    } else {
        largest.next_multiple_of(CACHE_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, data: &[u8]) -> CacheInput {
        CacheInput {
            name: name.to_string(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn bitlength_promotes_on_overflow() {
        assert_eq!(required_bitlength(3, 4196, 18), BitLength::B32);
        assert_eq!(
            required_bitlength(100, 0x1_0000_0000, 2000),
            BitLength::B64
        );
        // Right at the boundary: the header plus regions must fit in u32.
        let fitting = 0xFFFF_FFFF - DATA_OFFSET_32 - 18 - 36;
        assert_eq!(required_bitlength(3, fitting, 18), BitLength::B32);
        assert_eq!(required_bitlength(3, fitting + 1, 18), BitLength::B64);
    }

    #[test]
    fn sixty_four_bit_layout() {
        let inputs = vec![input("a.wem", &[1, 2, 3]), input("b.wem", &[4, 5])];
        let dedup = dedup_map(&inputs);
        let names = build_names(&inputs);
        let image = assemble(&inputs, &dedup, &names, BitLength::B64).unwrap();

        assert_eq!(&image[0..4], b"CS3W");
        assert_eq!(u32::from_le_bytes(image[4..8].try_into().unwrap()), 2);
        // names offset field: 64-bit, data starts at 0x40
        let names_offset = u64::from_le_bytes(image[0x20..0x28].try_into().unwrap());
        assert_eq!(names_offset, 0x40 + 5);
        // reserved word observed as 1 in 64-bit images
        assert_eq!(u32::from_le_bytes(image[0x2C..0x30].try_into().unwrap()), 1);
    }

    #[test]
    fn buffer_size_rounds_up_to_page() {
        assert_eq!(buffer_size(&[input("a.wem", &[0; 10])]), 4096);
        assert_eq!(buffer_size(&[input("a.wem", &[0; 4096])]), 4096);
        assert_eq!(buffer_size(&[input("a.wem", &[0; 4097])]), 8192);
    }
}
