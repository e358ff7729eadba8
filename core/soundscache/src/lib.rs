pub mod error;
pub mod fnv;
pub mod reader;
pub mod types;
pub mod writer;

pub use error::{CacheError, Result};
pub use fnv::fnv1a64;
pub use reader::Cache;
pub use types::*;
pub use writer::{pack, required_bitlength, scan_folder};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn input(name: &str, data: Vec<u8>) -> CacheInput {
        CacheInput {
            name: name.to_string(),
            data,
        }
    }

    #[test]
    fn cache_round_trip_with_dedup() {
        let inputs = vec![
            input("c.bnk", vec![7u8; 4096]),
            input("a.wem", vec![1u8; 100]),
            input("b.wem", vec![1u8; 100]), // content-equal to a.wem
        ];

        let image = pack(&inputs).unwrap();
        let cache = Cache::read(&mut Cursor::new(&image)).unwrap();

        assert_eq!(cache.bitlength, BitLength::B32);
        assert_eq!(cache.file_count, 3);
        assert_eq!(cache.data_offset, 0x30);
        // b.wem shares a.wem's blob, so the data region holds two payloads
        assert_eq!(cache.data.len(), 4096 + 100);
        assert_eq!(cache.names, b"c.bnk\0a.wem\0b.wem\0");
        assert_eq!(cache.bufsize, 4096);
        assert!(cache.verify_checksum());

        let entries = cache.entries().unwrap();
        assert_eq!(entries.len(), 3);
        for (entry, original) in entries.iter().zip(&inputs) {
            assert_eq!(entry.name, original.name);
            assert_eq!(entry.data, original.data);
        }
    }

    #[test]
    fn dedup_shares_a_single_offset() {
        let inputs = vec![
            input("a.wem", vec![9u8; 64]),
            input("b.wem", vec![9u8; 64]),
        ];
        let image = pack(&inputs).unwrap();
        let cache = Cache::read(&mut Cursor::new(&image)).unwrap();

        // info entries: (name, data, size) as u32 each
        let fields: Vec<u32> = cache
            .info
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(fields[1], fields[4], "both entries point at one blob");
        assert_eq!(cache.data.len(), 64);
    }

    #[test]
    fn bufsize_covers_the_largest_file() {
        let inputs = vec![
            input("a.wem", vec![0u8; 5000]),
            input("b.wem", vec![0u8; 100]),
        ];
        let image = pack(&inputs).unwrap();
        let cache = Cache::read(&mut Cursor::new(&image)).unwrap();
        assert_eq!(cache.bufsize, 8192);
    }

    #[test]
    fn inspection_counts() {
        let inputs = vec![
            input("a.wem", vec![1]),
            input("b.wem", vec![2]),
            input("c.wem", vec![3]),
        ];
        let image = pack(&inputs).unwrap();
        let cache = Cache::read(&mut Cursor::new(&image)).unwrap();

        assert_eq!(cache.null_bytes_in_names(), 3);
        assert_eq!(cache.names_found(), 3);
        assert_eq!(cache.info_entries(), (3, 0));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let image = b"NOPE\x01\x00\x00\x00".to_vec();
        assert!(matches!(
            Cache::read(&mut Cursor::new(&image)),
            Err(CacheError::BadHead)
        ));
    }
}
