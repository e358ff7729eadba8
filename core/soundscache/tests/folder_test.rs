use soundscache::{Cache, CacheError, fnv1a64, pack, scan_folder};
use std::fs;
use std::io::Cursor;

#[test]
fn scan_sorts_banks_first_then_streams() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.wem"), vec![1u8; 100]).unwrap();
    fs::write(dir.path().join("a.wem"), vec![1u8; 100]).unwrap();
    fs::write(dir.path().join("c.bnk"), vec![7u8; 4096]).unwrap();

    let inputs = scan_folder(dir.path()).unwrap();
    let names: Vec<&str> = inputs.iter().map(|input| input.name.as_str()).collect();
    assert_eq!(names, ["c.bnk", "a.wem", "b.wem"]);
}

#[test]
fn scan_rejects_foreign_files_and_folders() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.wem"), [0u8; 4]).unwrap();
    fs::write(dir.path().join("readme.txt"), b"nope").unwrap();
    assert!(matches!(
        scan_folder(dir.path()),
        Err(CacheError::NotCacheable(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub.wem")).unwrap();
    assert!(matches!(
        scan_folder(dir.path()),
        Err(CacheError::NotCacheable(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(scan_folder(dir.path()), Err(CacheError::Empty)));
}

#[test]
fn packed_folder_matches_expected_image() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.wem"), vec![1u8; 100]).unwrap();
    fs::write(dir.path().join("b.wem"), vec![1u8; 100]).unwrap();
    fs::write(dir.path().join("c.bnk"), vec![7u8; 4096]).unwrap();

    let inputs = scan_folder(dir.path()).unwrap();
    let image = pack(&inputs).unwrap();
    let cache = Cache::read(&mut Cursor::new(&image)).unwrap();

    assert_eq!(cache.names, b"c.bnk\0a.wem\0b.wem\0");
    assert_eq!(cache.data.len(), 4196);
    assert_eq!(cache.names_offset, 0x30 + 4196);
    assert_eq!(cache.info_offset, cache.names_offset + cache.names.len() as u64);

    let mut hashed = cache.names.clone();
    hashed.extend_from_slice(&cache.info);
    assert_eq!(cache.checksum, fnv1a64(&hashed));

    let entries = cache.entries().unwrap();
    assert_eq!(entries[0].name, "c.bnk");
    assert_eq!(entries[1].data, vec![1u8; 100]);
    assert_eq!(entries[2].data, vec![1u8; 100]);
}
