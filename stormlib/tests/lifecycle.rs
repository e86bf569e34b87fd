//! Archive and file lifecycle tests against the in-memory backend

use proptest::prelude::*;
use std::io::{Read, Seek, SeekFrom};
use stormlib::{Archive, MemoryArchive, MemoryStorm, OpenOptions, StormApi};

fn single_file_storm(data: Vec<u8>) -> MemoryStorm {
    let storm = MemoryStorm::new();
    storm.insert(
        "d2exp.mpq",
        MemoryArchive::new()
            .file("data\\global\\excel\\weapons.txt", data)
            .with_listfile(),
    );
    storm
}

#[test]
fn test_open_close_leaves_no_handles() {
    let storm = single_file_storm(b"name\tcode\n".to_vec());
    for _ in 0..4 {
        let archive = Archive::open(&storm, "d2exp.mpq").unwrap();
        archive.close().unwrap();
    }
    assert_eq!(storm.open_handles(), 0);
}

#[test]
fn test_backend_through_trait_object() {
    let storm = single_file_storm(b"axe".to_vec());
    let api: &dyn StormApi = &storm;

    let archive = Archive::open(api, "d2exp.mpq").unwrap();
    let data = archive.read_file("data/global/excel/weapons.txt").unwrap();
    assert_eq!(data, b"axe");
    drop(archive);
    assert_eq!(storm.open_handles(), 0);
}

#[test]
fn test_local_file_scope_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("override.txt");
    std::fs::write(&local, b"from disk").unwrap();

    let storm = single_file_storm(Vec::new());
    let archive = OpenOptions::new()
        .search_scope(stormlib::SearchScope::LocalFile)
        .load_listfile(false)
        .open(&storm, "d2exp.mpq")
        .unwrap();
    let data = archive.read_file(local.to_str().unwrap()).unwrap();
    assert_eq!(data, b"from disk");
}

#[test]
fn test_local_file_scope_still_loads_listfile() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("override.txt");
    std::fs::write(&local, b"from disk").unwrap();

    let storm = single_file_storm(b"weapons".to_vec());
    let archive = OpenOptions::new()
        .search_scope(stormlib::SearchScope::LocalFile)
        .open(&storm, "d2exp.mpq")
        .unwrap();

    assert!(archive
        .paths()
        .any(|path| path == "data/global/excel/weapons.txt"));
    assert_eq!(archive.read_file(local.to_str().unwrap()).unwrap(), b"from disk");

    archive.close().unwrap();
    assert_eq!(storm.open_handles(), 0);
}

proptest! {
    #[test]
    fn prop_read_returns_stored_bytes(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let storm = single_file_storm(data.clone());
        let archive = Archive::open(&storm, "d2exp.mpq").unwrap();

        let mut file = archive.open_file("data/global/excel/weapons.txt").unwrap();
        prop_assert_eq!(file.size(), data.len() as u64);
        let mut read = Vec::new();
        file.read_to_end(&mut read).unwrap();
        file.close().unwrap();

        prop_assert_eq!(read, data);
    }

    #[test]
    fn prop_rewind_equals_fresh_open(
        data in proptest::collection::vec(any::<u8>(), 1..2048),
        skip in 0usize..2048,
    ) {
        let storm = single_file_storm(data.clone());
        let archive = Archive::open(&storm, "d2exp.mpq").unwrap();

        let mut file = archive.open_file("data/global/excel/weapons.txt").unwrap();
        let skip = skip.min(data.len());
        let mut head = vec![0u8; skip];
        file.read_exact(&mut head).unwrap();
        prop_assert_eq!(file.seek(SeekFrom::Start(0)).unwrap(), 0);

        let mut rewound = Vec::new();
        file.read_to_end(&mut rewound).unwrap();
        let fresh = archive.read_file("data/global/excel/weapons.txt").unwrap();
        prop_assert_eq!(rewound, fresh);
    }

    #[test]
    fn prop_seek_end_then_read_tail(
        data in proptest::collection::vec(any::<u8>(), 1..1024),
        back in 0i64..1024,
    ) {
        let storm = single_file_storm(data.clone());
        let archive = Archive::open(&storm, "d2exp.mpq").unwrap();
        let mut file = archive.open_file("data/global/excel/weapons.txt").unwrap();

        let back = back.min(data.len() as i64);
        let position = file.seek(SeekFrom::End(-back)).unwrap();
        prop_assert_eq!(position, (data.len() as i64 - back) as u64);

        let mut tail = Vec::new();
        file.read_to_end(&mut tail).unwrap();
        prop_assert_eq!(&tail[..], &data[data.len() - back as usize..]);
    }
}
