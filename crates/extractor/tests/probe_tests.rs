//! Integration tests for archive probing functionality.

mod common;

use common::{build_smf_with_count, write_smf, TestEntry, LZMA, STORE};
use smf_extractor::{probe, Compression, ExtractError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_probe_lists_entries() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("probe.smf");
    write_smf(
        &archive_path,
        LZMA,
        &[
            TestEntry::lzma("models/ship.obj", &b"v 0 0 0\n".repeat(20)),
            TestEntry::lzma("textures/hull.png", &[7u8; 64]),
        ],
    );

    let info = probe(&archive_path).unwrap();

    assert_eq!(info.compression, Some(Compression::Lzma));
    assert_eq!(info.flags, LZMA);
    assert_eq!(info.entries, 2);
    assert_eq!(info.declared_entries, 2);
    assert!(!info.truncated);
    assert_eq!(info.archive_bytes, fs::metadata(&archive_path).unwrap().len());
    assert_eq!(info.uncompressed_bytes, 160 + 64);
    assert_eq!(info.entry_list[0].path, "models/ship.obj");
    assert_eq!(info.entry_list[1].size, 64);
    assert!(info.entry_list[1].offset > info.entry_list[0].offset);
}

#[test]
fn test_probe_reports_truncation() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("truncated.smf");
    fs::write(
        &archive_path,
        build_smf_with_count(STORE, 3, &[TestEntry::stored("only.txt", b"x")]),
    )
    .unwrap();

    let info = probe(&archive_path).unwrap();
    assert_eq!(info.entries, 1);
    assert_eq!(info.declared_entries, 3);
    assert!(info.truncated);
}

#[test]
fn test_probe_corrupt_header() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("junk.smf");
    fs::write(&archive_path, b"short").unwrap();

    assert!(matches!(
        probe(&archive_path),
        Err(ExtractError::CorruptHeader(_))
    ));
}

#[test]
fn test_probe_missing_file() {
    let result = probe(std::path::Path::new("/nonexistent/archive.smf"));
    assert!(matches!(result, Err(ExtractError::NotFound(_))));
}

#[test]
fn test_probe_serializes_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("json.smf");
    write_smf(&archive_path, STORE, &[TestEntry::stored("a/b.txt", b"hi")]);

    let info = probe(&archive_path).unwrap();
    let json = serde_json::to_value(&info).unwrap();

    assert_eq!(json["compression"], "store");
    assert_eq!(json["entry_list"][0]["path"], "a/b.txt");
    assert_eq!(json["entry_list"][0]["size"], 2);
}
