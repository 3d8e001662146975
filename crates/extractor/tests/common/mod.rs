//! Helpers for building SMF archives in tests.

#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

pub const KEY: [u8; 4] = [0x13, 0x37, 0xc0, 0xde];

pub const DEFLATE: u8 = 0x00;
pub const LZMA: u8 = 0x10;
pub const STORE: u8 = 0x20;

/// One entry as it will be laid out in the payload region.
pub struct TestEntry {
    pub name: Vec<u8>,
    /// Payload bytes before XOR (already compressed if needed)
    pub stored: Vec<u8>,
    pub uncompressed_size: u32,
    /// Replaces the computed relative offset
    pub relative_offset: Option<u32>,
}

impl TestEntry {
    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            stored: data.to_vec(),
            uncompressed_size: data.len() as u32,
            relative_offset: None,
        }
    }

    pub fn deflate(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            stored: zlib(data),
            uncompressed_size: data.len() as u32,
            relative_offset: None,
        }
    }

    pub fn lzma(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            stored: lzma(data),
            uncompressed_size: data.len() as u32,
            relative_offset: None,
        }
    }
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Properties header followed by a raw LZMA stream, no size field.
pub fn lzma(data: &[u8]) -> Vec<u8> {
    let options = lzma_rs::compress::Options {
        unpacked_size: lzma_rs::compress::UnpackedSize::SkipWritingToHeader,
    };
    let mut out = Vec::new();
    lzma_rs::lzma_compress_with_options(&mut Cursor::new(data), &mut out, &options).unwrap();
    out
}

fn xor(data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ KEY[i % 4])
        .collect()
}

/// Assemble a complete archive.
pub fn build_smf(flags: u8, entries: &[TestEntry]) -> Vec<u8> {
    build_smf_with_count(flags, entries.len() as u32, entries)
}

/// Assemble an archive whose header declares `count` entries.
pub fn build_smf_with_count(flags: u8, count: u32, entries: &[TestEntry]) -> Vec<u8> {
    let mut blob = Vec::new();
    let mut payload = Vec::new();

    for entry in entries {
        let relative = entry.relative_offset.unwrap_or(payload.len() as u32);
        blob.extend_from_slice(&(entry.name.len() as u32).to_le_bytes());
        blob.extend_from_slice(&entry.name);
        blob.extend_from_slice(&relative.to_le_bytes());
        blob.extend_from_slice(&(entry.stored.len() as u32).to_le_bytes());
        blob.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
        blob.extend_from_slice(&0u32.to_le_bytes());
        blob.extend_from_slice(&[0, 0]);
        payload.extend(xor(&entry.stored));
    }

    let archive_name = b"test.smf";
    let mut out = vec![flags];
    out.extend_from_slice(&(archive_name.len() as u32).to_le_bytes());
    out.extend_from_slice(archive_name);
    out.extend_from_slice(&KEY);
    out.extend_from_slice(&count.to_le_bytes());
    let base = (out.len() + 4 + blob.len()) as u32;
    out.extend_from_slice(&base.to_le_bytes());
    out.extend(xor(&blob));
    out.extend(payload);
    out
}

pub fn write_smf(path: &Path, flags: u8, entries: &[TestEntry]) {
    fs::write(path, build_smf(flags, entries)).unwrap();
}

/// Every regular file under `root`, keyed by `/`-joined relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
        for item in fs::read_dir(dir).unwrap() {
            let path = item.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                out.insert(key, fs::read(&path).unwrap());
            }
        }
    }

    let mut out = BTreeMap::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out
}
