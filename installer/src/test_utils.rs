//! Shared fixture builders for installer tests.
//!
//! The helpers write pointer files, payloads, lock files, and ZIP archives
//! into a caller-owned scratch directory and panic on setup failure.
#![allow(
    clippy::expect_used,
    reason = "fixture builders abort the test when setup fails"
)]

use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// A representative Git LFS pointer file.
pub const POINTER_CONTENT: &str = concat!(
    "version https://git-lfs.github.com/spec/v1\n",
    "oid sha256:4d7a214614ab2935c943f9e0ff69d22eadbb8f32b1258daaa5e2ca24d17e2393\n",
    "size 12345\n",
);

/// Write a Git LFS pointer named `name` into `dir` and return its path.
pub fn write_pointer(dir: &Utf8Path, name: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, POINTER_CONTENT).expect("write pointer file");
    path
}

/// Write `size` bytes of non-pointer content named `name` into `dir`.
pub fn write_payload(dir: &Utf8Path, name: &str, size: usize) -> Utf8PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, payload(size)).expect("write payload file");
    path
}

/// Return `size` bytes of deterministic binary content.
#[must_use]
pub fn payload(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| u8::try_from(i % 251).unwrap_or(u8::MAX))
        .collect()
}

/// Return lock file JSON recording `version` for `package`.
#[must_use]
pub fn lock_file_json(package: &str, version: &str) -> String {
    serde_json::json!({
        "_readme": ["This file locks the dependencies of your project"],
        "packages": [
            { "name": "psr/log", "version": "3.0.2" },
            { "name": package, "version": version, "type": "library" }
        ],
        "packages-dev": []
    })
    .to_string()
}

/// Write a ZIP archive at `path` holding `entries` as (name, content) pairs.
///
/// Names ending in `/` are written as directories.
pub fn write_zip(path: &Utf8Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create archive");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).expect("add directory");
        } else {
            zip.start_file(*name, options).expect("start file");
            zip.write_all(content).expect("write entry");
        }
    }
    zip.finish().expect("finish archive");
}
