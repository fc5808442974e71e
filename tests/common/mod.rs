#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const I07_2021_FIXTURE: &str = "tests/fixtures/i07_excalibur_2021.nxs.json";
pub const I07_2022_FIXTURE: &str = "tests/fixtures/i07_excalibur_2022.nxs.json";
pub const I10_FIXTURE: &str = "tests/fixtures/i10_scan.nxs.json";

/// Creates an empty file, along with any missing parent directories.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, b"").expect("write file");
}

/// Copies a fixture into `dir` and returns the new path.
pub fn copy_fixture(fixture: &str, dir: &Path) -> PathBuf {
    let name = Path::new(fixture).file_name().expect("fixture file name");
    let dest = dir.join(name);
    fs::copy(fixture, &dest).expect("copy fixture");
    dest
}

/// A path as a string with forward slashes.
pub fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
