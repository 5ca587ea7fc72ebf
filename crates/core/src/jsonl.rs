// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL (JSON Lines) file utilities.
//!
//! Provides durable append-only storage for JSON-serializable records.
//! Each record is stored as a single JSON line with fsync for durability.
//! Rewrites go through a temp file and a rename so a crash leaves either the
//! old or the new contents, never a truncated file.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Appends a record to a JSONL file with fsync for durability.
///
/// A torn final line left by a crash is terminated first, so the new record
/// always starts on a line of its own. Callers serialize appends.
pub fn append<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;

    let mut json = serde_json::to_vec(record)?;
    json.push(b'\n');
    if !ends_with_newline(&mut file)? {
        json.insert(0, b'\n');
    }
    file.write_all(&json)?;
    file.sync_all()?;

    Ok(())
}

/// True for an empty file or one whose last byte is a newline.
fn ends_with_newline(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Reads every non-blank line from a JSONL file as raw bytes, unparsed.
///
/// Lines are not required to be UTF-8. Returns an empty vec if the file
/// doesn't exist.
pub fn read_lines(path: &Path) -> Result<Vec<Vec<u8>>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    Ok(bytes
        .split(|b| *b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .map(<[u8]>::to_vec)
        .collect())
}

/// Reads all records from a JSONL file.
///
/// Malformed lines are skipped with a warning so one bad record cannot hide
/// the rest of the file.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut records = Vec::new();

    for (index, line) in read_lines(path)?.iter().enumerate() {
        match serde_json::from_slice(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    "skipping malformed record: {}",
                    e
                );
            }
        }
    }

    Ok(records)
}

/// Replaces the file with the given raw lines, written back byte for byte.
pub fn replace_lines(path: &Path, lines: &[Vec<u8>]) -> Result<()> {
    let tmp_path = tmp_path_for(path);
    {
        let mut file = File::create(&tmp_path)?;
        for line in lines {
            file.write_all(line)?;
            file.write_all(b"\n")?;
        }
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("jsonl"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
