// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent response snapshots, one file per request key.
//!
//! Layout: `{root}/{namespace}/{sha256(request_key)}`. Each file is a JSON
//! metadata line followed by the raw body bytes. Writes go to a temp file and
//! are renamed into place, so a reader sees the old entry or the new one and
//! two writers to the same key resolve last-write-wins.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A cached response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Method plus canonical URL.
    pub request_key: String,
    /// HTTP status of the stored response.
    pub status: u16,
    /// Content type of the stored response.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryMeta {
    request_key: String,
    status: u16,
    content_type: Option<String>,
    stored_at: DateTime<Utc>,
}

/// Namespaced on-disk cache.
#[derive(Debug)]
pub struct CacheStore {
    root: PathBuf,
    namespace: String,
    dir: PathBuf,
    tmp_counter: AtomicU64,
}

impl CacheStore {
    /// Opens (creating if needed) the namespace directory under `root`.
    pub fn open(root: &Path, namespace: &str) -> Result<Self> {
        let dir = root.join(namespace);
        fs::create_dir_all(&dir)?;
        Ok(CacheStore {
            root: root.to_path_buf(),
            namespace: namespace.to_string(),
            dir,
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// The current namespace name.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Looks up the entry for a request key.
    pub fn get(&self, request_key: &str) -> Result<Option<CacheEntry>> {
        let bytes = match fs::read(self.entry_path(request_key)) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let Some(split) = bytes.iter().position(|b| *b == b'\n') else {
            tracing::warn!(request_key, "cache entry has no header, ignoring");
            return Ok(None);
        };
        let meta: EntryMeta = match serde_json::from_slice(&bytes[..split]) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(request_key, "unreadable cache entry header: {}", e);
                return Ok(None);
            }
        };
        if meta.request_key != request_key {
            return Ok(None);
        }

        Ok(Some(CacheEntry {
            request_key: meta.request_key,
            status: meta.status,
            content_type: meta.content_type,
            body: bytes[split + 1..].to_vec(),
            stored_at: meta.stored_at,
        }))
    }

    /// Stores an entry, replacing any previous entry for the same key.
    pub fn put(&self, entry: &CacheEntry) -> Result<()> {
        let meta = EntryMeta {
            request_key: entry.request_key.clone(),
            status: entry.status,
            content_type: entry.content_type.clone(),
            stored_at: entry.stored_at,
        };

        let path = self.entry_path(&entry.request_key);
        let tmp = self.dir.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            self.tmp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer(&mut file, &meta)?;
            file.write_all(b"\n")?;
            file.write_all(&entry.body)?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Removes every namespace directory under the root except the current one.
    ///
    /// Returns the names removed.
    pub fn delete_stale_namespaces(&self) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() {
                continue;
            }
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if name == self.namespace {
                continue;
            }
            fs::remove_dir_all(dir_entry.path())?;
            tracing::info!(namespace = %name, "deleted stale cache namespace");
            removed.push(name);
        }
        removed.sort();
        Ok(removed)
    }

    /// Number of entries in the current namespace.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for dir_entry in fs::read_dir(&self.dir)? {
            let name = dir_entry?.file_name();
            if !name.to_string_lossy().starts_with(".tmp-") {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns true when the current namespace holds no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn entry_path(&self, request_key: &str) -> PathBuf {
        let digest = Sha256::digest(request_key.as_bytes());
        self.dir.join(hex::encode(digest))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
