// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending operation identifiers.
//!
//! Format: `{wall_ms:013}-{suffix}` where suffix is the first 12 hex chars of
//! SHA-256 over the sub-millisecond clock, process id, thread id, a
//! per-process counter and a per-process random seed. The time prefix keeps
//! ids roughly sortable; the suffix keeps two processes enqueueing in the same
//! millisecond apart.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in the suffix (12 hex chars).
const SUFFIX_BYTES: usize = 6;

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn process_seed() -> u64 {
    static SEED: OnceLock<u64> = OnceLock::new();
    *SEED.get_or_init(|| {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u32(std::process::id());
        hasher.finish()
    })
}

/// Generate a collision-resistant operation ID for the given wall time.
pub fn generate_operation_id(wall_ms: u64) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(wall_ms.to_be_bytes());
    hasher.update(nanos.to_be_bytes());
    hasher.update(std::process::id().to_be_bytes());
    hasher.update(format!("{:?}", std::thread::current().id()).as_bytes());
    hasher.update(COUNTER.fetch_add(1, Ordering::Relaxed).to_be_bytes());
    hasher.update(process_seed().to_be_bytes());
    let digest = hasher.finalize();

    format!("{:013}-{}", wall_ms, hex::encode(&digest[..SUFFIX_BYTES]))
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
