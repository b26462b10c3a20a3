use crate::fingerprint::FingerprintDigest;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

/// Maps fingerprint digests to the first image seen with that digest.
///
/// First-seen-wins: the canonical representative for a digest is whichever
/// path was inserted first, so results depend on insertion order. Callers
/// that need stable canonicals feed paths in sorted order.
#[derive(Debug, Default)]
pub struct ExactIndex {
    seen: HashMap<FingerprintDigest, PathBuf>,
}

impl ExactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` under `digest`. Returns the canonical path when the
    /// digest was already present for a *different* image; re-inserting
    /// the same path is a no-op.
    pub fn insert_or_match(&mut self, path: &Path, digest: FingerprintDigest) -> Option<&Path> {
        match self.seen.entry(digest) {
            Entry::Occupied(entry) => {
                let canonical = entry.into_mut();
                if canonical.as_path() == path {
                    None
                } else {
                    Some(canonical.as_path())
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(path.to_path_buf());
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
