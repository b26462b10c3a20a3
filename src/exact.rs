use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// SHA-256 over the raw bytes of a file, hex-encoded. Byte-identical
/// files and nothing else share a content hash.
pub fn content_hash(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Group byte-identical files by content hash, hashed in parallel.
///
/// Only groups with more than one member are returned, ordered by first
/// appearance in `paths`, members in input order. Unreadable files are
/// logged and skipped.
pub fn identical_groups(paths: &[PathBuf]) -> Vec<Vec<PathBuf>> {
    let hashed: Vec<(PathBuf, io::Result<String>)> = paths
        .par_iter()
        .map(|path| (path.clone(), content_hash(path)))
        .collect();

    let mut groups: Vec<Vec<PathBuf>> = Vec::new();
    let mut slot_by_digest: HashMap<String, usize> = HashMap::new();
    for (path, outcome) in hashed {
        match outcome {
            Ok(digest) => {
                let slot = *slot_by_digest.entry(digest).or_insert_with(|| {
                    groups.push(Vec::new());
                    groups.len() - 1
                });
                groups[slot].push(path);
            }
            Err(err) => log::warn!("skipping {}: {}", path.display(), err),
        }
    }
    groups.into_iter().filter(|group| group.len() > 1).collect()
}
