use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Number of hex characters kept from the digest
pub const FINGERPRINT_LEN: usize = 8;

const CHUNK_SIZE: usize = 8192;

/// Compute the content fingerprint of a file.
///
/// The file is streamed through SHA-1 in fixed-size chunks so large assets
/// are never held in memory at once.
pub fn fingerprint_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut hasher = Sha1::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let read = reader
            .read(&mut buf)
            .with_context(|| format!("Failed to read file for hashing: {}", path.display()))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(truncate(hex::encode(hasher.finalize())))
}

/// Fingerprint in-memory content
#[cfg(test)]
pub fn fingerprint_bytes(data: &[u8]) -> String {
    truncate(hex::encode(Sha1::digest(data)))
}

fn truncate(mut digest: String) -> String {
    digest.truncate(FINGERPRINT_LEN);
    digest
}
