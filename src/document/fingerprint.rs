use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::types::identifiers::ContentHash;

const BLOCK_SIZE: usize = 8192;

/// Hash a file's content without loading it whole.
///
/// Produces the same value as [`ContentHash::from_content`] over the file's
/// bytes, so streamed and in-memory fingerprints compare equal.
pub fn fingerprint(path: &Path) -> io::Result<ContentHash> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut block = [0u8; BLOCK_SIZE];

    loop {
        let n = match file.read(&mut block) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&block[..n]);
    }

    Ok(ContentHash::from_hasher(hasher))
}
