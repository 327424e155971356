//! Content digests (blake3, hex-encoded).

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Incremental digest over a sequence of named files.
///
/// Names are hashed alongside contents so renames change the digest.
pub struct Digest {
    hasher: blake3::Hasher,
}

impl Default for Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    /// Feed a name and the bytes of the file at `path`.
    pub fn update_file(&mut self, name: &str, path: &Path) -> io::Result<()> {
        self.hasher.update(name.as_bytes());
        self.hasher.update(&[0]);

        let mut file = File::open(path)?;
        let mut buffer = [0u8; 64 * 1024];
        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    self.hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// First `len` hex characters of the digest.
    pub fn finish_hex(&self, len: usize) -> String {
        let mut hex = hex::encode(self.hasher.finalize().as_bytes());
        hex.truncate(len);
        hex
    }
}
