// Content hashing using BLAKE3, used to verify backup and restore copies

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

const HASH_CHUNK_SIZE: usize = 1_048_576; // 1MB

/// Compute the full BLAKE3 hash of a file.
/// Format: "blake3:<hex>"
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("blake3:{}", hasher.finalize().to_hex()))
}

/// True when both files have identical content.
pub fn files_match(a: &Path, b: &Path) -> Result<bool> {
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(compute_file_hash(a)? == compute_file_hash(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_hash_prefix() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Hello, World!").unwrap();

        let hash = compute_file_hash(file.path()).unwrap();
        assert!(hash.starts_with("blake3:"));
        assert_eq!(hash, format!("blake3:{}", blake3::hash(b"Hello, World!").to_hex()));
    }

    #[test]
    fn test_files_match() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();
        std::fs::write(&c, b"same bytez").unwrap();

        assert!(files_match(&a, &b).unwrap());
        assert!(!files_match(&a, &c).unwrap());
    }
}
