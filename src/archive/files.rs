//! Hashing and file helpers for the on-disk archive.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Maximum file name length in bytes.
const MAX_FILENAME_BYTES: usize = 255;

/// Lowercase hex SHA-256 of UTF-8 text.
pub fn sha256_hex(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// Lowercase hex SHA-256 of a file's bytes, read in 4 KiB blocks.
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Write text to a file, creating parent directories.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    debug!("File written to {}", path.display());
    Ok(())
}

/// Read a UTF-8 text file.
pub fn read_text(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Delete a file. Returns false if there was nothing to delete.
pub fn delete_file(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("File deleted: {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("File not found for deletion: {}", path.display());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Make a string safe to use as a file name.
///
/// Anything other than alphanumerics and `-_.` becomes `_`; leading and trailing
/// dots are removed and the result is capped at 255 bytes.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut sanitized = replaced.trim_matches('.').to_string();
    truncate_bytes(&mut sanitized, MAX_FILENAME_BYTES);
    sanitized
}

/// Cut `s` to at most `max` bytes on a char boundary.
fn truncate_bytes(s: &mut String, max: usize) {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
}

/// `{dir}/{video_id}_{sanitized title}.md`, the whole name within 255 bytes.
pub fn episode_file_path(dir: &Path, video_id: &str, title: &str) -> PathBuf {
    const EXTENSION: &str = ".md";
    let mut stem = sanitize_filename(&format!("{}_{}", video_id, title));
    truncate_bytes(&mut stem, MAX_FILENAME_BYTES - EXTENSION.len());
    dir.join(format!("{}{}", stem, EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_is_stable_and_hex() {
        let first = sha256_hex("test content");
        assert_eq!(first, sha256_hex("test content"));
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(first, sha256_hex("content2"));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_file_digest_matches_text_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("t.md");
        let text = "Ünïcode transcript\nline two".repeat(500);

        write_text(&path, &text).unwrap();
        assert_eq!(file_sha256(&path).unwrap(), sha256_hex(&text));
        assert_eq!(read_text(&path).unwrap(), text);
    }

    #[test]
    fn test_delete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        write_text(&path, "test").unwrap();

        assert!(delete_file(&path).unwrap());
        assert!(!path.exists());
        assert!(!delete_file(&path).unwrap());
    }

    #[test]
    fn test_sanitize_filename() {
        let sanitized = sanitize_filename("my/file:name*.txt");
        assert_eq!(sanitized, "my_file_name_.txt");
        assert_eq!(sanitize_filename("..hidden.."), "hidden");
        assert!(sanitize_filename(&"é".repeat(300)).len() <= 255);
    }

    #[test]
    fn test_episode_file_path() {
        let path = episode_file_path(Path::new("/data"), "abc123", "Ep 1: Intro?");
        assert_eq!(path, PathBuf::from("/data/abc123_Ep_1__Intro_.md"));
    }

    #[test]
    fn test_long_multibyte_title_fits_name_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = episode_file_path(dir.path(), "dQw4w9WgXcQ", &"日".repeat(100));

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.len() <= MAX_FILENAME_BYTES, "{} bytes", name.len());
        assert!(name.ends_with(".md"));
        assert!(name.starts_with("dQw4w9WgXcQ_日"));

        write_text(&path, "transcript").unwrap();
        assert_eq!(read_text(&path).unwrap(), "transcript");
    }
}
