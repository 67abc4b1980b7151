use crate::{Error, Result};
use std::path::Path;

/// Leading bytes of every valid PNG file
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Check whether a byte buffer starts with the PNG signature
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.len() >= PNG_SIGNATURE.len() && bytes[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Persist capture bytes to `path`, creating parent directories and
/// overwriting any previous artifact. The bytes must be a PNG image.
pub fn write_png(path: &Path, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::Artifact(format!(
            "refusing to write empty capture to {}",
            path.display()
        )));
    }
    if !is_png(bytes) {
        return Err(Error::Artifact(format!(
            "capture bytes for {} are not a PNG image",
            path.display()
        )));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, bytes)?;
    tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_fixture() -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"not a real image body");
        bytes
    }

    #[test]
    fn test_png_signature_is_recognized() {
        assert!(is_png(&png_fixture()));
        assert!(!is_png(b"JFIF"));
        assert!(!is_png(&[]));
        assert!(!is_png(&PNG_SIGNATURE[..4]));
    }

    #[test]
    fn test_write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/shot.png");

        write_png(&path, &png_fixture()).unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), png_fixture());
    }

    #[test]
    fn test_write_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");

        let mut first = png_fixture();
        first.extend_from_slice(b"first run padding");
        write_png(&path, &first).unwrap();
        write_png(&path, &png_fixture()).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), png_fixture());
    }

    #[test]
    fn test_non_png_bytes_are_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");

        let err = write_png(&path, b"definitely not a png").unwrap_err();

        assert!(err.to_string().contains("not a PNG"));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_capture_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");

        assert!(write_png(&path, &[]).is_err());
        assert!(!path.exists());
    }
}
