//! Document import and artifact writing
//!
//! Provides:
//! - Markdown import with UTF-8 / UTF-16 BOM detection and a size limit
//! - Atomic writes so an export or session file is never left half-written

use crate::config::MAX_IMPORT_SIZE;
use crate::error::{FileError, FileResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Detected encoding of an imported file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    /// UTF-8 without BOM
    #[default]
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 Little Endian with BOM
    Utf16Le,
    /// UTF-16 Big Endian with BOM
    Utf16Be,
    /// Not valid UTF-8 (lossy conversion used)
    Unknown,
}

/// An imported markdown source
#[derive(Debug, Clone)]
pub struct ImportedDocument {
    pub path: PathBuf,
    /// Decoded text with any BOM stripped
    pub content: String,
    pub encoding: FileEncoding,
    pub size_bytes: u64,
    /// Whether invalid sequences were replaced
    pub lossy: bool,
}

/// Detect file encoding from raw bytes
fn detect_encoding(bytes: &[u8]) -> FileEncoding {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => FileEncoding::Utf8Bom,
        [0xFF, 0xFE, ..] => FileEncoding::Utf16Le,
        [0xFE, 0xFF, ..] => FileEncoding::Utf16Be,
        _ if std::str::from_utf8(bytes).is_ok() => FileEncoding::Utf8,
        _ => FileEncoding::Unknown,
    }
}

/// Decode bytes to string based on detected encoding
fn decode_content(bytes: &[u8], encoding: FileEncoding) -> (String, bool) {
    match encoding {
        FileEncoding::Utf8 | FileEncoding::Unknown => decode_utf8(bytes),
        FileEncoding::Utf8Bom => decode_utf8(&bytes[3..]),
        FileEncoding::Utf16Le => decode_utf16(&bytes[2..], u16::from_le_bytes),
        FileEncoding::Utf16Be => decode_utf16(&bytes[2..], u16::from_be_bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), false),
        Err(_) => (String::from_utf8_lossy(bytes).into_owned(), true),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> (String, bool) {
    let mut lossy = bytes.len() % 2 != 0;
    let units = bytes.chunks_exact(2).map(|chunk| unit([chunk[0], chunk[1]]));

    let text: String = char::decode_utf16(units)
        .map(|r| {
            r.unwrap_or_else(|_| {
                lossy = true;
                char::REPLACEMENT_CHARACTER
            })
        })
        .collect();

    (text, lossy)
}

/// Import a markdown file
pub fn import_markdown(path: impl AsRef<Path>) -> FileResult<ImportedDocument> {
    import_markdown_with_limit(path, MAX_IMPORT_SIZE)
}

/// Import a markdown file, refusing anything larger than `max_size` bytes
pub fn import_markdown_with_limit(
    path: impl AsRef<Path>,
    max_size: u64,
) -> FileResult<ImportedDocument> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    if !path.exists() {
        return Err(FileError::NotFound(path_buf));
    }

    let metadata = std::fs::metadata(path).map_err(|e| FileError::ReadError {
        path: path_buf.clone(),
        source: e,
    })?;

    let size_bytes = metadata.len();
    if size_bytes > max_size {
        return Err(FileError::FileTooLarge {
            path: path_buf,
            size: size_bytes,
            max_size,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| FileError::ReadError {
        path: path_buf.clone(),
        source: e,
    })?;

    let encoding = detect_encoding(&bytes);
    let (content, lossy) = decode_content(&bytes, encoding);
    if lossy {
        log::warn!("{} is not clean text; invalid bytes were replaced", path.display());
    }

    Ok(ImportedDocument {
        path: path_buf,
        content,
        encoding,
        size_bytes,
        lossy,
    })
}

/// Write content to a file using atomic write
///
/// The file is either fully written or left unchanged.
pub fn write_file_atomic_sync(path: impl AsRef<Path>, content: &str) -> FileResult<()> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let temp_path = parent.join(format!(".{}.{}.tmp", filename, timestamp));

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    Ok(())
}

/// Ensure parent directory exists
pub fn ensure_parent_dir(path: impl AsRef<Path>) -> FileResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| FileError::DirectoryError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_encoding() {
        assert_eq!(detect_encoding(b"# Title"), FileEncoding::Utf8);
        assert_eq!(detect_encoding(&[0xEF, 0xBB, 0xBF, b'#']), FileEncoding::Utf8Bom);
        assert_eq!(detect_encoding(&[0xFF, 0xFE, b'#', 0]), FileEncoding::Utf16Le);
        assert_eq!(detect_encoding(&[0xFE, 0xFF, 0, b'#']), FileEncoding::Utf16Be);
        assert_eq!(detect_encoding(&[0xC3, 0x28]), FileEncoding::Unknown);
    }

    #[test]
    fn test_import_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, [0xEF, 0xBB, 0xBF, b'#', b' ', b'A']).unwrap();

        let doc = import_markdown(&path).unwrap();
        assert_eq!(doc.content, "# A");
        assert_eq!(doc.encoding, FileEncoding::Utf8Bom);
        assert!(!doc.lossy);
    }

    #[test]
    fn test_import_utf16_le() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.md");
        std::fs::write(&path, [0xFF, 0xFE, b'#', 0, b' ', 0, b'B', 0]).unwrap();

        assert_eq!(import_markdown(&path).unwrap().content, "# B");
    }

    #[test]
    fn test_import_rejects_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.md");
        std::fs::write(&path, "0123456789").unwrap();

        let err = import_markdown_with_limit(&path, 4).unwrap_err();
        assert!(matches!(err, FileError::FileTooLarge { size: 10, max_size: 4, .. }));
    }

    #[test]
    fn test_import_missing_file() {
        let err = import_markdown("/definitely/not/here.md").unwrap_err();
        assert!(matches!(err, FileError::NotFound(_)));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        write_file_atomic_sync(&path, "first").unwrap();
        write_file_atomic_sync(&path, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_ensure_parent_dir_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("export.html");

        ensure_parent_dir(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
        ensure_parent_dir(&path).unwrap();
        ensure_parent_dir("bare.html").unwrap();
    }
}
