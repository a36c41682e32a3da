use crate::error::ClientError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use inukadas_core::{AudioAttachment, FileAttachment};
use std::fs;
use std::path::Path;

/// MIME types by extension, for content `infer` cannot sniff
const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("html", "text/html"),
    ("webm", "audio/webm"),
    ("wav", "audio/wav"),
    ("m4a", "audio/mp4"),
];

const FALLBACK_TYPE: &str = "application/octet-stream";

/// Best guess at the MIME type of `bytes` read from `path`
pub fn detect_mime(path: &Path, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    extension
        .and_then(|ext| {
            EXTENSION_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| mime.to_string())
        })
        .unwrap_or_else(|| FALLBACK_TYPE.to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Size check that runs on file metadata, before any content is read
pub fn check_size(path: &Path, limit: u64) -> Result<u64, ClientError> {
    let size = fs::metadata(path)?.len();
    if size > limit {
        return Err(ClientError::FileTooLarge {
            name: display_name(path),
            size,
            limit,
        });
    }
    Ok(size)
}

/// Reads and base64-encodes a file attachment
pub fn load_file(path: &Path, limit: u64) -> Result<FileAttachment, ClientError> {
    let size = check_size(path, limit)?;
    let bytes = fs::read(path)?;

    Ok(FileAttachment {
        name: display_name(path),
        mime_type: detect_mime(path, &bytes),
        data: STANDARD.encode(&bytes),
        size,
    })
}

/// Reads and base64-encodes an audio recording
pub fn load_audio(path: &Path, limit: u64) -> Result<AudioAttachment, ClientError> {
    let size = check_size(path, limit)?;
    let bytes = fs::read(path)?;

    Ok(AudioAttachment {
        mime_type: Some(detect_mime(path, &bytes)),
        data: STANDARD.encode(&bytes),
        size: Some(size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_mime_from_magic_bytes() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(detect_mime(Path::new("board.bin"), &png), "image/png");
    }

    #[test]
    fn test_detect_mime_from_extension() {
        assert_eq!(detect_mime(Path::new("notes.MD"), b"# hello"), "text/markdown");
        assert_eq!(detect_mime(Path::new("blob"), b"???"), FALLBACK_TYPE);
    }

    #[test]
    fn test_load_file_encodes_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agenda.txt");
        fs::File::create(&path)
            .unwrap()
            .write_all(b"hello")
            .unwrap();

        let file = load_file(&path, 1024).unwrap();
        assert_eq!(file.name, "agenda.txt");
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.data, "aGVsbG8=");
        assert_eq!(file.size, 5);
    }

    #[test]
    fn test_limit_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exact.txt");
        fs::write(&path, b"12345").unwrap();

        assert!(load_file(&path, 5).is_ok());
        let err = load_file(&path, 4).unwrap_err();
        assert!(matches!(
            err,
            ClientError::FileTooLarge { ref name, size: 5, limit: 4 } if name == "exact.txt"
        ));
    }
}
