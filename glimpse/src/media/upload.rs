//! User-submitted media bytes.

use std::path::Path;

use crate::error::{Error, Result};

use super::MediaKind;

/// Raw media handed over by the presentation layer.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaUpload {
    kind: MediaKind,
    file_name: String,
    bytes: Vec<u8>,
}

impl MediaUpload {
    /// Create an upload, validating the file name's extension against `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMedia`] if the extension is not accepted.
    pub fn new(kind: MediaKind, file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let accepted = Path::new(&file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| kind.accepts(ext));

        if !accepted {
            return Err(Error::unsupported_media(format!(
                "{file_name} (accepted {kind} types: {})",
                kind.extensions().join(", ")
            )));
        }

        Ok(Self {
            kind,
            file_name,
            bytes,
        })
    }

    /// Create a video upload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMedia`] for non-video extensions.
    pub fn video(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        Self::new(MediaKind::Video, file_name, bytes)
    }

    /// Create an image upload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMedia`] for non-image extensions.
    pub fn image(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        Self::new(MediaKind::Image, file_name, bytes)
    }

    /// Read a file from disk, detecting its kind from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMedia`] for unknown extensions and
    /// [`Error::Io`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let kind = MediaKind::from_path(path)
            .ok_or_else(|| Error::unsupported_media(path.display().to_string()))?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let bytes = tokio::fs::read(path).await?;
        Self::new(kind, file_name, bytes)
    }

    /// Kind of the upload.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Temporary-file suffix preserving the original extension.
    #[must_use]
    pub fn suffix(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(
                || self.kind.default_suffix().to_owned(),
                |ext| format!(".{}", ext.to_ascii_lowercase()),
            )
    }
}

impl std::fmt::Debug for MediaUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaUpload")
            .field("kind", &self.kind)
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_extension() {
        let upload = MediaUpload::video("Holiday.MOV", vec![1, 2, 3]).unwrap();
        assert_eq!(upload.kind(), MediaKind::Video);
        assert_eq!(upload.suffix(), ".mov");
        assert_eq!(upload.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn rejects_wrong_kind() {
        let err = MediaUpload::image("clip.mp4", vec![]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMedia(ref m) if m.contains("clip.mp4")));
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(MediaUpload::image("photo", vec![]).is_err());
    }

    #[test]
    fn debug_omits_bytes() {
        let upload = MediaUpload::image("a.png", vec![0; 4096]).unwrap();
        let debug = format!("{upload:?}");
        assert!(debug.contains("len: 4096"));
    }

    #[tokio::test]
    async fn from_path_reads_and_detects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bike.jpeg");
        std::fs::write(&path, b"jpeg").unwrap();

        let upload = MediaUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.kind(), MediaKind::Image);
        assert_eq!(upload.file_name(), "bike.jpeg");
        assert_eq!(upload.bytes(), b"jpeg");
    }

    #[tokio::test]
    async fn from_path_rejects_unknown_extension() {
        let err = MediaUpload::from_path("/tmp/archive.zip").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedMedia(_)));
    }
}
