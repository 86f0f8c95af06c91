//! Media kinds, readiness states and the per-asset record.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ingest::{RemoteFile, RemoteHandle};

/// Kind of submitted media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A video; must finish remote processing before use.
    Video,
    /// A still image; usable as soon as the upload returns.
    Image,
}

impl MediaKind {
    /// Accepted video file extensions.
    pub const VIDEO_EXTENSIONS: &'static [&'static str] = &["mp4", "mov", "avi"];
    /// Accepted image file extensions.
    pub const IMAGE_EXTENSIONS: &'static [&'static str] = &["jpg", "jpeg", "png"];

    /// Get the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }

    /// Extensions accepted for this kind.
    #[must_use]
    pub const fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Video => Self::VIDEO_EXTENSIONS,
            Self::Image => Self::IMAGE_EXTENSIONS,
        }
    }

    /// Whether `ext` (without the dot, any case) is accepted for this kind.
    #[must_use]
    pub fn accepts(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.extensions().contains(&ext.as_str())
    }

    /// Detect the kind from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        [Self::Video, Self::Image].into_iter().find(|k| k.accepts(ext))
    }

    /// Detect the kind from a path's extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether assets of this kind must be polled until ready.
    #[must_use]
    pub const fn requires_processing(&self) -> bool {
        matches!(self, Self::Video)
    }

    /// Suffix used for temporary files when the upload carries no usable extension.
    #[must_use]
    pub const fn default_suffix(&self) -> &'static str {
        match self {
            Self::Video => ".mp4",
            Self::Image => ".jpg",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Readiness of one asset.
///
/// ```text
/// Uploading -> Processing -> Ready
///     \            \
///      `-> Failed   `-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    /// Staged locally, upload not yet acknowledged.
    #[default]
    Uploading,
    /// Uploaded; the remote service is still preparing it.
    Processing,
    /// Usable by the reasoning step.
    Ready,
    /// The upload or remote processing failed.
    Failed,
}

impl ReadinessState {
    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// Whether moving to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Uploading, Self::Processing | Self::Failed)
                | (Self::Processing, Self::Ready | Self::Failed)
        )
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One user-submitted file owned by an in-flight request.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    kind: MediaKind,
    local_path: PathBuf,
    mime_type: String,
    remote: Option<RemoteFile>,
    state: ReadinessState,
}

impl MediaAsset {
    /// Create an asset for a staged local file.
    ///
    /// The MIME type is guessed from the path, falling back to a generic
    /// type for the kind.
    #[must_use]
    pub fn new(kind: MediaKind, local_path: impl Into<PathBuf>) -> Self {
        let local_path = local_path.into();
        let fallback = match kind {
            MediaKind::Video => "video/mp4",
            MediaKind::Image => "image/jpeg",
        };
        let mime_type = mime_guess::from_path(&local_path)
            .first()
            .filter(|m| m.type_().as_str() == kind.as_str())
            .map_or_else(|| fallback.to_owned(), |m| m.essence_str().to_owned());

        Self {
            kind,
            local_path,
            mime_type,
            remote: None,
            state: ReadinessState::Uploading,
        }
    }

    /// Kind of the asset.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Path of the local temporary copy.
    #[must_use]
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// MIME type sent to the remote service.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Current readiness.
    #[must_use]
    pub const fn state(&self) -> ReadinessState {
        self.state
    }

    /// Latest remote view of the file, once uploaded.
    #[must_use]
    pub const fn remote(&self) -> Option<&RemoteFile> {
        self.remote.as_ref()
    }

    /// Remote handle, once uploaded.
    #[must_use]
    pub fn remote_handle(&self) -> Option<&RemoteHandle> {
        self.remote.as_ref().map(|r| &r.handle)
    }

    /// Record an acknowledged upload: `Uploading -> Processing`.
    pub fn record_upload(&mut self, remote: RemoteFile) {
        if self.transition(ReadinessState::Processing) {
            self.remote = Some(remote);
        }
    }

    /// Record that the asset became usable: `Processing -> Ready`.
    pub fn record_ready(&mut self, remote: RemoteFile) {
        if self.transition(ReadinessState::Ready) {
            self.remote = Some(remote);
        }
    }

    /// Record a failure from any non-terminal state.
    pub fn record_failure(&mut self) {
        let _ = self.transition(ReadinessState::Failed);
    }

    fn transition(&mut self, next: ReadinessState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            tracing::warn!(
                path = %self.local_path.display(),
                from = %self.state,
                to = %next,
                "ignoring illegal media state transition"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::FileState;

    fn remote(state: FileState) -> RemoteFile {
        RemoteFile::new("files/abc", "https://example.test/files/abc", "video/mp4", state)
    }

    mod media_kind {
        use super::*;

        #[test]
        fn accepts_case_insensitively() {
            assert!(MediaKind::Video.accepts("MP4"));
            assert!(MediaKind::Video.accepts("mov"));
            assert!(MediaKind::Image.accepts("JPEG"));
            assert!(!MediaKind::Image.accepts("gif"));
            assert!(!MediaKind::Video.accepts("png"));
        }

        #[test]
        fn from_path_detects_kind() {
            assert_eq!(MediaKind::from_path("clip.avi"), Some(MediaKind::Video));
            assert_eq!(MediaKind::from_path("/tmp/photo.PNG"), Some(MediaKind::Image));
            assert_eq!(MediaKind::from_path("notes.txt"), None);
            assert_eq!(MediaKind::from_path("no_extension"), None);
        }

        #[test]
        fn only_video_requires_processing() {
            assert!(MediaKind::Video.requires_processing());
            assert!(!MediaKind::Image.requires_processing());
        }
    }

    mod readiness_state {
        use super::*;

        #[test]
        fn legal_transitions() {
            let (up, proc, ready, failed) = (
                ReadinessState::Uploading,
                ReadinessState::Processing,
                ReadinessState::Ready,
                ReadinessState::Failed,
            );
            assert!(up.can_transition_to(proc));
            assert!(up.can_transition_to(failed));
            assert!(proc.can_transition_to(ready));
            assert!(proc.can_transition_to(failed));
            assert!(!up.can_transition_to(ready));
            assert!(!ready.can_transition_to(failed));
            assert!(!failed.can_transition_to(proc));
        }

        #[test]
        fn terminal_states() {
            assert!(ReadinessState::Ready.is_terminal());
            assert!(ReadinessState::Failed.is_terminal());
            assert!(!ReadinessState::Processing.is_terminal());
        }
    }

    mod media_asset {
        use super::*;

        #[test]
        fn guesses_mime_type() {
            assert_eq!(MediaAsset::new(MediaKind::Video, "/tmp/a.mov").mime_type(), "video/quicktime");
            assert_eq!(MediaAsset::new(MediaKind::Image, "/tmp/a.png").mime_type(), "image/png");
            assert_eq!(MediaAsset::new(MediaKind::Image, "/tmp/a.bin").mime_type(), "image/jpeg");
        }

        #[test]
        fn walks_the_happy_path() {
            let mut asset = MediaAsset::new(MediaKind::Video, "/tmp/a.mp4");
            assert_eq!(asset.state(), ReadinessState::Uploading);
            assert!(asset.remote_handle().is_none());

            asset.record_upload(remote(FileState::Processing));
            assert_eq!(asset.state(), ReadinessState::Processing);
            assert_eq!(asset.remote_handle().map(RemoteHandle::as_str), Some("files/abc"));

            asset.record_ready(remote(FileState::Active));
            assert_eq!(asset.state(), ReadinessState::Ready);
            assert_eq!(asset.remote().map(|r| r.state), Some(FileState::Active));
        }

        #[test]
        fn failure_is_absorbing() {
            let mut asset = MediaAsset::new(MediaKind::Video, "/tmp/a.mp4");
            asset.record_upload(remote(FileState::Processing));
            asset.record_failure();
            asset.record_ready(remote(FileState::Active));
            assert_eq!(asset.state(), ReadinessState::Failed);
        }
    }
}
