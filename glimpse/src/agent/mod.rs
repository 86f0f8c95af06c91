//! Reasoning capability and the tool-calling agent that provides it.
//!
//! The orchestrator only sees [`Reasoner`]: one prompt plus media references
//! in, one textual answer out. [`Agent`] implements it by driving a
//! [`ChatProvider`](crate::chat::ChatProvider) through a function-calling
//! loop with its [`ToolBox`](crate::tool::ToolBox).
//!
//! ```rust,ignore
//! use glimpse::prelude::*;
//!
//! let agent = Agent::new("Multimodal AI Analyzer")
//!     .provider(Arc::new(Gemini::from_env()?))
//!     .tool(WebSearchTool::new())
//!     .markdown(true);
//!
//! let response = agent.run("What is in this image?", &media).await?;
//! ```

mod config;
mod runner;

use async_trait::async_trait;

use crate::chat::Usage;
use crate::error::Result;
use crate::ingest::RemoteFile;
use crate::message::Part;

pub use config::Agent;

/// Media references handed to the reasoning step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaAttachments {
    /// Ready video files.
    pub videos: Vec<RemoteFile>,
    /// Uploaded image files.
    pub images: Vec<RemoteFile>,
}

impl MediaAttachments {
    /// Create attachments from videos and images.
    #[must_use]
    pub const fn new(videos: Vec<RemoteFile>, images: Vec<RemoteFile>) -> Self {
        Self { videos, images }
    }

    /// Whether no media is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty() && self.images.is_empty()
    }

    /// File reference parts, videos first.
    #[must_use]
    pub fn parts(&self) -> Vec<Part> {
        self.videos
            .iter()
            .chain(&self.images)
            .map(|f| Part::file(&f.mime_type, &f.uri))
            .collect()
    }
}

/// Answer produced by a [`Reasoner`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResponse {
    /// Final text content.
    pub content: String,
    /// Model turns taken.
    pub steps: usize,
    /// Accumulated token usage.
    pub usage: Usage,
}

impl RunResponse {
    /// Create a response with only content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// An opaque reasoning capability: prompt plus media in, text out.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Answer `prompt` with access to `media`.
    async fn run(&self, prompt: &str, media: &MediaAttachments) -> Result<RunResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::FileState;

    #[test]
    fn parts_put_videos_first() {
        let media = MediaAttachments::new(
            vec![RemoteFile::new("files/v", "uri://v", "video/mp4", FileState::Active)],
            vec![
                RemoteFile::new("files/a", "uri://a", "image/png", FileState::Active),
                RemoteFile::new("files/b", "uri://b", "image/jpeg", FileState::Active),
            ],
        );

        let uris: Vec<_> = media
            .parts()
            .into_iter()
            .filter_map(|p| match p {
                Part::File { uri, .. } => Some(uri),
                _ => None,
            })
            .collect();
        assert_eq!(uris, ["uri://v", "uri://a", "uri://b"]);
    }

    #[test]
    fn empty_attachments() {
        assert!(MediaAttachments::default().is_empty());
        assert!(MediaAttachments::default().parts().is_empty());
    }
}
