//! Request and result types for one analysis.

use std::fmt;

use crate::error::{Error, Result};
use crate::media::{MediaKind, MediaUpload};

/// One user-initiated analysis: a query plus the media it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    query: String,
    video: Option<MediaUpload>,
    images: Vec<MediaUpload>,
}

impl AnalysisRequest {
    /// Create a request with no media.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            video: None,
            images: Vec::new(),
        }
    }

    /// Attach an upload according to its kind.
    ///
    /// A video replaces any previously attached video; images are appended
    /// in submission order.
    #[must_use]
    pub fn with_upload(mut self, upload: MediaUpload) -> Self {
        match upload.kind() {
            MediaKind::Video => self.video = Some(upload),
            MediaKind::Image => self.images.push(upload),
        }
        self
    }

    /// The query as submitted.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the query carries any non-whitespace text.
    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// The attached video, if any.
    #[must_use]
    pub const fn video(&self) -> Option<&MediaUpload> {
        self.video.as_ref()
    }

    /// Attached images in submission order.
    #[must_use]
    pub fn images(&self) -> &[MediaUpload] {
        &self.images
    }

    /// All uploads in processing order: the video first, then images.
    pub fn uploads(&self) -> impl Iterator<Item = &MediaUpload> {
        self.video.iter().chain(&self.images)
    }

    /// Reject the request before any disk or network activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQuery`] if the query is empty or whitespace.
    pub fn validate(&self) -> Result<()> {
        if self.has_query() {
            Ok(())
        } else {
            Err(Error::EmptyQuery)
        }
    }
}

/// The answer to one successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Markdown-formatted answer text.
    pub content: String,
}

impl AnalysisResult {
    /// Wrap answer text.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn video(name: &str) -> MediaUpload {
        MediaUpload::video(name, vec![0]).unwrap()
    }

    fn image(name: &str) -> MediaUpload {
        MediaUpload::image(name, vec![0]).unwrap()
    }

    #[test]
    fn blank_queries_are_rejected() {
        assert!(matches!(AnalysisRequest::new("").validate(), Err(Error::EmptyQuery)));
        assert!(matches!(AnalysisRequest::new(" \n\t").validate(), Err(Error::EmptyQuery)));
        assert!(AnalysisRequest::new("What is this?").validate().is_ok());
    }

    #[test]
    fn uploads_put_the_video_first() {
        let request = AnalysisRequest::new("q")
            .with_upload(image("a.jpg"))
            .with_upload(video("clip.mp4"))
            .with_upload(image("b.png"));

        let names: Vec<_> = request.uploads().map(MediaUpload::file_name).collect();
        assert_eq!(names, ["clip.mp4", "a.jpg", "b.png"]);
    }

    #[test]
    fn second_video_replaces_the_first() {
        let request = AnalysisRequest::new("q")
            .with_upload(video("one.mp4"))
            .with_upload(video("two.mov"));

        assert_eq!(request.video().map(MediaUpload::file_name), Some("two.mov"));
        assert_eq!(request.uploads().count(), 1);
    }

    #[test]
    fn result_displays_content() {
        assert_eq!(AnalysisResult::new("A red bicycle.").to_string(), "A red bicycle.");
    }
}
