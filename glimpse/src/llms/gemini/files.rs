//! Gemini Files API: resumable upload and status lookup.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::ingest::{MediaIngestion, RemoteFile, RemoteHandle};
use crate::llms::LlmError;

use super::client::Gemini;
use super::types::{GeminiFile, UploadFileMetadata, UploadFileResponse, UploadStartRequest};

impl Gemini {
    /// Convert a Files API resource into the crate's remote file record.
    pub(crate) fn convert_file(file: GeminiFile) -> RemoteFile {
        let remote = RemoteFile::new(file.name, file.uri, file.mime_type, file.state);
        match file.error {
            Some(status) if !status.message.is_empty() => remote.with_error(status.message),
            _ => remote,
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        expected: &str,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let text = response.text().await.map_err(LlmError::from)?;
        serde_json::from_str(&text).map_err(|e| {
            LlmError::response_format(expected, format!("parse error: {e}, response: {text}")).into()
        })
    }

    /// Start a resumable upload session and return its upload URL.
    async fn start_upload(&self, display_name: &str, mime_type: &str, len: usize) -> Result<String> {
        let body = UploadStartRequest {
            file: UploadFileMetadata {
                display_name: display_name.to_owned(),
            },
        };

        let response = self
            .authorize(self.client.post(self.upload_url()))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", len.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| LlmError::response_format("x-goog-upload-url header", "missing header").into())
    }
}

#[async_trait]
impl MediaIngestion for Gemini {
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<RemoteFile> {
        self.require_api_key()?;

        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());

        let session_url = self.start_upload(&display_name, mime_type, bytes.len()).await?;
        debug!(%display_name, mime_type, bytes = bytes.len(), "uploading media");

        let response = self
            .authorize(self.client.post(&session_url))
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(LlmError::from)?;

        let uploaded: UploadFileResponse = Self::read_json(response, "Gemini file upload response").await?;
        Ok(Self::convert_file(uploaded.file))
    }

    async fn status(&self, handle: &RemoteHandle) -> Result<RemoteFile> {
        self.require_api_key()?;

        let response = self
            .authorize(self.client.get(self.file_url(handle.as_str())))
            .send()
            .await
            .map_err(LlmError::from)?;

        let file: GeminiFile = Self::read_json(response, "Gemini file resource").await?;
        Ok(Self::convert_file(file))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Error;
    use crate::ingest::FileState;
    use crate::llms::GeminiConfig;

    #[test]
    fn converts_processing_file() {
        let file: GeminiFile = serde_json::from_value(json!({
            "name": "files/abc123",
            "displayName": "clip.mp4",
            "mimeType": "video/mp4",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123",
            "state": "PROCESSING"
        }))
        .unwrap();

        let remote = Gemini::convert_file(file);
        assert_eq!(remote.handle.as_str(), "files/abc123");
        assert_eq!(remote.state, FileState::Processing);
        assert_eq!(remote.mime_type, "video/mp4");
        assert!(remote.error.is_none());
    }

    #[test]
    fn converts_failed_file_with_reason() {
        let file: GeminiFile = serde_json::from_value(json!({
            "name": "files/bad",
            "state": "FAILED",
            "error": {"code": 3, "message": "unsupported codec"}
        }))
        .unwrap();

        let remote = Gemini::convert_file(file);
        assert_eq!(remote.state, FileState::Failed);
        assert_eq!(remote.error.as_deref(), Some("unsupported codec"));
    }

    #[test]
    fn missing_state_is_unspecified() {
        let file: GeminiFile = serde_json::from_value(json!({"name": "files/x"})).unwrap();
        assert_eq!(Gemini::convert_file(file).state, FileState::StateUnspecified);
    }

    #[tokio::test]
    async fn status_without_key_fails_with_auth() {
        let gemini = Gemini::new(GeminiConfig::default().with_base_url("http://127.0.0.1:9")).unwrap();
        let err = gemini.status(&RemoteHandle::new("files/x")).await.unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::Auth { .. })));
    }
}
