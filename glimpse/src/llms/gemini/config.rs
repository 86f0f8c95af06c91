//! Gemini client configuration.

/// Configuration for the Gemini client.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key for authentication. May be empty; calls then fail with an auth error.
    pub api_key: String,
    /// Service root, without the API version.
    pub base_url: String,
    /// API version path segment.
    pub api_version: String,
    /// Default model to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl GeminiConfig {
    /// Default Gemini API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    /// Default API version.
    pub const DEFAULT_API_VERSION: &'static str = "v1beta";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash-exp";
    /// Environment variable holding the API key.
    pub const API_KEY_ENV: &'static str = "GOOGLE_API_KEY";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `GOOGLE_API_KEY` - API key; a missing key is tolerated here
    /// - `GEMINI_BASE_URL` - Optional base URL
    /// - `GEMINI_MODEL` - Optional default model
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var(Self::API_KEY_ENV).unwrap_or_default();
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_owned());

        Self {
            api_key,
            base_url,
            model,
            ..Self::default()
        }
    }

    /// Whether an API key is present.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            api_version: Self::DEFAULT_API_VERSION.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout_secs: Some(120),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<unset>" })
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
