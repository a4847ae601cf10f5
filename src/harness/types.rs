use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

use crate::config;

/// Configuration for the harness execution
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Root URL of the backend (endpoints are joined below it)
    pub base_url: String,

    /// Timeout for requests without file parts
    pub request_timeout: Duration,

    /// Timeout for multipart uploads
    pub upload_timeout: Duration,

    /// Where to write the JSON summary (None disables writing)
    pub results_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            base_url: cfg.target.base_url.clone(),
            request_timeout: Duration::from_secs(cfg.timeouts.request),
            upload_timeout: Duration::from_secs(cfg.timeouts.upload),
            results_path: Some(PathBuf::from(&cfg.report.results_path)),
        }
    }
}

impl HarnessConfig {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: config::normalize_base_url(base_url.as_ref()),
            ..Default::default()
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn results_path(mut self, path: Option<PathBuf>) -> Self {
        self.results_path = path;
        self
    }

    /// Join an endpoint such as `api/status` onto the base URL
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Full URL for an endpoint plus trailing path segments.
    ///
    /// Each segment is percent-encoded as a single path component, so ids
    /// containing `/`, `?` or `#` cannot address a different resource.
    pub fn request_url(&self, endpoint: &str, segments: &[String]) -> HarnessResult<Url> {
        let raw = self.url_for(endpoint);
        let mut url = Url::parse(&raw).map_err(|e| HarnessError::InvalidUrl(format!("{e}: {raw}")))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| HarnessError::InvalidUrl(format!("cannot append path to {raw}")))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }
}

/// HTTP methods used by the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file part sent as multipart form data
#[derive(Debug, Clone)]
pub struct Upload {
    /// Form field name (e.g. `file`, `files`)
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// A JPEG part under the given form field
    pub fn jpeg(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

/// Expected structure of a JSON response body
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// No structural check
    #[default]
    Any,
    /// A JSON object containing all listed keys
    Object(Vec<String>),
    /// A JSON array
    Array,
}

impl ResponseShape {
    pub fn keys(keys: &[&str]) -> Self {
        ResponseShape::Object(keys.iter().map(|k| k.to_string()).collect())
    }

    /// Describe why `body` does not match, or None if it does
    pub fn violation(&self, body: &serde_json::Value) -> Option<String> {
        match self {
            ResponseShape::Any => None,
            ResponseShape::Array if body.is_array() => None,
            ResponseShape::Array => Some("Expected JSON array".to_string()),
            ResponseShape::Object(keys) => {
                let Some(map) = body.as_object() else {
                    return Some("Expected JSON object".to_string());
                };
                let missing: Vec<&str> = keys
                    .iter()
                    .filter(|k| !map.contains_key(k.as_str()))
                    .map(String::as_str)
                    .collect();
                if missing.is_empty() {
                    None
                } else {
                    Some(format!("Missing keys: {}", missing.join(", ")))
                }
            }
        }
    }
}

/// One `run_test` invocation
#[derive(Debug, Clone)]
pub struct TestRequest {
    pub name: String,
    pub method: HttpMethod,
    /// Path below the base URL, e.g. `api/detect/image`
    pub endpoint: String,
    /// Extra path components appended (encoded) after `endpoint`
    pub segments: Vec<String>,
    pub expected_status: u16,
    /// Optional JSON body
    pub data: Option<serde_json::Value>,
    /// Multipart file parts; a non-empty list switches to the upload timeout
    pub uploads: Vec<Upload>,
    pub shape: ResponseShape,
}

impl TestRequest {
    pub fn new(
        name: impl Into<String>,
        method: HttpMethod,
        endpoint: impl Into<String>,
        expected_status: u16,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            endpoint: endpoint.into(),
            segments: Vec::new(),
            expected_status,
            data: None,
            uploads: Vec::new(),
            shape: ResponseShape::Any,
        }
    }

    pub fn get(name: impl Into<String>, endpoint: impl Into<String>, expected_status: u16) -> Self {
        Self::new(name, HttpMethod::Get, endpoint, expected_status)
    }

    pub fn post(name: impl Into<String>, endpoint: impl Into<String>, expected_status: u16) -> Self {
        Self::new(name, HttpMethod::Post, endpoint, expected_status)
    }

    /// Append one path component, e.g. a detection id
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn upload(mut self, upload: Upload) -> Self {
        self.uploads.push(upload);
        self
    }

    pub fn shape(mut self, shape: ResponseShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn is_upload(&self) -> bool {
        !self.uploads.is_empty()
    }

    /// Success responses must carry a JSON body
    pub fn expects_json(&self) -> bool {
        (200..300).contains(&self.expected_status)
    }
}

/// Raw response as seen by the harness
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Error types for harness operations
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Request exceeded its timeout
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Endpoint could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Could not establish a connection
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Host name could not be resolved
    #[error("DNS resolution failed for {host}: {message}")]
    Dns { host: String, message: String },

    /// Body was expected to be JSON but was not
    #[error("Invalid JSON response: {0}")]
    Decode(String),

    /// Any other HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fixture image could not be encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
