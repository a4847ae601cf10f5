//! Blocking HTTP client used by the test runner.
//!
//! Each call is a single attempt: there are no retries, and transport
//! problems surface as [`HarnessError`] variants so the runner can record
//! them as failed tests.

use std::error::Error as _;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};

use crate::harness::types::{
    HarnessConfig, HarnessError, HarnessResult, HttpMethod, HttpResponse, TestRequest,
};

const USER_AGENT: &str = concat!("anpr-api-harness/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper around a blocking reqwest client bound to one base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: HarnessConfig,
}

impl ApiClient {
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Timeout applied to a request: uploads get the longer budget
    pub fn timeout_for(&self, request: &TestRequest) -> Duration {
        if request.is_upload() {
            self.config.upload_timeout
        } else {
            self.config.request_timeout
        }
    }

    /// Send one request and read the whole body
    pub fn send(&self, request: &TestRequest) -> HarnessResult<HttpResponse> {
        let timeout = self.timeout_for(request);
        let url = self.config.request_url(&request.endpoint, &request.segments)?;

        tracing::debug!(
            method = %request.method,
            url = %url,
            uploads = request.uploads.len(),
            timeout_secs = timeout.as_secs(),
            "sending request"
        );

        let builder = self
            .client
            .request(to_reqwest_method(request.method), url)
            .timeout(timeout);
        let builder = build_body(builder, request)?;

        let response = builder.send().map_err(|e| map_error(e, timeout))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| map_error(e, timeout))?;

        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Attach either a multipart form or a JSON body.
///
/// With uploads present, top-level JSON object entries become text fields
/// of the form, mirroring how form posts combine data and files.
fn build_body(builder: RequestBuilder, request: &TestRequest) -> HarnessResult<RequestBuilder> {
    if request.uploads.is_empty() {
        return Ok(match &request.data {
            Some(data) => builder.json(data),
            None => builder,
        });
    }

    let mut form = Form::new();

    if let Some(serde_json::Value::Object(fields)) = &request.data {
        for (name, value) in fields {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            form = form.text(name.clone(), text);
        }
    }

    for upload in &request.uploads {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        form = form.part(upload.field.clone(), part);
    }

    Ok(builder.multipart(form))
}

/// Classify a reqwest error into the harness taxonomy
fn map_error(error: reqwest::Error, timeout: Duration) -> HarnessError {
    if error.is_timeout() {
        return HarnessError::Timeout(timeout);
    }

    if error.is_connect() {
        let message = error_chain(&error);
        let lower = message.to_lowercase();
        if lower.contains("dns") || lower.contains("resolve") {
            let host = error
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string();
            return HarnessError::Dns { host, message };
        }
        return HarnessError::Connection(message);
    }

    HarnessError::Http(error)
}

/// Flatten an error and its sources into one line
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::types::Upload;

    #[test]
    fn test_timeout_for_uploads() {
        let config = HarnessConfig::new("http://localhost:8001")
            .request_timeout(Duration::from_secs(30))
            .upload_timeout(Duration::from_secs(60));
        let client = ApiClient::new(config).unwrap();

        let plain = TestRequest::get("Root Endpoint", "api/", 200);
        let upload = TestRequest::post("Single Image Detection", "api/detect/image", 200)
            .upload(Upload::jpeg("file", "plate.jpg", vec![0xFF, 0xD8]));

        assert_eq!(client.timeout_for(&plain), Duration::from_secs(30));
        assert_eq!(client.timeout_for(&upload), Duration::from_secs(60));
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Post), Method::POST);
        assert_eq!(to_reqwest_method(HttpMethod::Delete), Method::DELETE);
    }

    #[test]
    fn test_connection_refused_maps_to_connection_error() {
        // Port 9 (discard) is essentially never listening on loopback.
        let config = HarnessConfig::new("http://127.0.0.1:9")
            .request_timeout(Duration::from_secs(5));
        let client = ApiClient::new(config).unwrap();

        let err = client
            .send(&TestRequest::get("Root Endpoint", "api/", 200))
            .unwrap_err();
        assert!(
            matches!(err, HarnessError::Connection(_) | HarnessError::Timeout(_)),
            "unexpected error: {err:?}"
        );
    }
}
