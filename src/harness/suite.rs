//! The fixed scenario battery run against an ANPR backend.

use chrono::Utc;
use serde_json::{Value, json};

use crate::fixtures;
use crate::harness::client::ApiClient;
use crate::harness::types::{
    HarnessConfig, HarnessError, HarnessResult, HttpResponse, ResponseShape, TestRequest, Upload,
};
use crate::report;
use crate::runner::{TestResult, TestSummary};

/// Plate text drawn on the single-image fixture
pub const FIXTURE_PLATE_TEXT: &str = "ABC123";

/// Id that no backend should know about
pub const UNKNOWN_DETECTION_ID: &str = "nonexistent-detection-id";

/// File name that no backend should be serving
pub const MISSING_FILE_NAME: &str = "nonexistent_file.jpg";

const BODY_EXCERPT_CHARS: usize = 200;

/// Sequential runner owning the result log and counters
#[derive(Debug)]
pub struct TestRunner {
    client: ApiClient,
    tests_run: usize,
    tests_passed: usize,
    results: Vec<TestResult>,
    /// Detection id returned by the single-image upload, if any
    detection_id: Option<String>,
}

impl TestRunner {
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            tests_run: 0,
            tests_passed: 0,
            results: Vec::new(),
            detection_id: None,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        self.client.config()
    }

    pub fn tests_run(&self) -> usize {
        self.tests_run
    }

    pub fn tests_passed(&self) -> usize {
        self.tests_passed
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Record one result and bump the counters
    pub fn log_test(&mut self, name: &str, success: bool, details: impl Into<String>) {
        let details = details.into();
        self.tests_run += 1;
        if success {
            self.tests_passed += 1;
            tracing::info!(test = name, %details, "passed");
        } else {
            tracing::warn!(test = name, %details, "failed");
        }
        self.results.push(TestResult::new(name, success, details));
    }

    /// Issue one request and record exactly one result for it.
    ///
    /// Returns the pass flag and the parsed body, or an empty object when
    /// there is no usable JSON.
    pub fn run_test(&mut self, request: TestRequest) -> (bool, Value) {
        tracing::info!(
            test = %request.name,
            method = %request.method,
            endpoint = %request.endpoint,
            "running"
        );

        let (success, details, body) = match self.client.send(&request) {
            Ok(response) => evaluate(&request, &response),
            Err(err) => (false, err.to_string(), empty_object()),
        };

        self.log_test(&request.name, success, details);
        (success, body)
    }

    pub fn test_root_endpoint(&mut self) -> bool {
        let (success, _) = self.run_test(
            TestRequest::get("Root Endpoint", "api/", 200).shape(ResponseShape::keys(&["message"])),
        );
        success
    }

    pub fn test_status_endpoints(&mut self) -> bool {
        let client_name = format!("anpr_test_client_{}", Utc::now().format("%Y%m%d_%H%M%S"));
        let (created, _) = self.run_test(
            TestRequest::post("Create Status Check", "api/status", 200)
                .json(json!({ "client_name": client_name }))
                .shape(ResponseShape::keys(&["id", "client_name"])),
        );

        let (listed, _) = self.run_test(
            TestRequest::get("List Status Checks", "api/status", 200).shape(ResponseShape::Array),
        );

        created && listed
    }

    pub fn test_single_image_detection(&mut self) -> bool {
        let image = match fixtures::plate_frame(FIXTURE_PLATE_TEXT) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.log_test("Single Image Detection", false, format!("Fixture error: {err}"));
                return false;
            }
        };

        let (success, body) = self.run_test(
            TestRequest::post("Single Image Detection", "api/detect/image", 200)
                .upload(Upload::jpeg("file", "test_plate.jpg", image))
                .shape(ResponseShape::keys(&["success", "message"])),
        );

        if success {
            self.detection_id = id_field(&body, &["detection_id", "id"]);
            tracing::info!(
                detection_id = ?self.detection_id,
                reply = %body["message"],
                "single image processed"
            );
        }
        success
    }

    pub fn test_batch_detection(&mut self) -> bool {
        let uploads: HarnessResult<Vec<Upload>> = (1..=2)
            .map(|i| {
                fixtures::white_frame()
                    .map(|bytes| Upload::jpeg("files", format!("batch_image_{i}.jpg"), bytes))
            })
            .collect();
        let uploads = match uploads {
            Ok(uploads) => uploads,
            Err(err) => {
                self.log_test("Batch Detection", false, format!("Fixture error: {err}"));
                return false;
            }
        };

        let mut request = TestRequest::post("Batch Detection", "api/detect/batch", 200)
            .shape(ResponseShape::keys(&["success", "total"]));
        for upload in uploads {
            request = request.upload(upload);
        }

        let (success, body) = self.run_test(request);
        if success {
            let total = &body["total"];
            let successful = &body["successful"];
            let failed = &body["failed"];
            tracing::info!(%total, %successful, %failed, "batch processed");
        }
        success
    }

    pub fn test_detections_endpoints(&mut self) -> bool {
        let (listed, body) = self.run_test(TestRequest::get("List Detections", "api/detections", 200));

        let known_id = self
            .detection_id
            .clone()
            .or_else(|| first_detection_id(&body));

        let fetched = match known_id {
            Some(id) => {
                let (ok, _) = self.run_test(
                    TestRequest::get("Get Detection By Id", "api/detections", 200)
                        .segment(id)
                        .shape(ResponseShape::keys(&["id"])),
                );
                ok
            }
            None => {
                tracing::info!("no detection id available, skipping lookup by id");
                true
            }
        };

        let (missing, _) = self.run_test(
            TestRequest::get("Get Unknown Detection", "api/detections", 404)
                .segment(UNKNOWN_DETECTION_ID),
        );

        listed && fetched && missing
    }

    pub fn test_file_serving(&mut self) -> bool {
        let (upload, _) = self.run_test(
            TestRequest::get("Missing Upload File", "api/files/uploads", 404)
                .segment(MISSING_FILE_NAME),
        );
        let (output, _) = self.run_test(
            TestRequest::get("Missing Output File", "api/files/outputs", 404)
                .segment(MISSING_FILE_NAME),
        );
        upload && output
    }

    /// Summary of everything recorded so far
    pub fn summary(&self) -> TestSummary {
        TestSummary::from_results(&self.results)
    }

    /// Run every scenario in order, print and persist the summary.
    ///
    /// Returns the process exit code: 0 when every test passed, 1 otherwise.
    pub fn run_all_tests(&mut self) -> i32 {
        tracing::info!(base_url = %self.config().base_url, "starting ANPR backend tests");

        let scenarios: [(&str, fn(&mut Self) -> bool); 6] = [
            ("root", Self::test_root_endpoint),
            ("status", Self::test_status_endpoints),
            ("single detection", Self::test_single_image_detection),
            ("batch detection", Self::test_batch_detection),
            ("detection history", Self::test_detections_endpoints),
            ("file serving", Self::test_file_serving),
        ];

        for (label, scenario) in scenarios {
            let passed = scenario(self);
            tracing::info!(scenario = label, passed, "scenario finished");
        }

        let summary = self.summary();
        report::print_summary(&summary);

        let mut exit_code = if summary.all_passed() { 0 } else { 1 };

        if let Some(path) = &self.config().results_path {
            match report::write_summary(&summary, path) {
                Ok(()) => tracing::info!(path = %path.display(), "results written"),
                Err(err) => {
                    tracing::error!(path = %path.display(), error = %err, "failed to write results");
                    exit_code = 1;
                }
            }
        }

        exit_code
    }
}

/// Turn a response into (success, details, body)
fn evaluate(request: &TestRequest, response: &HttpResponse) -> (bool, String, Value) {
    if response.status != request.expected_status {
        let details = format!(
            "Expected {}, got {}: {}",
            request.expected_status,
            response.status,
            excerpt(&response.body)
        );
        let body = serde_json::from_str(&response.body).unwrap_or_else(|_| empty_object());
        return (false, details, body);
    }

    let body = match serde_json::from_str::<Value>(&response.body) {
        Ok(body) => body,
        Err(err) if request.expects_json() => {
            let err = HarnessError::Decode(err.to_string());
            return (false, err.to_string(), empty_object());
        }
        Err(_) => empty_object(),
    };

    match request.shape.violation(&body) {
        Some(violation) => (false, violation, body),
        None => (true, format!("Status: {}", response.status), body),
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// First string/number found under any of `keys`
fn id_field(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match body.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Id of the first detection in either a bare list or `{"detections": [...]}`
fn first_detection_id(body: &Value) -> Option<String> {
    let list = body
        .as_array()
        .or_else(|| body.get("detections").and_then(Value::as_array))?;
    list.first().and_then(|first| id_field(first, &["id"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_evaluate_status_mismatch() {
        let request = TestRequest::get("Root Endpoint", "api/", 200);
        let (ok, details, _) = evaluate(&request, &response(500, "boom"));
        assert!(!ok);
        assert_eq!(details, "Expected 200, got 500: boom");
    }

    #[test]
    fn test_evaluate_non_json_success_body() {
        let request = TestRequest::get("Root Endpoint", "api/", 200);
        let (ok, details, body) = evaluate(&request, &response(200, "<html>"));
        assert!(!ok);
        assert!(details.starts_with("Invalid JSON response"));
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_evaluate_expected_404_ignores_body() {
        let request = TestRequest::get("Missing Upload File", "api/files/uploads/x.jpg", 404);
        let (ok, details, body) = evaluate(&request, &response(404, "Not Found"));
        assert!(ok);
        assert_eq!(details, "Status: 404");
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_evaluate_shape_failure() {
        let request = TestRequest::post("Batch Detection", "api/detect/batch", 200)
            .shape(ResponseShape::keys(&["success", "total"]));
        let (ok, details, body) = evaluate(&request, &response(200, r#"{"success":true}"#));
        assert!(!ok);
        assert_eq!(details, "Missing keys: total");
        assert_eq!(body, json!({"success": true}));
    }

    #[test]
    fn test_first_detection_id_shapes() {
        assert_eq!(first_detection_id(&json!([{"id": "a"}, {"id": "b"}])), Some("a".to_string()));
        assert_eq!(
            first_detection_id(&json!({"detections": [{"id": 7}]})),
            Some("7".to_string())
        );
        assert_eq!(first_detection_id(&json!([])), None);
        assert_eq!(first_detection_id(&json!({"message": "none"})), None);
    }

    #[test]
    fn test_id_field_prefers_first_key() {
        let body = json!({"detection_id": "det-1", "id": "other"});
        assert_eq!(id_field(&body, &["detection_id", "id"]), Some("det-1".to_string()));
        assert_eq!(id_field(&json!({"id": ""}), &["id"]), None);
    }

    #[test]
    fn test_log_test_counts() {
        let mut runner = TestRunner::new(HarnessConfig::new("http://127.0.0.1:9")).unwrap();
        runner.log_test("a", true, "ok");
        runner.log_test("b", false, "bad");

        assert_eq!(runner.tests_run(), 2);
        assert_eq!(runner.tests_passed(), 1);
        assert_eq!(runner.results().len(), 2);
        assert_eq!(runner.summary().failed_tests, 1);
    }
}
