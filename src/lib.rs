//! ANPR API Harness - sequential HTTP checks against a license plate
//! recognition backend.
//!
//! This crate provides:
//! - A blocking API client with per-request timeouts and multipart uploads
//! - A fixed scenario battery (root, status, detection, history, file serving)
//! - Synthetic JPEG fixtures for the detection endpoints
//! - Pass/fail bookkeeping with a JSON summary report
//!
//! # Example
//!
//! ```rust,no_run
//! use anpr_api_harness::{HarnessConfig, TestRunner};
//!
//! let config = HarnessConfig::new("http://localhost:8001");
//! let mut runner = TestRunner::new(config).unwrap();
//! let exit_code = runner.run_all_tests();
//! std::process::exit(exit_code);
//! ```

pub mod config;
pub mod fixtures;
pub mod harness;
pub mod report;
pub mod runner;

// Re-export runner types
pub use runner::{TestResult, TestSummary};

// Re-export harness types
pub use harness::{
    ApiClient, HarnessConfig, HarnessError, HarnessResult, HttpMethod, ResponseShape, TestRequest,
    TestRunner, Upload,
};

// Re-export fixtures
pub use fixtures::{TestImage, plate_frame, white_frame};
