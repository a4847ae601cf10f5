pub mod client;
pub mod suite;
pub mod types;

pub use client::ApiClient;
pub use suite::TestRunner;
pub use types::{
    HarnessConfig, HarnessError, HarnessResult, HttpMethod, HttpResponse, ResponseShape,
    TestRequest, Upload,
};
