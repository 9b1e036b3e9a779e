pub mod client;
pub mod http;
pub mod types;

pub use client::{AgentBackend, BackendError, SpreadsheetUpload};
pub use http::HttpBackend;
