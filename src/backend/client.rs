use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::core::profile::{FilteredClient, InviteeProfile};
use crate::core::session::RequestContext;

/// Errors that can occur while talking to the agent backend.
#[derive(Debug)]
pub enum BackendError {
    /// Client misconfigured (bad base URL, TLS setup). Not retryable.
    Config(String),
    /// Could not read the spreadsheet from disk.
    Io(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Backend returned a non-success status.
    Api { status: u16, message: String },
    /// Response body did not have the expected shape.
    Parse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Io(msg) => write!(f, "file error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "backend error (HTTP {status}): {message}")
            }
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// A spreadsheet ready to be sent to `/upload_excel/`.
#[derive(Debug, Clone)]
pub struct SpreadsheetUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SpreadsheetUpload {
    pub async fn read(path: &Path) -> Result<Self, BackendError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| BackendError::Io(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "invitees.xlsx".to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn mime_type(&self) -> &'static str {
        let lower = self.file_name.to_ascii_lowercase();
        if lower.ends_with(".xlsx") {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        } else if lower.ends_with(".xls") {
            "application/vnd.ms-excel"
        } else if lower.ends_with(".csv") {
            "text/csv"
        } else {
            "application/octet-stream"
        }
    }
}

/// The remote agent service. Everything interesting happens behind it.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Returns the name of the backend (for logs).
    fn name(&self) -> &str;

    /// Whether the backend already holds a working connection.
    async fn connection_status(&self) -> Result<bool, BackendError>;

    /// Probes a connection string. `Ok(false)` means the backend rejected it.
    async fn test_connection(&self, connection_string: &str) -> Result<bool, BackendError>;

    /// Stores a tested connection string on the backend.
    async fn set_connection(&self, connection_string: &str) -> Result<(), BackendError>;

    /// Sends one chat message and returns the agent's reply text.
    async fn chat(&self, ctx: &RequestContext, message: &str) -> Result<String, BackendError>;

    /// Uploads a spreadsheet and returns the parsed invitees.
    async fn upload_spreadsheet(
        &self,
        upload: SpreadsheetUpload,
    ) -> Result<Vec<InviteeProfile>, BackendError>;

    /// Asks the agent to evaluate the invitees against the company profile.
    async fn process_invitees(
        &self,
        ctx: &RequestContext,
        linkedin_urls: &[String],
    ) -> Result<Vec<FilteredClient>, BackendError>;

    /// Hands the final recipient list to the backend's mailer.
    async fn send_emails(&self, emails: &[String]) -> Result<(), BackendError>;
}
