//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{AgentBackend, BackendError, SpreadsheetUpload};
use crate::core::profile::{FilteredClient, InviteeProfile};
use crate::core::session::RequestContext;
use crate::core::state::App;
use crate::core::wizard::FailurePolicy;

/// A backend that succeeds with empty results, for tests that never reach
/// the network.
pub struct NoopBackend;

#[async_trait]
impl AgentBackend for NoopBackend {
    fn name(&self) -> &str {
        "noop"
    }

    async fn connection_status(&self) -> Result<bool, BackendError> {
        Ok(false)
    }

    async fn test_connection(&self, _connection_string: &str) -> Result<bool, BackendError> {
        Ok(true)
    }

    async fn set_connection(&self, _connection_string: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn chat(&self, _ctx: &RequestContext, _message: &str) -> Result<String, BackendError> {
        Ok(String::new())
    }

    async fn upload_spreadsheet(
        &self,
        _upload: SpreadsheetUpload,
    ) -> Result<Vec<InviteeProfile>, BackendError> {
        Ok(Vec::new())
    }

    async fn process_invitees(
        &self,
        _ctx: &RequestContext,
        _linkedin_urls: &[String],
    ) -> Result<Vec<FilteredClient>, BackendError> {
        Ok(Vec::new())
    }

    async fn send_emails(&self, _emails: &[String]) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Creates a test App with a NoopBackend and the default failure policy.
pub fn test_app() -> App {
    test_app_with_policy(FailurePolicy::default())
}

pub fn test_app_with_policy(policy: FailurePolicy) -> App {
    App::new(Arc::new(NoopBackend), policy, "Hi! I'm Eva.")
}
