//! HTTP implementation of [`AgentBackend`] against the Evagent FastAPI
//! service.
//!
//! All calls are plain request/response JSON except `/upload_excel/`, which
//! takes the spreadsheet as a multipart `file` field.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::backend::types::{
    ChatRequest, ChatResponse, ConnectionRequest, ConnectionStatusResponse,
    ProcessInviteesRequest, ProcessInviteesResponse, SendEmailsRequest, UploadResponse,
};
use crate::backend::{AgentBackend, BackendError, SpreadsheetUpload};
use crate::core::profile::{FilteredClient, InviteeProfile};
use crate::core::session::RequestContext;

pub const DEFAULT_CHAT_PATH: &str = "/chat/";

pub struct HttpBackend {
    base_url: String,
    chat_path: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Builds a client for `base_url`. `timeout` of `None` keeps the
    /// transport default.
    pub fn new(
        base_url: &str,
        chat_path: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self, BackendError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(BackendError::Config("backend URL is empty".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        let chat_path = match chat_path.map(str::trim) {
            Some(path) if !path.is_empty() => {
                if path.starts_with('/') {
                    path.to_string()
                } else {
                    format!("/{path}")
                }
            }
            _ => DEFAULT_CHAT_PATH.to_string(),
        };

        Ok(Self {
            base_url,
            chat_path,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and turns non-success statuses into `BackendError::Api`.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        debug!("Backend response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Backend error: {} - {}", status, err_body);
            return Err(BackendError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| {
            debug!("Unparseable backend body: {}", body);
            BackendError::Parse(e.to_string())
        })
    }
}

#[async_trait]
impl AgentBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn connection_status(&self) -> Result<bool, BackendError> {
        let response = self
            .send(self.client.get(self.url("/connection_status/")))
            .await?;
        let status: ConnectionStatusResponse = Self::parse(response).await?;
        info!("Backend connection status: connected={}", status.connected);
        Ok(status.connected)
    }

    async fn test_connection(&self, connection_string: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .post(self.url("/test_connection"))
            .json(&ConnectionRequest { connection_string })
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        // Only the status matters for this probe
        let ok = response.status().is_success();
        info!("Connection test returned HTTP {}", response.status());
        Ok(ok)
    }

    async fn set_connection(&self, connection_string: &str) -> Result<(), BackendError> {
        self.send(
            self.client
                .post(self.url("/set_connection/"))
                .json(&ConnectionRequest { connection_string }),
        )
        .await?;
        info!("Connection string stored on backend");
        Ok(())
    }

    async fn chat(&self, ctx: &RequestContext, message: &str) -> Result<String, BackendError> {
        info!(
            "Chat request: session={}, message_len={}",
            ctx.session_id,
            message.len()
        );
        let response = self
            .send(self.client.post(self.url(&self.chat_path)).json(&ChatRequest {
                session_id: &ctx.session_id,
                message,
            }))
            .await?;
        let chat: ChatResponse = Self::parse(response).await?;
        Ok(chat.response)
    }

    async fn upload_spreadsheet(
        &self,
        upload: SpreadsheetUpload,
    ) -> Result<Vec<InviteeProfile>, BackendError> {
        info!(
            "Uploading spreadsheet: {} ({} bytes)",
            upload.file_name,
            upload.bytes.len()
        );
        let mime = upload.mime_type();
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime)
            .map_err(|e| BackendError::Config(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .send(self.client.post(self.url("/upload_excel/")).multipart(form))
            .await?;
        let parsed: UploadResponse = Self::parse(response).await?;
        let invitees = parsed.into_invitees();
        info!("Spreadsheet parsed: {} invitees with LinkedIn URLs", invitees.len());
        Ok(invitees)
    }

    async fn process_invitees(
        &self,
        ctx: &RequestContext,
        linkedin_urls: &[String],
    ) -> Result<Vec<FilteredClient>, BackendError> {
        info!(
            "Processing invitees: session={}, count={}",
            ctx.session_id,
            linkedin_urls.len()
        );
        let response = self
            .send(
                self.client
                    .post(self.url("/process_invitees/"))
                    .json(&ProcessInviteesRequest {
                        session_id: &ctx.session_id,
                        linkedin_urls,
                    }),
            )
            .await?;
        let parsed: ProcessInviteesResponse = Self::parse(response).await?;
        info!("Backend returned {} evaluated profiles", parsed.potential_clients.len());
        Ok(parsed.potential_clients)
    }

    async fn send_emails(&self, emails: &[String]) -> Result<(), BackendError> {
        info!("Sending emails to {} recipients", emails.len());
        self.send(
            self.client
                .post(self.url("/send_emails/"))
                .json(&SendEmailsRequest {
                    potential_clients: emails,
                }),
        )
        .await?;
        Ok(())
    }
}
