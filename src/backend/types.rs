//! Wire types for the agent backend's JSON endpoints.
//!
//! Request bodies borrow from the caller; response bodies only declare the
//! fields Evagent reads and default everything else.

use serde::{Deserialize, Serialize};

use crate::core::profile::{FilteredClient, InviteeProfile};
use crate::core::session::SessionId;

#[derive(Serialize, Debug)]
pub struct ConnectionRequest<'a> {
    pub connection_string: &'a str,
}

#[derive(Deserialize, Debug, Default)]
pub struct ConnectionStatusResponse {
    #[serde(default)]
    pub connected: bool,
}

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub session_id: &'a SessionId,
    pub message: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub response: String,
}

/// One parsed spreadsheet row. Rows without a LinkedIn URL are skipped.
#[derive(Deserialize, Debug)]
pub struct UploadedRow {
    #[serde(rename = "linkedinUrl", default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UploadResponse {
    #[serde(default)]
    pub linkedin_data: Vec<UploadedRow>,
}

impl UploadResponse {
    /// Rows with a non-blank `linkedinUrl`, in upload order.
    pub fn into_invitees(self) -> Vec<InviteeProfile> {
        self.linkedin_data
            .into_iter()
            .filter_map(|row| {
                let url = row.linkedin_url.filter(|u| !u.trim().is_empty())?;
                Some(InviteeProfile {
                    linkedin_url: url,
                    name: row.name,
                    email: row.email,
                })
            })
            .collect()
    }
}

#[derive(Serialize, Debug)]
pub struct ProcessInviteesRequest<'a> {
    pub session_id: &'a SessionId,
    pub linkedin_urls: &'a [String],
}

#[derive(Deserialize, Debug, Default)]
pub struct ProcessInviteesResponse {
    #[serde(default)]
    pub potential_clients: Vec<FilteredClient>,
}

#[derive(Serialize, Debug)]
pub struct SendEmailsRequest<'a> {
    pub potential_clients: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Contract test: the chat body is exactly `{session_id, message}`.
    #[test]
    fn test_chat_request_serialization() {
        let id = crate::core::session::SessionId::generate();
        let req = ChatRequest {
            session_id: &id,
            message: "hello",
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["session_id"], id.as_str());
        assert_eq!(value["message"], "hello");
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_process_request_serialization() {
        let ctx = crate::core::session::RequestContext::new();
        let urls = vec!["https://linkedin.com/in/a".to_string()];
        let req = ProcessInviteesRequest {
            session_id: &ctx.session_id,
            linkedin_urls: &urls,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["linkedin_urls"][0], "https://linkedin.com/in/a");
        assert_eq!(value["session_id"], ctx.session_id.as_str());
    }

    #[test]
    fn test_connection_request_serialization() {
        let req = ConnectionRequest {
            connection_string: "eastus2;sub;rg;ws",
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"connection_string":"eastus2;sub;rg;ws"}"#
        );
    }

    #[test]
    fn test_send_emails_request_serialization() {
        let emails = vec!["a@example.com".to_string()];
        let req = SendEmailsRequest {
            potential_clients: &emails,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"potential_clients":["a@example.com"]}"#
        );
    }

    #[test]
    fn test_upload_response_keeps_order_and_skips_missing_urls() {
        let json = r#"{"linkedin_data": [
            {"linkedinUrl": "https://linkedin.com/in/b", "name": "Bea"},
            {"name": "No Url"},
            {"linkedinUrl": "  "},
            {"linkedinUrl": "https://linkedin.com/in/a", "email": "a@example.com", "company": "Acme"}
        ]}"#;
        let resp: UploadResponse = serde_json::from_str(json).unwrap();
        let invitees = resp.into_invitees();
        let urls: Vec<&str> = invitees.iter().map(|i| i.linkedin_url.as_str()).collect();
        assert_eq!(urls, vec!["https://linkedin.com/in/b", "https://linkedin.com/in/a"]);
        assert_eq!(invitees[0].name.as_deref(), Some("Bea"));
        assert_eq!(invitees[1].email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_empty_responses_default() {
        let upload: UploadResponse = serde_json::from_str("{}").unwrap();
        assert!(upload.into_invitees().is_empty());
        let process: ProcessInviteesResponse = serde_json::from_str("{}").unwrap();
        assert!(process.potential_clients.is_empty());
        let status: ConnectionStatusResponse = serde_json::from_str("{}").unwrap();
        assert!(!status.connected);
    }
}
