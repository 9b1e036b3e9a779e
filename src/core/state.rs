//! # Application State
//!
//! Core business state for Evagent. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn AgentBackend>   // remote agent service
//! ├── request: RequestContext          // session id sent with every call
//! ├── gate: ConnectionGate             // connection string setup
//! ├── wizard: Wizard                   // step + trigger gating
//! ├── profile: CompanyProfile          // submitted company profile
//! ├── profile_reply: Option<String>    // agent's acknowledgement
//! ├── invitees: Vec<InviteeProfile>    // parsed from the upload
//! ├── clients: Vec<PotentialClient>    // filtered matches
//! ├── email_draft: Option<String>      // generated outreach emails
//! ├── sending_emails: bool             // /send_emails/ in flight
//! ├── chat: ChatLog                    // free-form conversation
//! ├── status_message: String           // status bar text
//! └── typing_indicator: Duration       // max time the typing bubble shows
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::AgentBackend;
use crate::core::chat::ChatLog;
use crate::core::config::{DEFAULT_TYPING_INDICATOR_MS, ResolvedConfig};
use crate::core::gate::ConnectionGate;
use crate::core::profile::{CompanyProfile, InviteeProfile, PotentialClient};
use crate::core::session::RequestContext;
use crate::core::wizard::{FailurePolicy, Wizard};

pub struct App {
    pub backend: Arc<dyn AgentBackend>,
    pub request: RequestContext,
    pub gate: ConnectionGate,
    pub wizard: Wizard,
    pub profile: CompanyProfile,
    pub profile_reply: Option<String>,
    pub invitees: Vec<InviteeProfile>,
    pub clients: Vec<PotentialClient>,
    pub email_draft: Option<String>,
    pub sending_emails: bool,
    pub chat: ChatLog,
    pub status_message: String,
    pub typing_indicator: Duration,
}

impl App {
    pub fn new(backend: Arc<dyn AgentBackend>, policy: FailurePolicy, greeting: &str) -> Self {
        Self {
            backend,
            request: RequestContext::new(),
            gate: ConnectionGate::new(),
            wizard: Wizard::new(policy),
            profile: CompanyProfile::default(),
            profile_reply: None,
            invitees: Vec::new(),
            clients: Vec::new(),
            email_draft: None,
            sending_emails: false,
            chat: ChatLog::with_greeting(greeting),
            status_message: String::from("Welcome to Evagent!"),
            typing_indicator: Duration::from_millis(DEFAULT_TYPING_INDICATOR_MS),
        }
    }

    pub fn from_config(backend: Arc<dyn AgentBackend>, config: &ResolvedConfig) -> Self {
        let mut app = Self::new(backend, config.failure_policy, &config.greeting);
        app.typing_indicator = config.typing_indicator;
        app
    }

    /// LinkedIn URLs shown in the file/process steps, in upload order.
    pub fn linkedin_urls(&self) -> Vec<String> {
        crate::core::profile::linkedin_urls(&self.invitees)
    }
}
