//! # Connection Gate
//!
//! The backend needs an Azure AI project connection string before anything
//! else works. The gate collects one, has the backend test it, stores it,
//! and only then lets the main screen mount.
//!
//! ```text
//! Editing ──submit──► Testing ──ok──► Saving ──ok──► Connected
//!    ▲                   │               │
//!    └──── error ◄───────┴───────────────┘
//! ```

pub const EMPTY_CONNECTION_ERROR: &str = "Please enter a connection string";
pub const INVALID_CONNECTION_ERROR: &str =
    "Invalid connection string. Please check your Azure credentials.";
pub const SAVE_CONNECTION_ERROR: &str = "Failed to save the connection. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Editing,
    Testing,
    Saving,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionGate {
    pub phase: GatePhase,
    /// Inline error shown under the form.
    pub error: Option<String>,
    /// Connection string being tested or saved.
    pub pending: Option<String>,
}

impl ConnectionGate {
    pub fn new() -> Self {
        Self {
            phase: GatePhase::Editing,
            error: None,
            pending: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.phase == GatePhase::Connected
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, GatePhase::Testing | GatePhase::Saving)
    }

    /// Starts a connection test. Returns the trimmed string to test, or
    /// `None` when the submit is rejected (blank input or busy).
    pub fn submit(&mut self, connection_string: &str) -> Option<String> {
        if self.phase != GatePhase::Editing {
            return None;
        }
        let trimmed = connection_string.trim();
        if trimmed.is_empty() {
            self.error = Some(EMPTY_CONNECTION_ERROR.to_string());
            return None;
        }
        self.phase = GatePhase::Testing;
        self.error = None;
        self.pending = Some(trimmed.to_string());
        Some(trimmed.to_string())
    }

    /// Applies a test result. Returns the string to store when it passed.
    pub fn tested(&mut self, ok: bool) -> Option<String> {
        if self.phase != GatePhase::Testing {
            return None;
        }
        if ok {
            self.phase = GatePhase::Saving;
            self.pending.clone()
        } else {
            self.reopen(INVALID_CONNECTION_ERROR);
            None
        }
    }

    pub fn saved(&mut self, ok: bool) {
        if self.phase != GatePhase::Saving {
            return;
        }
        if ok {
            self.phase = GatePhase::Connected;
            self.error = None;
            self.pending = None;
        } else {
            self.reopen(SAVE_CONNECTION_ERROR);
        }
    }

    /// The backend already holds a working connection.
    pub fn already_connected(&mut self) {
        self.phase = GatePhase::Connected;
        self.error = None;
        self.pending = None;
    }

    fn reopen(&mut self, error: &str) {
        self.phase = GatePhase::Editing;
        self.error = Some(error.to_string());
        self.pending = None;
    }
}

impl Default for ConnectionGate {
    fn default() -> Self {
        Self::new()
    }
}
