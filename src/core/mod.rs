//! # Core Application Logic
//!
//! Evagent's business logic. It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                     ┌──────────┴──────────┐
//!                     ▼                     ▼
//!              ┌────────────┐        ┌────────────┐
//!              │    TUI     │        │  Backend   │
//!              │  Adapter   │        │  (HTTP)    │
//!              │ (ratatui)  │        │            │
//!              └────────────┘        └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`wizard`]: Step progression and trigger gating
//! - [`gate`]: Connection setup state machine
//! - [`chat`]: Chat log with pending/confirmed/failed sends
//! - [`profile`]: Company, invitee and potential client records
//! - [`session`]: Session ids and request context
//! - [`config`]: TOML config and override resolution

pub mod action;
pub mod chat;
pub mod config;
pub mod gate;
pub mod profile;
pub mod session;
pub mod state;
pub mod wizard;

pub use action::{Action, Effect, update};
pub use state::App;
