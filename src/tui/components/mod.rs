//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: top status line with wizard progress
//! - `Message`: a single chat bubble
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `TextField`: labelled text input shared by every form
//! - `MessageList`: scrollable chat view with layout caching
//! - `WizardPanel`: stepper and per-step form
//! - `ConnectionSetup`: connection string gate
//!
//! Components receive external data as props (struct fields or borrowed
//! state), never by reaching into global state:
//!
//! ```rust,ignore
//! TitleBar::new(Some(app.wizard.step()), app.status_message.clone(), false)
//!     .render(frame, title_area);
//! ```
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── connection_setup.rs
//! ├── wizard_panel.rs
//! └── text_field/
//! ```

pub mod connection_setup;
pub mod message;
pub mod message_list;
pub mod text_field;
mod title_bar;
pub mod wizard_panel;

pub use connection_setup::ConnectionSetup;
pub use message_list::{MessageList, MessageListState};
pub use text_field::{FieldEvent, TextField};
pub use title_bar::TitleBar;
pub use wizard_panel::{WizardEvent, WizardForm, WizardPanel};
