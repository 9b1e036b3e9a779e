//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and turns the
//! `Effect`s returned by `update()` into tokio tasks.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Busy** (a request in flight or Eva typing): draws every ~80ms so the
//!   spinners move.
//! - **Idle**: sleeps up to 500ms and only redraws on events, resizes or
//!   background results.
//!
//! ## Background Work
//!
//! Every effect runs as its own tokio task that reports back through an
//! `mpsc` channel of `Action`s. Abort handles are kept so quitting cancels
//! anything still in flight.

mod component;
mod components;
mod event;
mod ui;

use std::io::stdout;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use tokio::task::AbortHandle;

use crate::backend::{AgentBackend, SpreadsheetUpload};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    FieldEvent, MessageListState, TextField, WizardEvent, WizardForm,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const BUSY_FRAME: Duration = Duration::from_millis(80);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Which half of the main screen receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Wizard,
    Chat,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub connection_field: TextField,
    pub wizard_form: WizardForm,
    pub message_list: MessageListState,
    pub chat_input: TextField,
    pub focus: Pane,
    pub spinner_frame: usize,
}

impl TuiState {
    /// `connection_string` pre-fills the gate form.
    pub fn new(connection_string: Option<&str>) -> Self {
        let mut connection_field = TextField::new("Connection string", 1)
            .with_placeholder("<endpoint>;<subscription>;<resource-group>;<project>");
        if let Some(cs) = connection_string {
            connection_field.set_text(cs);
        }
        Self {
            connection_field,
            wizard_form: WizardForm::new(),
            message_list: MessageListState::new(),
            chat_input: TextField::new("Chat", 4).with_placeholder("Message Eva..."),
            focus: Pane::Wizard,
            spinner_frame: 0,
        }
    }

    /// Tab order: wizard slots for the current step, then the chat box.
    pub fn focus_next(&mut self) {
        match self.focus {
            Pane::Wizard if self.wizard_form.focus_next() => {}
            Pane::Wizard => self.focus = Pane::Chat,
            Pane::Chat => {
                self.focus = Pane::Wizard;
                self.wizard_form.focus_first();
            }
        }
    }

    pub fn focus_prev(&mut self) {
        match self.focus {
            Pane::Wizard if self.wizard_form.focus_prev() => {}
            Pane::Wizard => self.focus = Pane::Chat,
            Pane::Chat => {
                self.focus = Pane::Wizard;
                self.wizard_form.focus_last();
            }
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals that
        // lack it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Owns the channel back into the event loop and the handles of every
/// task still running.
struct Dispatcher {
    tx: mpsc::Sender<Action>,
    tasks: Vec<AbortHandle>,
}

impl Dispatcher {
    fn new(tx: mpsc::Sender<Action>) -> Self {
        Self {
            tx,
            tasks: Vec::new(),
        }
    }

    /// Runs `action` through the reducer and starts its effect.
    /// Returns true when the app should quit.
    fn dispatch(&mut self, app: &mut App, action: Action) -> bool {
        debug!("Dispatching {:?}", action);
        let effect = update(app, action);
        self.run_effect(app, effect)
    }

    fn run_effect(&mut self, app: &App, effect: Effect) -> bool {
        self.tasks.retain(|handle| !handle.is_finished());
        match effect {
            Effect::None => {}
            Effect::Quit => return true,
            Effect::TestConnection(cs) => {
                self.spawn(app.backend.clone(), move |backend| async move {
                    let ok = match backend.test_connection(&cs).await {
                        Ok(ok) => ok,
                        Err(e) => {
                            warn!("Connection test failed: {}", e);
                            false
                        }
                    };
                    Action::ConnectionTested(ok)
                });
            }
            Effect::SaveConnection(cs) => {
                self.spawn(app.backend.clone(), move |backend| async move {
                    Action::ConnectionSaved(
                        backend.set_connection(&cs).await.map_err(|e| e.to_string()),
                    )
                });
            }
            Effect::SendProfile(message) => {
                let ctx = app.request.clone();
                self.spawn(app.backend.clone(), move |backend| async move {
                    Action::ProfileSubmitted(
                        backend.chat(&ctx, &message).await.map_err(|e| e.to_string()),
                    )
                });
            }
            Effect::UploadSpreadsheet(path) => {
                self.spawn(app.backend.clone(), move |backend| async move {
                    Action::SpreadsheetUploaded(upload(backend, path).await)
                });
            }
            Effect::ProcessInvitees(urls) => {
                let ctx = app.request.clone();
                self.spawn(app.backend.clone(), move |backend| async move {
                    Action::InviteesProcessed(
                        backend
                            .process_invitees(&ctx, &urls)
                            .await
                            .map_err(|e| e.to_string()),
                    )
                });
            }
            Effect::GenerateEmails(prompt) => {
                let ctx = app.request.clone();
                self.spawn(app.backend.clone(), move |backend| async move {
                    Action::EmailsGenerated(
                        backend.chat(&ctx, &prompt).await.map_err(|e| e.to_string()),
                    )
                });
            }
            Effect::SendEmails(emails) => {
                self.spawn(app.backend.clone(), move |backend| async move {
                    let count = emails.len();
                    Action::EmailsSent(
                        backend
                            .send_emails(&emails)
                            .await
                            .map(|()| count)
                            .map_err(|e| e.to_string()),
                    )
                });
            }
            Effect::SendChat { ticket, message } => {
                let ctx = app.request.clone();
                self.spawn(app.backend.clone(), move |backend| async move {
                    Action::ChatReplied {
                        ticket,
                        result: backend.chat(&ctx, &message).await.map_err(|e| e.to_string()),
                    }
                });
                let delay = app.typing_indicator;
                let tx = self.tx.clone();
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if tx.send(Action::TypingElapsed(ticket)).is_err() {
                        debug!("Typing timer fired after shutdown (ticket={})", ticket);
                    }
                });
                self.tasks.push(timer.abort_handle());
            }
        }
        false
    }

    /// Spawns `job` on the runtime and forwards the action it produces.
    fn spawn<F, Fut>(&mut self, backend: Arc<dyn AgentBackend>, job: F)
    where
        F: FnOnce(Arc<dyn AgentBackend>) -> Fut + Send + 'static,
        Fut: Future<Output = Action> + Send + 'static,
    {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let action = job(backend).await;
            if tx.send(action).is_err() {
                warn!("Failed to deliver backend result: receiver dropped");
            }
        });
        self.tasks.push(handle.abort_handle());
    }

    fn abort_all(&mut self) {
        let live = self.tasks.iter().filter(|h| !h.is_finished()).count();
        if live > 0 {
            info!("Aborting {} in-flight tasks", live);
        }
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
    }
}

async fn upload(
    backend: Arc<dyn AgentBackend>,
    path: PathBuf,
) -> Result<Vec<crate::core::profile::InviteeProfile>, String> {
    let file = SpreadsheetUpload::read(&path)
        .await
        .map_err(|e| e.to_string())?;
    backend
        .upload_spreadsheet(file)
        .await
        .map_err(|e| e.to_string())
}

/// Whether anything on screen is animating.
fn is_busy(app: &App) -> bool {
    app.gate.is_busy() || app.wizard.is_busy() || app.sending_emails || app.chat.is_typing()
}

pub fn run(config: ResolvedConfig, backend: Arc<dyn AgentBackend>) -> std::io::Result<()> {
    info!("Using {} backend", backend.name());
    let mut app = App::from_config(backend, &config);
    let mut tui = TuiState::new(config.connection_string.as_deref());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut dispatcher = Dispatcher::new(tx.clone());

    // Skip the gate when the backend already holds a connection
    {
        let backend = app.backend.clone();
        let tx = tx.clone();
        let handle = tokio::spawn(async move {
            let connected = match backend.connection_status().await {
                Ok(connected) => connected,
                Err(e) => {
                    warn!("Connection status check failed: {}", e);
                    false
                }
            };
            if tx.send(Action::ConnectionStatusChecked(connected)).is_err() {
                debug!("Connection status arrived after shutdown");
            }
        });
        dispatcher.tasks.push(handle.abort_handle());
    }

    let start_time = Instant::now();
    let mut needs_redraw = true;

    loop {
        let busy = is_busy(&app);
        if busy {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.spinner_frame = (start_time.elapsed().as_millis() / 120) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if busy { BUSY_FRAME } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain everything pending before the next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            should_quit |= handle_event(&mut app, &mut tui, &mut dispatcher, event);
        }

        // Results from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            should_quit |= dispatcher.dispatch(&mut app, action);
        }

        if should_quit {
            break;
        }
    }

    dispatcher.abort_all();
    ratatui::restore();
    info!("Evagent shutting down");
    Ok(())
}

/// Routes one terminal event. Returns true when the app should quit.
fn handle_event(
    app: &mut App,
    tui: &mut TuiState,
    dispatcher: &mut Dispatcher,
    event: TuiEvent,
) -> bool {
    match event {
        TuiEvent::Resize => return false,
        TuiEvent::Quit => return dispatcher.dispatch(app, Action::Quit),
        _ => {}
    }

    // Gate: only the connection field is live
    if !app.gate.is_connected() {
        if let Some(FieldEvent::Submit(text)) = tui.connection_field.handle_event(&event) {
            return dispatcher.dispatch(app, Action::SubmitConnection(text));
        }
        return false;
    }

    match event {
        TuiEvent::FocusNext => tui.focus_next(),
        TuiEvent::FocusPrev => tui.focus_prev(),
        TuiEvent::SendEmails => return dispatcher.dispatch(app, Action::SendEmails),
        _ => match tui.focus {
            Pane::Chat => match event {
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.message_list.handle_event(&event);
                }
                _ => match tui.chat_input.handle_event(&event) {
                    Some(FieldEvent::Submit(text)) => {
                        if text.trim().is_empty() {
                            return false;
                        }
                        tui.chat_input.clear();
                        tui.message_list.stick_to_bottom = true;
                        return dispatcher.dispatch(app, Action::SubmitChat(text));
                    }
                    Some(FieldEvent::Changed) => {}
                    // Up/Down past the first/last row scroll the history
                    None => {
                        tui.message_list.handle_event(&event);
                    }
                },
            },
            Pane::Wizard => {
                tui.wizard_form.sync_step(app.wizard.step());
                if let Some(wizard_event) = tui.wizard_form.handle_event(&event) {
                    let action = match wizard_event {
                        WizardEvent::SubmitProfile(profile) => Action::SubmitProfile(profile),
                        WizardEvent::UploadSpreadsheet(path) => Action::UploadSpreadsheet(path),
                        WizardEvent::ProcessInvitees => Action::ProcessInvitees,
                        WizardEvent::GenerateEmails => Action::GenerateEmails,
                    };
                    return dispatcher.dispatch(app, action);
                }
            }
        },
    }
    false
}
