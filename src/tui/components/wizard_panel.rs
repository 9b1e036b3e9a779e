//! # WizardPanel Component
//!
//! Left half of the main screen. Shows a stepper and the form for the
//! current step:
//!
//! ```text
//! ✓ Company ─ ● Invitees ─ ○ Process ─ ○ Emails
//!
//! ╭ Spreadsheet path ────────────────────────╮
//! │ ~/Downloads/guests.xlsx                  │
//! ╰──────────────────────────────────────────╯
//!
//! [Enter] Upload spreadsheet
//! ```
//!
//! `WizardForm` holds the persistent field buffers and focus. `WizardPanel`
//! is created each frame from the form and the borrowed `App`.

use std::path::PathBuf;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};

use crate::core::profile::CompanyProfile;
use crate::core::state::App;
use crate::core::wizard::{Trigger, WizardStep};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::TextField;
use crate::tui::event::TuiEvent;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// High-level events emitted by the wizard form
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    SubmitProfile(CompanyProfile),
    UploadSpreadsheet(PathBuf),
    ProcessInvitees,
    GenerateEmails,
}

pub struct WizardForm {
    pub company_name: TextField,
    pub description: TextField,
    pub ideal_profile: TextField,
    pub spreadsheet_path: TextField,
    /// Focused slot within the current step
    pub focus: usize,
    /// Scroll offset of the generated email draft
    pub draft_scroll: u16,
    /// Current wizard step (Prop)
    pub step: WizardStep,
}

impl Default for WizardForm {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardForm {
    pub fn new() -> Self {
        Self {
            company_name: TextField::new("Company name", 1).with_placeholder("Acme Inc."),
            description: TextField::new("Company description", 4)
                .with_placeholder("What does your company do?"),
            ideal_profile: TextField::new("Ideal customer profile", 4)
                .with_placeholder("Who are you looking to meet?"),
            spreadsheet_path: TextField::new("Spreadsheet path", 1)
                .with_placeholder("~/Downloads/guests.xlsx"),
            focus: 0,
            draft_scroll: 0,
            step: WizardStep::Description,
        }
    }

    /// Focusable slots for a step: one per field, or one for the action.
    pub fn slots(step: WizardStep) -> usize {
        match step {
            WizardStep::Description => 3,
            _ => 1,
        }
    }

    /// Moves focus forward. Returns false when focus leaves the panel.
    pub fn focus_next(&mut self) -> bool {
        if self.focus + 1 < Self::slots(self.step) {
            self.focus += 1;
            true
        } else {
            false
        }
    }

    /// Moves focus backward. Returns false when focus leaves the panel.
    pub fn focus_prev(&mut self) -> bool {
        if self.focus > 0 {
            self.focus -= 1;
            true
        } else {
            false
        }
    }

    pub fn focus_first(&mut self) {
        self.focus = 0;
    }

    pub fn focus_last(&mut self) {
        self.focus = Self::slots(self.step) - 1;
    }

    /// Keeps focus in range after the step changes.
    pub fn sync_step(&mut self, step: WizardStep) {
        if step != self.step {
            self.step = step;
            self.focus = 0;
            self.draft_scroll = 0;
        }
    }

    pub fn profile(&self) -> CompanyProfile {
        CompanyProfile {
            name: self.company_name.text().trim().to_string(),
            description: self.description.text().trim().to_string(),
            ideal_profile: self.ideal_profile.text().trim().to_string(),
        }
    }

    fn profile_fields(&mut self) -> [&mut TextField; 3] {
        [
            &mut self.company_name,
            &mut self.description,
            &mut self.ideal_profile,
        ]
    }

    fn focused_field(&mut self) -> Option<&mut TextField> {
        match self.step {
            WizardStep::Description => {
                let focus = self.focus.min(2);
                self.profile_fields().into_iter().nth(focus)
            }
            WizardStep::File => Some(&mut self.spreadsheet_path),
            _ => None,
        }
    }
}

/// Turns what the user typed into a path: surrounding quotes from
/// drag-and-drop are dropped and a leading `~/` is expanded.
pub fn expand_path(input: &str) -> PathBuf {
    let trimmed = input.trim().trim_matches(|c| c == '"' || c == '\'');
    if let Some(rest) = trimmed.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(trimmed)
}

impl EventHandler for WizardForm {
    type Event = WizardEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match (self.step, event) {
            (WizardStep::Description, TuiEvent::Submit) => {
                if self.focus < 2 {
                    self.focus += 1;
                    None
                } else {
                    Some(WizardEvent::SubmitProfile(self.profile()))
                }
            }
            (WizardStep::File, TuiEvent::Submit) => Some(WizardEvent::UploadSpreadsheet(
                expand_path(self.spreadsheet_path.text()),
            )),
            (WizardStep::Process, TuiEvent::Submit) => Some(WizardEvent::ProcessInvitees),
            (WizardStep::Emails, TuiEvent::Submit) => Some(WizardEvent::GenerateEmails),
            (
                WizardStep::Emails,
                TuiEvent::ScrollUp | TuiEvent::CursorUp | TuiEvent::ScrollPageUp,
            ) => {
                let step = if matches!(event, TuiEvent::ScrollPageUp) { 10 } else { 1 };
                self.draft_scroll = self.draft_scroll.saturating_sub(step);
                None
            }
            (
                WizardStep::Emails,
                TuiEvent::ScrollDown | TuiEvent::CursorDown | TuiEvent::ScrollPageDown,
            ) => {
                let step = if matches!(event, TuiEvent::ScrollPageDown) { 10 } else { 1 };
                self.draft_scroll = self.draft_scroll.saturating_add(step);
                None
            }
            _ => {
                if let Some(field) = self.focused_field() {
                    field.handle_event(event);
                }
                None
            }
        }
    }
}

/// Transient render wrapper for the wizard.
pub struct WizardPanel<'a> {
    pub form: &'a mut WizardForm,
    pub app: &'a App,
    /// Whether the wizard pane has keyboard focus
    pub focused: bool,
    pub spinner_frame: usize,
}

impl<'a> WizardPanel<'a> {
    pub fn new(form: &'a mut WizardForm, app: &'a App, focused: bool, spinner_frame: usize) -> Self {
        Self {
            form,
            app,
            focused,
            spinner_frame,
        }
    }

    fn stepper(&self) -> Line<'static> {
        let current = self.app.wizard.step();
        let mut spans = Vec::new();
        for (i, step) in WizardStep::ALL.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ─ ", Style::default().fg(Color::DarkGray)));
            }
            let (mark, style) = if *step < current {
                ("✓", Style::default().fg(Color::Green))
            } else if *step == current {
                (
                    "●",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )
            } else {
                ("○", Style::default().fg(Color::DarkGray))
            };
            spans.push(Span::styled(format!("{} {}", mark, step.label()), style));
        }
        Line::from(spans)
    }

    fn action_label(&self) -> &'static str {
        match self.app.wizard.step() {
            WizardStep::Description => "Submit company profile",
            WizardStep::File => "Upload spreadsheet",
            WizardStep::Process => "Process profiles",
            WizardStep::Emails if self.app.email_draft.is_some() => "Regenerate emails",
            WizardStep::Emails => "Generate emails",
        }
    }

    fn footer(&self) -> Line<'static> {
        let spinner = SPINNER[self.spinner_frame % SPINNER.len()];
        match self.app.wizard.trigger() {
            Trigger::InFlight => Line::styled(
                format!("{spinner} Working..."),
                Style::default().fg(Color::Yellow),
            ),
            Trigger::Locked => Line::styled(
                "Disabled after a failed request",
                Style::default().fg(Color::Red),
            ),
            Trigger::Ready => {
                let key_style = if self.focused {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let mut spans = vec![
                    Span::styled("[Enter] ", key_style),
                    Span::raw(self.action_label()),
                ];
                if self.app.wizard.step() == WizardStep::Emails {
                    if self.app.sending_emails {
                        spans.push(Span::styled(
                            format!("  {spinner} Sending emails..."),
                            Style::default().fg(Color::Yellow),
                        ));
                    } else {
                        spans.push(Span::styled("  [Ctrl+S] ", key_style));
                        spans.push(Span::raw("Send emails"));
                    }
                }
                Line::from(spans)
            }
        }
    }

    fn render_description(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width;
        let heights = [
            self.form.company_name.calculate_height(width),
            self.form.description.calculate_height(width),
            self.form.ideal_profile.calculate_height(width),
        ];
        let [name, description, ideal, _] = Layout::vertical([
            Constraint::Length(heights[0]),
            Constraint::Length(heights[1]),
            Constraint::Length(heights[2]),
            Constraint::Min(0),
        ])
        .areas(area);

        let editable = self.app.wizard.can_begin();
        let focus = self.form.focus;
        let focused = self.focused;
        for (i, (field, rect)) in self
            .form
            .profile_fields()
            .into_iter()
            .zip([name, description, ideal])
            .enumerate()
        {
            field.focused = focused && focus == i;
            field.disabled = !editable;
            field.render(frame, rect);
        }
    }

    fn render_file(&mut self, frame: &mut Frame, area: Rect) {
        let mut intro = vec![Line::raw(
            "Upload the invitee spreadsheet (.xlsx, .xls or .csv). \
             Rows with a LinkedIn URL are checked against your ideal profile.",
        )];
        if let Some(reply) = &self.app.profile_reply {
            intro.push(Line::raw(""));
            intro.push(Line::styled(
                format!("Eva: {}", reply.trim()),
                Style::default().fg(Color::Blue),
            ));
        }
        let [intro_area, field_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);
        frame.render_widget(Paragraph::new(intro).wrap(Wrap { trim: true }), intro_area);

        let field = &mut self.form.spreadsheet_path;
        field.focused = self.focused;
        field.disabled = !self.app.wizard.can_begin();
        field.render(frame, field_area);
    }

    fn render_process(&self, frame: &mut Frame, area: Rect) {
        let urls = self.app.linkedin_urls();
        let mut lines = vec![
            Line::styled(
                format!("{} LinkedIn profiles ready to process", urls.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
        ];
        let room = (area.height as usize).saturating_sub(lines.len() + 1);
        let shown = urls.len().min(room);
        lines.extend(urls.iter().take(shown).map(|url| Line::raw(format!("• {url}"))));
        if urls.len() > shown {
            lines.push(Line::styled(
                format!("… and {} more", urls.len() - shown),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_emails(&mut self, frame: &mut Frame, area: Rect) {
        let clients = &self.app.clients;
        let list_height = (clients.len() as u16 + 2).min(area.height / 2).max(3);
        let [list_area, draft_area] =
            Layout::vertical([Constraint::Length(list_height), Constraint::Min(0)]).areas(area);

        let mut lines = vec![Line::styled(
            format!("{} potential clients", clients.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        for client in clients {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("• {}", client.display_name()),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!("  {}", client.match_reason()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), list_area);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().add_modifier(Modifier::DIM))
            .title("Generated emails")
            .padding(Padding::horizontal(1));
        let body = match &self.app.email_draft {
            Some(draft) => {
                let last_line = draft.lines().count().saturating_sub(1) as u16;
                self.form.draft_scroll = self.form.draft_scroll.min(last_line);
                Paragraph::new(draft.as_str())
                .wrap(Wrap { trim: false })
                    .scroll((self.form.draft_scroll, 0))
            }
            None => Paragraph::new("Press Enter to draft outreach emails for these clients.")
                .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(body.block(block), draft_area);
    }
}

impl<'a> Component for WizardPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(" Wizard ")
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [stepper, _, body, _, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new(self.stepper()), stepper);
        match self.app.wizard.step() {
            WizardStep::Description => self.render_description(frame, body),
            WizardStep::File => self.render_file(frame, body),
            WizardStep::Process => self.render_process(frame, body),
            WizardStep::Emails => self.render_emails(frame, body),
        }
        frame.render_widget(Paragraph::new(self.footer()), footer);
    }
}
