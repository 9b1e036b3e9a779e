//! # ConnectionSetup Component
//!
//! Full-screen gate shown until the backend holds a working Azure
//! connection string. One field, a submit hint and an error line.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - the `TextField` lives in `TuiState`
//! - `ConnectionSetup` is created each frame with the borrowed field and gate

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::core::gate::{ConnectionGate, GatePhase};
use crate::tui::component::Component;
use crate::tui::components::text_field::TextField;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

const INTRO: &str = "Eva needs access to your Azure AI project before she can help. \
    Paste the project connection string below.";

pub struct ConnectionSetup<'a> {
    pub field: &'a mut TextField,
    pub gate: &'a ConnectionGate,
    pub spinner_frame: usize,
}

impl<'a> ConnectionSetup<'a> {
    pub fn new(field: &'a mut TextField, gate: &'a ConnectionGate, spinner_frame: usize) -> Self {
        Self {
            field,
            gate,
            spinner_frame,
        }
    }

    fn status_line(&self) -> Line<'static> {
        let spinner = SPINNER[self.spinner_frame % SPINNER.len()];
        match (&self.gate.phase, &self.gate.error) {
            (GatePhase::Testing, _) => Line::styled(
                format!("{spinner} Testing connection..."),
                Style::default().fg(Color::Yellow),
            ),
            (GatePhase::Saving, _) => Line::styled(
                format!("{spinner} Saving connection..."),
                Style::default().fg(Color::Yellow),
            ),
            (_, Some(error)) => Line::styled(
                error.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            _ => Line::styled(
                "Enter to connect · Ctrl+C to quit",
                Style::default().fg(Color::DarkGray),
            ),
        }
    }
}

impl<'a> Component for ConnectionSetup<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(4).clamp(20, 72);
        let [column] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(area);
        let [panel] = Layout::vertical([Constraint::Length(11)])
            .flex(Flex::Center)
            .areas(column);

        frame.render_widget(Clear, panel);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Connect to Azure ")
            .padding(Padding::horizontal(1));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let [intro_area, _, field_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(INTRO).wrap(Wrap { trim: true }),
            intro_area,
        );

        self.field.focused = true;
        self.field.disabled = self.gate.is_busy();
        self.field.render(frame, field_area);

        frame.render_widget(
            Paragraph::new(self.status_line()).wrap(Wrap { trim: true }),
            status_area,
        );
    }
}
