use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{ConnectionSetup, MessageList, TitleBar, WizardPanel};
use crate::tui::{Pane, TuiState};

const GATE_HINTS: &str = "Enter connect · Ctrl+C quit";
const MAIN_HINTS: &str =
    "Tab switch focus · Enter submit · Ctrl+J newline · PgUp/PgDn scroll · Ctrl+C quit";

/// Chat takes this share of the main screen's width.
const CHAT_PERCENT: u16 = 45;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, main_area, hint_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());

    let connected = app.gate.is_connected();
    TitleBar::new(
        connected.then(|| app.wizard.step()),
        app.status_message.clone(),
        connected && tui.message_list.has_unseen_content(),
    )
    .render(frame, title_area);

    if connected {
        draw_main(frame, main_area, app, tui);
    } else {
        ConnectionSetup::new(&mut tui.connection_field, &app.gate, tui.spinner_frame)
            .render(frame, main_area);
    }

    let hints = if connected { MAIN_HINTS } else { GATE_HINTS };
    frame.render_widget(
        Paragraph::new(Line::styled(hints, Style::default().fg(Color::DarkGray))),
        hint_area,
    );
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    let [wizard_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(100 - CHAT_PERCENT),
        Constraint::Percentage(CHAT_PERCENT),
    ])
    .areas(area);

    tui.wizard_form.sync_step(app.wizard.step());
    WizardPanel::new(
        &mut tui.wizard_form,
        app,
        tui.focus == Pane::Wizard,
        tui.spinner_frame,
    )
    .render(frame, wizard_area);

    let input_height = tui.chat_input.calculate_height(chat_area.width);
    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(input_height)]).areas(chat_area);

    MessageList::new(&mut tui.message_list, &app.chat, tui.spinner_frame)
        .render(frame, messages_area);

    tui.chat_input.focused = tui.focus == Pane::Chat;
    tui.chat_input.render(frame, input_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(app: &App, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_gate_is_shown_until_connected() {
        let app = test_app();
        let mut tui = TuiState::new(None);
        let text = render(&app, &mut tui);
        assert!(text.contains("Connect to Azure"));
        assert!(!text.contains("Wizard"));
    }

    #[test]
    fn test_main_screen_after_connection() {
        let mut app = test_app();
        update(&mut app, Action::ConnectionStatusChecked(true));
        let mut tui = TuiState::new(None);
        let text = render(&app, &mut tui);
        assert!(text.contains("Wizard"));
        assert!(text.contains("Step 1/4: Company"));
        assert!(text.contains("Hi! I'm Eva."));
        assert!(text.contains("Message Eva"));
    }
}
