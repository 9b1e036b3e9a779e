//! # TitleBar Component
//!
//! Top status line: app name, wizard progress, status message and a
//! "↓ New" marker when the chat has unseen messages below the scroll.
//!
//! Stateless and props-driven; rendered as a single `Span`:
//!
//! ```text
//! Evagent | Step 2/4: Invitees | Loaded 12 LinkedIn URLs | ↓ New
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

use crate::core::wizard::WizardStep;
use crate::tui::component::Component;

pub struct TitleBar {
    /// `None` while the connection gate is showing
    pub step: Option<WizardStep>,
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(step: Option<WizardStep>, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            step,
            status_message,
            has_unseen_content,
        }
    }

    fn text(&self) -> String {
        let mut parts = vec!["Evagent".to_string()];
        match self.step {
            Some(step) => parts.push(format!(
                "Step {}/{}: {}",
                step.index() + 1,
                WizardStep::ALL.len(),
                step.label()
            )),
            None => parts.push("Connection setup".to_string()),
        }
        if !self.status_message.is_empty() {
            parts.push(self.status_message.clone());
        }
        if self.has_unseen_content {
            parts.push("↓ New".to_string());
        }
        parts.join(" | ")
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Span::raw(self.text()), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(title_bar: &mut TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_shows_step_and_status() {
        let mut title_bar = TitleBar::new(
            Some(WizardStep::File),
            "Uploading guests.xlsx...".to_string(),
            false,
        );
        let text = render(&mut title_bar);
        assert!(text.contains("Evagent"));
        assert!(text.contains("Step 2/4: Invitees"));
        assert!(text.contains("Uploading guests.xlsx..."));
        assert!(!text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_gate_and_unseen() {
        let mut title_bar = TitleBar::new(None, String::new(), true);
        let text = render(&mut title_bar);
        assert!(text.contains("Connection setup"));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_empty_status_has_no_trailing_separator() {
        let title_bar = TitleBar::new(Some(WizardStep::Description), String::new(), false);
        assert_eq!(title_bar.text(), "Evagent | Step 1/4: Company");
    }
}
