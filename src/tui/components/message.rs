use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::chat::{ChatMessage, Delivery, Sender};
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Borders (1 left + 1 right) plus padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Height of the typing bubble: one line of dots inside borders.
pub const TYPING_HEIGHT: u16 = 1 + VERTICAL_OVERHEAD;

const TYPING_FRAMES: [&str; 4] = ["   ", ".  ", ".. ", "..."];

/// A single chat bubble.
///
/// Transient: built each frame from a borrowed `ChatMessage`. User messages
/// are green, Eva's are blue. A pending send is dimmed and a failed one gets
/// a red border with "not delivered" in the title.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage) -> Self {
        Self { message }
    }

    /// Predicts the rendered height without rendering.
    ///
    /// Wrap options mirror `Paragraph`'s word wrapping so the scroll canvas
    /// can be sized before anything is drawn.
    pub fn calculate_height(message: &ChatMessage, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }

        let content = message.text.trim();
        if content.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);
        (textwrap::wrap(content, options).len() as u16).max(1) + VERTICAL_OVERHEAD
    }

    fn title(&self) -> String {
        let who = match self.message.sender {
            Sender::User => "you",
            Sender::Bot => "eva",
        };
        match self.message.delivery {
            Delivery::Confirmed => format!("{} · {}", who, self.message.timestamp),
            Delivery::Pending => format!("{} · {} · sending", who, self.message.timestamp),
            Delivery::Failed => format!("{} · {} · not delivered", who, self.message.timestamp),
        }
    }
}

pub(crate) fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Green),
        Sender::Bot => Style::default().fg(Color::Blue),
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = sender_style(self.message.sender);
        let (text_style, border_style) = match self.message.delivery {
            Delivery::Confirmed => (style, style.add_modifier(Modifier::DIM)),
            Delivery::Pending => (
                style.add_modifier(Modifier::DIM),
                style.add_modifier(Modifier::DIM),
            ),
            Delivery::Failed => (style, Style::default().fg(Color::Red)),
        };

        let block = Block::bordered()
            .title(self.title())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.message.text.trim())
            .style(text_style)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

/// Placeholder bubble shown while Eva's reply is outstanding.
#[derive(Clone, Copy)]
pub struct TypingBubble {
    pub frame: usize,
}

impl Widget for TypingBubble {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = sender_style(Sender::Bot).add_modifier(Modifier::DIM);
        let block = Block::bordered()
            .title("eva is typing")
            .border_type(BorderType::Rounded)
            .border_style(style)
            .title_style(style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(TYPING_FRAMES[self.frame % TYPING_FRAMES.len()])
            .style(style)
            .render(inner, buf);
    }
}
