//! # TextField Component
//!
//! Bordered, labelled text input used by the connection gate, the wizard
//! forms and the chat box.
//!
//! ## Responsibilities
//!
//! - Capture text input and editing (backspace, delete, caret movement, paste)
//! - Report submission (Enter) without clearing; the parent decides
//! - Grow up to `max_lines` rows, then scroll internally to keep the caret visible
//!
//! ## State Management
//!
//! The buffer and caret are internal state. `label`, `placeholder`,
//! `max_lines` and `focused` are props set by the parent.

mod layout;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use layout::{
    VERTICAL_OVERHEAD, caret_row, caret_screen_pos, inner_width, next_char_boundary,
    next_word_boundary, prev_char_boundary, prev_word_boundary, row_count, vertical_target,
    wrap_options,
};

/// High-level events emitted by a TextField
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    /// Enter pressed with the current contents
    Submit(String),
    /// Buffer or caret changed
    Changed,
}

pub struct TextField {
    /// Text buffer (Internal State)
    buffer: String,
    /// Caret as a byte offset into `buffer`
    caret: usize,
    /// First visible wrapped row when content exceeds `max_lines`
    scroll: u16,
    /// Width of the last render, used for vertical caret movement
    last_width: u16,
    /// Block title (Prop)
    pub label: String,
    /// Dim text shown while empty (Prop)
    pub placeholder: String,
    /// Visible rows before internal scrolling (Prop)
    pub max_lines: u16,
    /// Whether the field owns the terminal caret (Prop)
    pub focused: bool,
    /// Render without accepting input (Prop)
    pub disabled: bool,
}

impl TextField {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new(label: impl Into<String>, max_lines: u16) -> Self {
        Self {
            buffer: String::new(),
            caret: 0,
            scroll: 0,
            last_width: Self::DEFAULT_WIDTH,
            label: label.into(),
            placeholder: String::new(),
            max_lines: max_lines.max(1),
            focused: false,
            disabled: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replaces the contents and moves the caret to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.caret = self.buffer.len();
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.caret = 0;
        self.scroll = 0;
    }

    /// Height for the current contents, clamped to `max_lines` rows.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = row_count(&self.buffer, inner_width(area_width));
        rows.min(self.max_lines) + VERTICAL_OVERHEAD
    }

    fn keep_caret_visible(&mut self, area_width: u16) {
        let width = inner_width(area_width);
        let total = row_count(&self.buffer, width);
        if total <= self.max_lines {
            self.scroll = 0;
            return;
        }
        let row = caret_row(&self.buffer, self.caret, width);
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + self.max_lines {
            self.scroll = row + 1 - self.max_lines;
        }
    }

    fn visible_text(&self, area_width: u16) -> String {
        let width = inner_width(area_width);
        if self.scroll == 0 || width == 0 {
            return self.buffer.clone();
        }
        let rows = textwrap::wrap(&self.buffer, wrap_options(width));
        let start = (self.scroll as usize).min(rows.len());
        let end = (start + self.max_lines as usize).min(rows.len());
        rows[start..end].join("\n")
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        let total = row_count(&self.buffer, inner_width(area.width));
        if total <= self.max_lines {
            return;
        }
        let mut state = ScrollbarState::default()
            .content_length(total.saturating_sub(self.max_lines) as usize)
            .position(self.scroll as usize);
        let track = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            track,
            &mut state,
        );
    }

    fn insert(&mut self, text: &str) -> Option<FieldEvent> {
        if self.max_lines == 1 {
            // Single-line fields flatten pasted newlines
            let flat = text.replace(['\r', '\n'], " ");
            self.buffer.insert_str(self.caret, &flat);
            self.caret += flat.len();
        } else {
            self.buffer.insert_str(self.caret, text);
            self.caret += text.len();
        }
        Some(FieldEvent::Changed)
    }

    fn move_caret(&mut self, to: usize) -> Option<FieldEvent> {
        (to != self.caret).then(|| {
            self.caret = to;
            FieldEvent::Changed
        })
    }
}

impl Component for TextField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_width = area.width;
        self.keep_caret_visible(area.width);

        let border_style = if self.disabled {
            Style::default().fg(Color::DarkGray)
        } else if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.label.as_str())
            .padding(Padding::horizontal(1));

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(self.placeholder.as_str())
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
        } else {
            Paragraph::new(self.visible_text(area.width)).style(Style::default().fg(Color::Green))
        };
        frame.render_widget(paragraph.block(block), area);
        self.render_scrollbar(frame, area);

        if self.focused && !self.disabled {
            let (x, y) = caret_screen_pos(&self.buffer, self.caret, area, self.scroll);
            // Padding pushes content one column past the border
            frame.set_cursor_position((x + 1, y));
        }
    }
}

impl EventHandler for TextField {
    type Event = FieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.disabled {
            return None;
        }
        match event {
            TuiEvent::InputChar('\n') if self.max_lines == 1 => None,
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert(c.encode_utf8(&mut tmp))
            }
            TuiEvent::Paste(text) => self.insert(text),
            TuiEvent::Backspace => {
                if self.caret == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.caret);
                self.buffer.drain(prev..self.caret);
                self.caret = prev;
                Some(FieldEvent::Changed)
            }
            TuiEvent::Delete => {
                if self.caret >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.caret);
                self.buffer.drain(self.caret..next);
                Some(FieldEvent::Changed)
            }
            TuiEvent::CursorLeft if self.caret > 0 => {
                self.move_caret(prev_char_boundary(&self.buffer, self.caret))
            }
            TuiEvent::CursorRight if self.caret < self.buffer.len() => {
                self.move_caret(next_char_boundary(&self.buffer, self.caret))
            }
            TuiEvent::WordLeft => self.move_caret(prev_word_boundary(&self.buffer, self.caret)),
            TuiEvent::WordRight => self.move_caret(next_word_boundary(&self.buffer, self.caret)),
            TuiEvent::CursorHome => {
                let start = self.buffer[..self.caret]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                self.move_caret(start)
            }
            TuiEvent::CursorEnd => {
                let end = self.buffer[self.caret..]
                    .find('\n')
                    .map(|i| self.caret + i)
                    .unwrap_or(self.buffer.len());
                self.move_caret(end)
            }
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                let direction = if matches!(event, TuiEvent::CursorUp) { -1 } else { 1 };
                let target = vertical_target(
                    &self.buffer,
                    self.caret,
                    direction,
                    inner_width(self.last_width),
                )?;
                self.move_caret(target)
            }
            TuiEvent::Submit => Some(FieldEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}
