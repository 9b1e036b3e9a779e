//! # MessageList Component
//!
//! Scrollable view of the chat log, oldest first.
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `ChatLog` (props).
//! Message heights are cached per width and keyed by message id; a
//! message's text never changes, so only messages after the first id
//! mismatch need measuring (a reply lands right after its question, which
//! may be mid-log). Delivery status only changes styling.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::chat::{ChatLog, ChatMessage};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{Message, TYPING_HEIGHT, TypingBubble};
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Total canvas height from the last render
    pub content_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
            content_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never passes the last message.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Whether there is content below the viewport the user hasn't seen.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }
}

/// Scrollable chat view.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub chat: &'a ChatLog,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, chat: &'a ChatLog, spinner_frame: usize) -> Self {
        Self {
            state,
            chat,
            spinner_frame,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let messages = self.chat.messages();

        // 1. Measure anything not already cached
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(messages, content_width);
        layout.heights.truncate(reusable);
        for msg in messages.iter().skip(layout.heights.len()) {
            layout.heights.push(Message::calculate_height(msg, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(messages, content_width);

        let messages_height = layout.total_height();
        let typing = self.chat.is_typing();
        let canvas_height =
            messages_height.saturating_add(if typing { TYPING_HEIGHT } else { 0 });

        // 2. Clamp before computing the visible range
        self.state.viewport_height = area.height;
        self.state.content_height = canvas_height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render only what is near the viewport
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = if visible.start > 0 {
            self.state.layout.prefix_heights[visible.start - 1]
        } else {
            0
        };
        for i in visible {
            let height = self.state.layout.heights[i];
            scroll_view.render_widget(
                Message::new(&messages[i]),
                Rect::new(0, y, content_width, height),
            );
            y = y.saturating_add(height);
        }

        if typing {
            scroll_view.render_widget(
                TypingBubble {
                    frame: self.spinner_frame,
                },
                Rect::new(0, messages_height, content_width, TYPING_HEIGHT),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Implemented on the state because the transient `MessageList` is rebuilt
/// every frame and cannot hold the scroll position.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown | TuiEvent::CursorDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached message heights for one content width.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    /// Ids of the measured messages, in log order
    ids: Vec<u64>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            ids: Vec::new(),
            content_width: 0,
        }
    }

    /// Number of leading cached heights still valid: the run of messages
    /// whose ids match what was measured last frame.
    pub fn reusable_count(&self, messages: &[ChatMessage], content_width: u16) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        self.ids
            .iter()
            .zip(messages)
            .take_while(|(id, msg)| **id == msg.id)
            .count()
            .min(self.heights.len())
    }

    pub fn update_metadata(&mut self, messages: &[ChatMessage], content_width: u16) {
        self.ids = messages.iter().map(|m| m.id).collect();
        self.content_width = content_width;
    }

    /// Saturates at `u16::MAX` rows.
    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.heights
            .iter()
            .fold(0u16, |acc, &h| acc.saturating_add(h))
    }

    /// Indices of messages within half a viewport of the visible window.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let top = scroll_offset.saturating_sub(buffer);
        let bottom = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self.prefix_heights.partition_point(|&end| end <= top);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < bottom)
            .saturating_add(1)
            .min(self.prefix_heights.len());
        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(state: &mut MessageListState, chat: &ChatLog, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| MessageList::new(state, chat, 0).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut chat = ChatLog::with_greeting("hi");
        let ticket = chat.begin_send("q1".to_string());
        let mut cache = LayoutCache::new();
        cache.heights = vec![3; 2];
        cache.update_metadata(chat.messages(), 80);

        assert_eq!(cache.reusable_count(chat.messages(), 80), 2);
        // New message appended: all cached heights still valid
        chat.begin_send("q2".to_string());
        assert_eq!(cache.reusable_count(chat.messages(), 80), 2);
        // Width changed: everything re-measured
        assert_eq!(cache.reusable_count(chat.messages(), 40), 0);

        // Reply inserted after q1: only the greeting and q1 survive
        cache.heights = vec![3; 3];
        cache.update_metadata(chat.messages(), 80);
        chat.confirm(ticket, "a1".to_string());
        assert_eq!(cache.reusable_count(chat.messages(), 80), 2);
        assert_eq!(cache.reusable_count(&[], 80), 0);
    }

    #[test]
    fn test_heights_saturate_instead_of_overflowing() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![u16::MAX / 2; 4];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.total_height(), u16::MAX);
        assert_eq!(*cache.prefix_heights.last().unwrap(), u16::MAX);
        // Prefix sums stay monotonic
        assert!(cache.prefix_heights.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_inserted_reply_renders_below_its_question() {
        let mut chat = ChatLog::new();
        let first = chat.begin_send("question one".to_string());
        let second = chat.begin_send("question two".to_string());
        let mut state = MessageListState::new();
        render(&mut state, &chat, 50, 40);

        chat.confirm(second, "answer two".to_string());
        chat.confirm(first, "answer one".to_string());
        let text = render(&mut state, &chat, 50, 40);

        let pos = |needle: &str| text.find(needle).unwrap();
        assert!(pos("question one") < pos("answer one"));
        assert!(pos("answer one") < pos("question two"));
        assert!(pos("question two") < pos("answer two"));
        assert_eq!(state.layout.heights.len(), 4);
    }

    #[test]
    fn test_visible_range() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![10; 10];
        cache.rebuild_prefix_heights();
        // Viewport 20 rows at offset 50, buffered by 10 either side: rows 40..80 → messages 4..8
        assert_eq!(cache.visible_range(50, 20), 4..8);
        assert_eq!(cache.visible_range(0, 20), 0..3);
    }

    #[test]
    fn test_visible_range_empty() {
        let cache = LayoutCache::new();
        assert_eq!(cache.visible_range(0, 20), 0..0);
    }

    #[test]
    fn test_renders_messages_and_typing_bubble() {
        let mut chat = ChatLog::with_greeting("Hi! I'm Eva.");
        chat.begin_send("hello".to_string());
        let mut state = MessageListState::new();

        let text = render(&mut state, &chat, 50, 20);
        assert!(text.contains("Hi! I'm Eva."));
        assert!(text.contains("hello"));
        assert!(text.contains("eva is typing"));
    }

    #[test]
    fn test_scroll_up_unpins_and_scroll_down_repins() {
        let mut chat = ChatLog::new();
        for i in 0..20 {
            let t = chat.begin_send(format!("message {i}"));
            chat.confirm(t, format!("reply {i}"));
        }
        let mut state = MessageListState::new();
        render(&mut state, &chat, 40, 10);
        assert!(!state.has_unseen_content());

        state.handle_event(&TuiEvent::ScrollPageUp);
        assert!(!state.stick_to_bottom);
        assert!(state.has_unseen_content());

        for _ in 0..200 {
            state.handle_event(&TuiEvent::ScrollDown);
        }
        assert!(state.stick_to_bottom);
    }
}
