use ratatui::Frame;
use ratatui::layout::Rect;

/// A piece of the Evagent screen that draws itself into a `Rect`.
///
/// Props come in as struct fields; persistent presentation state (scroll
/// offsets, layout caches, text buffers) is reached through `&mut self`,
/// in the spirit of ratatui's `StatefulWidget`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns low-level `TuiEvent`s into component-level events.
pub trait EventHandler {
    /// The high-level event this component emits.
    type Event;

    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
