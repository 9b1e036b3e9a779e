//! # Chat Log
//!
//! Conversation with the agent, oldest first.
//!
//! Sending is a two-phase commit: the user's message is appended as
//! `Pending` right away, then marked `Confirmed` (and the bot reply placed
//! directly after it) or `Failed` once the backend answers. Nothing is ever
//! removed or reordered, so overlapping sends still read as question/answer
//! pairs.
//!
//! The typing indicator is tied to a ticket (the id of the message that
//! raised it) so a late timer for an older send cannot clear a newer one.

use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    /// Local wall-clock time, `HH:MM`.
    pub timestamp: String,
    pub delivery: Delivery,
}

/// Local time formatted the way chat bubbles show it.
pub fn local_timestamp() -> String {
    Local::now().format("%H:%M").to_string()
}

#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
    typing: Option<u64>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the log with a bot greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        let mut log = Self::new();
        if !greeting.trim().is_empty() {
            log.push(greeting.to_string(), Sender::Bot, Delivery::Confirmed);
        }
        log
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    /// Appends a pending user message and raises the typing indicator.
    /// Returns the ticket identifying this send.
    pub fn begin_send(&mut self, text: String) -> u64 {
        let id = self.push(text, Sender::User, Delivery::Pending);
        self.typing = Some(id);
        id
    }

    /// Confirms the send and inserts the bot's reply right after it.
    /// Returns false for an unknown or already settled ticket.
    pub fn confirm(&mut self, ticket: u64, reply: String) -> bool {
        let Some(index) = self.settle(ticket, Delivery::Confirmed) else {
            return false;
        };
        let message = self.new_message(reply, Sender::Bot, Delivery::Confirmed);
        self.messages.insert(index + 1, message);
        true
    }

    /// Marks the send as failed. No bot message is added.
    pub fn fail(&mut self, ticket: u64) -> bool {
        self.settle(ticket, Delivery::Failed).is_some()
    }

    /// Clears the indicator if it still belongs to `ticket`.
    pub fn typing_elapsed(&mut self, ticket: u64) {
        if self.typing == Some(ticket) {
            self.typing = None;
        }
    }

    /// Settles a pending user message. Returns its position in the log.
    fn settle(&mut self, ticket: u64, outcome: Delivery) -> Option<usize> {
        let index = self
            .messages
            .iter()
            .position(|m| m.id == ticket && m.sender == Sender::User)?;
        let msg = &mut self.messages[index];
        if msg.delivery != Delivery::Pending {
            return None;
        }
        msg.delivery = outcome;
        if self.typing == Some(ticket) {
            self.typing = None;
        }
        Some(index)
    }

    fn new_message(&mut self, text: String, sender: Sender, delivery: Delivery) -> ChatMessage {
        let id = self.next_id;
        self.next_id += 1;
        ChatMessage {
            id,
            text,
            sender,
            timestamp: local_timestamp(),
            delivery,
        }
    }

    fn push(&mut self, text: String, sender: Sender, delivery: Delivery) -> u64 {
        let message = self.new_message(text, sender, delivery);
        let id = message.id;
        self.messages.push(message);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_is_first_bot_message() {
        let log = ChatLog::with_greeting("Hi! I'm Eva.");
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].sender, Sender::Bot);
        assert_eq!(log.messages()[0].delivery, Delivery::Confirmed);
        assert!(!log.is_typing());
    }

    #[test]
    fn test_blank_greeting_is_skipped() {
        assert!(ChatLog::with_greeting("  ").is_empty());
    }

    #[test]
    fn test_begin_send_is_optimistic() {
        let mut log = ChatLog::new();
        let ticket = log.begin_send("hello".to_string());
        let msg = log.get(ticket).unwrap();
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.delivery, Delivery::Pending);
        assert!(log.is_typing());
    }

    #[test]
    fn test_confirm_appends_reply_after_user_message() {
        let mut log = ChatLog::with_greeting("hi");
        let ticket = log.begin_send("hello".to_string());
        assert!(log.confirm(ticket, "hello back".to_string()));

        let msgs = log.messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1].delivery, Delivery::Confirmed);
        assert_eq!(msgs[2].sender, Sender::Bot);
        assert_eq!(msgs[2].text, "hello back");
        assert!(!log.is_typing());
    }

    #[test]
    fn test_log_grows_by_two_per_successful_exchange() {
        let mut log = ChatLog::with_greeting("hi");
        let initial = log.len();
        for n in 0..5 {
            let ticket = log.begin_send(format!("q{n}"));
            log.confirm(ticket, format!("a{n}"));
        }
        assert_eq!(log.len(), initial + 10);

        // Every user message is immediately followed by its reply
        for n in 0..5 {
            let user = &log.messages()[initial + n * 2];
            let bot = &log.messages()[initial + n * 2 + 1];
            assert_eq!(user.text, format!("q{n}"));
            assert_eq!(bot.text, format!("a{n}"));
        }
    }

    #[test]
    fn test_overlapping_sends_keep_replies_next_to_questions() {
        let mut log = ChatLog::with_greeting("hi");
        let first = log.begin_send("q1".to_string());
        let second = log.begin_send("q2".to_string());
        assert!(log.confirm(first, "a1".to_string()));
        assert!(log.confirm(second, "a2".to_string()));

        let texts: Vec<(&str, Sender)> = log
            .messages()
            .iter()
            .map(|m| (m.text.as_str(), m.sender))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("hi", Sender::Bot),
                ("q1", Sender::User),
                ("a1", Sender::Bot),
                ("q2", Sender::User),
                ("a2", Sender::Bot),
            ]
        );
    }

    #[test]
    fn test_out_of_order_replies_land_after_their_questions() {
        let mut log = ChatLog::new();
        let first = log.begin_send("q1".to_string());
        let second = log.begin_send("q2".to_string());
        assert!(log.confirm(second, "a2".to_string()));
        assert!(log.confirm(first, "a1".to_string()));

        let texts: Vec<&str> = log.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["q1", "a1", "q2", "a2"]);
        // Ids stay unique even though replies were inserted mid-log
        let mut ids: Vec<u64> = log.messages().iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_fail_marks_message_and_appends_nothing() {
        let mut log = ChatLog::new();
        let ticket = log.begin_send("hello".to_string());
        assert!(log.fail(ticket));
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(ticket).unwrap().delivery, Delivery::Failed);
        assert!(!log.is_typing());
    }

    #[test]
    fn test_settled_ticket_cannot_settle_again() {
        let mut log = ChatLog::new();
        let ticket = log.begin_send("hello".to_string());
        assert!(log.fail(ticket));
        assert!(!log.confirm(ticket, "late reply".to_string()));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_unknown_ticket_is_ignored() {
        let mut log = ChatLog::with_greeting("hi");
        // id 0 is the greeting, which is a bot message
        assert!(!log.confirm(0, "x".to_string()));
        assert!(!log.fail(42));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_typing_timer_clears_indicator_before_reply() {
        let mut log = ChatLog::new();
        let ticket = log.begin_send("hello".to_string());
        log.typing_elapsed(ticket);
        assert!(!log.is_typing());
        // Reply still lands after the indicator went away
        assert!(log.confirm(ticket, "reply".to_string()));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_stale_typing_timer_keeps_newer_indicator() {
        let mut log = ChatLog::new();
        let first = log.begin_send("one".to_string());
        let second = log.begin_send("two".to_string());
        log.typing_elapsed(first);
        assert!(log.is_typing());
        log.typing_elapsed(second);
        assert!(!log.is_typing());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = local_timestamp();
        assert_eq!(ts.len(), 5);
        assert_eq!(&ts[2..3], ":");
    }
}
