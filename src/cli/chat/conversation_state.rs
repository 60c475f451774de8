use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A single transcript entry. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

/// In-memory state of one chat session.
#[derive(Debug)]
pub struct ConversationState {
    messages: Vec<Message>,
    next_id: u64,
    pending_input: String,
    awaiting_reply: bool,
    last_error: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            pending_input: String::new(),
            awaiting_reply: false,
            last_error: None,
        }
    }

    pub fn add_user_message(&mut self, text: &str) -> &Message {
        self.push(Sender::User, text)
    }

    pub fn add_bot_message(&mut self, text: &str) -> &Message {
        self.push(Sender::Bot, text)
    }

    fn push(&mut self, sender: Sender, text: &str) -> &Message {
        let message = Message {
            id: self.next_id,
            text: text.to_string(),
            sender,
            timestamp: Local::now(),
        };
        self.next_id += 1;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn set_pending_input(&mut self, text: &str) {
        self.pending_input = text.to_string();
    }

    pub fn take_pending_input(&mut self) -> String {
        std::mem::take(&mut self.pending_input)
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn set_awaiting_reply(&mut self, awaiting: bool) {
        self.awaiting_reply = awaiting;
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
