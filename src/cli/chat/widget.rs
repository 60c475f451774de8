use tracing::{debug, warn};

use super::conversation_state::{ConversationState, Message};
use crate::chat_client::{ChatBackend, ReplyError};

/// Shown inline under the transcript after a failed fetch.
pub const ERROR_NOTE: &str = "Failed to get response. Please try again.";

/// Appended as the bot's turn when the reply could not be fetched.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting. Please check if the backend is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input or a reply is still pending; nothing was appended.
    Ignored,
    Replied,
    Failed,
}

/// A started submission cycle: the user's turn is in the transcript and the
/// widget is waiting for the backend.
#[derive(Debug, Clone)]
pub struct Submission {
    pub text: String,
    pub user_message: Message,
}

/// Conversation state plus the backend it talks to.
pub struct ChatWidget<B> {
    state: ConversationState,
    backend: B,
}

impl<B: ChatBackend> ChatWidget<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: ConversationState::new(),
            backend,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn set_input(&mut self, text: &str) {
        self.state.set_pending_input(text);
    }

    /// Submit `text` and wait for the bot's turn.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        self.set_input(text);

        let Some(submission) = self.begin_submit() else {
            return SubmitOutcome::Ignored;
        };

        let result = self.backend.fetch_reply(&submission.text).await;
        let (outcome, _) = self.settle(result);
        outcome
    }

    /// Move the pending input into the transcript and enter the sending
    /// state. Returns `None` when there is nothing to send or a reply is
    /// still outstanding.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.state.is_awaiting_reply() {
            warn!("Submission refused while a reply is pending");
            return None;
        }

        let text = self.state.pending_input().trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.state.take_pending_input();
        self.state.set_last_error(None);
        let user_message = self.state.add_user_message(&text).clone();
        self.state.set_awaiting_reply(true);

        debug!("Submitting message {}", user_message.id);

        Some(Submission { text, user_message })
    }

    /// Record the result of the remote call as the bot's turn and leave the
    /// sending state.
    pub fn settle(&mut self, result: Result<String, ReplyError>) -> (SubmitOutcome, Message) {
        let (outcome, bot_message) = match result {
            Ok(reply) => (
                SubmitOutcome::Replied,
                self.state.add_bot_message(&reply).clone(),
            ),
            Err(e) => {
                debug!("Falling back after failed fetch: {}", e);
                self.state.set_last_error(Some(ERROR_NOTE.to_string()));
                (
                    SubmitOutcome::Failed,
                    self.state.add_bot_message(FALLBACK_REPLY).clone(),
                )
            }
        };
        self.state.set_awaiting_reply(false);

        (outcome, bot_message)
    }
}


#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::testing::ScriptedBackend;
    use super::*;
    use crate::cli::chat::conversation_state::Sender;

    fn transcript<B: ChatBackend>(widget: &ChatWidget<B>) -> Vec<(Sender, String)> {
        widget
            .state()
            .messages()
            .iter()
            .map(|m| (m.sender, m.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn successful_reply_follows_user_message() {
        let backend = ScriptedBackend::new().reply("Hello!");
        let mut widget = ChatWidget::new(backend.clone());

        let outcome = widget.submit("Hi").await;

        assert_eq!(outcome, SubmitOutcome::Replied);
        assert_eq!(
            transcript(&widget),
            vec![
                (Sender::User, "Hi".to_string()),
                (Sender::Bot, "Hello!".to_string())
            ]
        );
        assert_eq!(widget.state().last_error(), None);
        assert!(!widget.state().is_awaiting_reply());
        assert_eq!(backend.sent(), vec!["Hi"]);
    }

    #[tokio::test]
    async fn failure_appends_fallback_and_sets_error_note() {
        let backend = ScriptedBackend::new().fail(StatusCode::INTERNAL_SERVER_ERROR);
        let mut widget = ChatWidget::new(backend);

        let outcome = widget.submit("Hi").await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(
            transcript(&widget),
            vec![
                (Sender::User, "Hi".to_string()),
                (Sender::Bot, FALLBACK_REPLY.to_string())
            ]
        );
        assert_eq!(widget.state().last_error(), Some(ERROR_NOTE));
        assert!(!widget.state().is_awaiting_reply());
    }

    #[tokio::test]
    async fn blank_input_is_ignored_without_network_call() {
        let backend = ScriptedBackend::new();
        let mut widget = ChatWidget::new(backend.clone());

        for blank in ["", "   ", "\n\t "] {
            assert_eq!(widget.submit(blank).await, SubmitOutcome::Ignored);
        }

        assert!(widget.state().messages().is_empty());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn input_is_trimmed_before_sending() {
        let backend = ScriptedBackend::new().reply("ok");
        let mut widget = ChatWidget::new(backend.clone());

        widget.submit("   Hi there  ").await;

        assert_eq!(widget.state().messages()[0].text, "Hi there");
        assert_eq!(backend.sent(), vec!["Hi there"]);
        assert_eq!(widget.state().pending_input(), "");
    }

    #[test]
    fn awaiting_reply_spans_begin_to_settle() {
        let mut widget = ChatWidget::new(ScriptedBackend::new());
        assert!(!widget.state().is_awaiting_reply());

        widget.set_input("Hi");
        let submission = widget.begin_submit().unwrap();
        assert_eq!(submission.text, "Hi");
        assert!(widget.state().is_awaiting_reply());
        assert_eq!(widget.state().messages().len(), 1);

        let (outcome, bot) = widget.settle(Ok("Hello!".to_string()));
        assert_eq!(outcome, SubmitOutcome::Replied);
        assert_eq!(bot.sender, Sender::Bot);
        assert!(!widget.state().is_awaiting_reply());
    }

    #[test]
    fn second_submission_refused_while_awaiting_reply() {
        let mut widget = ChatWidget::new(ScriptedBackend::new());

        widget.set_input("first");
        widget.begin_submit().unwrap();

        widget.set_input("second");
        assert!(widget.begin_submit().is_none());
        assert_eq!(widget.state().messages().len(), 1);
        // Refused input stays in the input box
        assert_eq!(widget.state().pending_input(), "second");
    }

    #[tokio::test]
    async fn next_submission_clears_previous_error() {
        let backend = ScriptedBackend::new()
            .fail(StatusCode::BAD_GATEWAY)
            .reply("back online");
        let mut widget = ChatWidget::new(backend);

        widget.submit("one").await;
        assert_eq!(widget.state().last_error(), Some(ERROR_NOTE));

        widget.set_input("two");
        widget.begin_submit().unwrap();
        assert_eq!(widget.state().last_error(), None);
    }

    #[tokio::test]
    async fn every_user_message_gets_exactly_one_bot_message() {
        let backend = ScriptedBackend::new()
            .reply("a")
            .fail(StatusCode::SERVICE_UNAVAILABLE)
            .reply("c");
        let mut widget = ChatWidget::new(backend);

        for text in ["1", "", "2", "3"] {
            widget.submit(text).await;
        }

        let senders: Vec<Sender> = widget.state().messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![
                Sender::User,
                Sender::Bot,
                Sender::User,
                Sender::Bot,
                Sender::User,
                Sender::Bot
            ]
        );

        let ids: Vec<u64> = widget.state().messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
