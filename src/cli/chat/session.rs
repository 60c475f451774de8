//! Runs a [`ChatWidget`] on its own task. Commands are handled one at a time
//! in arrival order, so only one reply is ever outstanding per session.

use eyre::{Result, eyre};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::conversation_state::Message;
use super::widget::{ChatWidget, SubmitOutcome};
use crate::chat_client::ChatBackend;

const COMMAND_BUFFER: usize = 8;

#[derive(Debug)]
pub enum SessionCommand {
    Submit(String),
    Transcript(oneshot::Sender<Vec<Message>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MessageAppended(Message),
    AwaitingReply(bool),
    ErrorNote(String),
    /// Always the last event of a submission, including ignored ones.
    Settled(SubmitOutcome),
}

pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub async fn submit(&self, text: &str) -> Result<()> {
        self.commands
            .send(SessionCommand::Submit(text.to_string()))
            .await
            .map_err(|_| eyre!("Chat session has ended"))
    }

    pub async fn transcript(&self) -> Result<Vec<Message>> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Transcript(tx))
            .await
            .map_err(|_| eyre!("Chat session has ended"))?;
        rx.await.map_err(|_| eyre!("Chat session has ended"))
    }

    /// Next event from the session, or `None` once it has shut down.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// End the session and wait for its task to finish.
    pub async fn close(self) {
        let Self {
            commands,
            events,
            task,
        } = self;
        drop(commands);
        drop(events);
        if let Err(e) = task.await {
            error!("Chat session task failed: {}", e);
        }
    }
}

/// Start a session task that owns `widget` until every handle is dropped.
pub fn spawn<B>(widget: ChatWidget<B>) -> SessionHandle
where
    B: ChatBackend + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(run(widget, command_rx, event_tx));

    SessionHandle {
        commands: command_tx,
        events: event_rx,
        task,
    }
}

async fn run<B: ChatBackend>(
    mut widget: ChatWidget<B>,
    mut commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    debug!("Chat session started");

    while let Some(command) = commands.recv().await {
        match command {
            SessionCommand::Submit(text) => {
                handle_submit(&mut widget, &text, &events).await;
            }
            SessionCommand::Transcript(reply) => {
                let _ = reply.send(widget.state().messages().to_vec());
            }
        }
    }

    debug!(
        "Chat session ended with {} messages",
        widget.state().messages().len()
    );
}

async fn handle_submit<B: ChatBackend>(
    widget: &mut ChatWidget<B>,
    text: &str,
    events: &mpsc::UnboundedSender<SessionEvent>,
) {
    // A closed event channel only means nobody is rendering any more
    let emit = |event: SessionEvent| {
        let _ = events.send(event);
    };

    widget.set_input(text);
    let Some(submission) = widget.begin_submit() else {
        emit(SessionEvent::Settled(SubmitOutcome::Ignored));
        return;
    };

    emit(SessionEvent::MessageAppended(submission.user_message));
    emit(SessionEvent::AwaitingReply(true));

    let result = widget.backend().fetch_reply(&submission.text).await;
    let (outcome, bot_message) = widget.settle(result);

    emit(SessionEvent::MessageAppended(bot_message));
    if let Some(note) = widget.state().last_error() {
        emit(SessionEvent::ErrorNote(note.to_string()));
    }
    emit(SessionEvent::AwaitingReply(false));
    emit(SessionEvent::Settled(outcome));
}
