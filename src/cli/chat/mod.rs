pub mod command;
pub mod conversation_state;
pub mod display;
pub mod prompt;
pub mod session;
pub mod widget;

use std::io::Write;
use std::process::ExitCode;

use color_print::cformat;
use command::Command;
use eyre::{Result, bail};
use prompt::{PromptInput, generate_prompt};
use session::{SessionEvent, SessionHandle};
use tracing::{error, info};
use widget::{ChatWidget, SubmitOutcome};

use crate::chat_client::{ChatBackend, ChatClient};
use crate::config::ChatConfig;

const HELP_TEXT: &str = "
/history      Show the conversation so far
/help         Show this help dialogue
/quit         Quit the application
";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    config: ChatConfig,
    /// Output is a terminal, so the typing indicator can be drawn.
    terminal: bool,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        config: ChatConfig,
        terminal: bool,
    ) -> Self {
        Self {
            output,
            input,
            config,
            terminal,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        let client = match ChatClient::new(&self.config) {
            Ok(client) => client,
            Err(e) => {
                writeln!(self.output, "Failed to initialize chat client: {}", e)?;
                return Ok(ExitCode::FAILURE);
            }
        };
        info!("Using chat endpoint {}", client.chat_url());

        match self.run_with(client).await? {
            SubmitOutcome::Failed => Ok(ExitCode::FAILURE),
            _ => Ok(ExitCode::SUCCESS),
        }
    }

    /// Run one session against `backend`. In one-shot mode the outcome of
    /// the single submission is returned; otherwise `Replied` once the user
    /// quits.
    async fn run_with<B>(&mut self, backend: B) -> Result<SubmitOutcome>
    where
        B: ChatBackend + 'static,
    {
        let mut session = session::spawn(ChatWidget::new(backend));

        // Handle non-interactive mode (single message)
        let result = match self.input.take() {
            Some(input) => self.send(&mut session, &input).await,
            None => {
                self.print_welcome()?;
                self.run_interactive(&mut session)
                    .await
                    .map(|_| SubmitOutcome::Replied)
            }
        };

        session.close().await;
        result
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "{}",
            cformat!("\n<bold>{}</>  <dim>({})</>", self.config.title, self.config.chat_url())
        )?;
        writeln!(self.output, "{}", HELP_TEXT)?;
        display::write_transcript(self.output.as_mut(), &[])?;
        Ok(())
    }

    async fn run_interactive(&mut self, session: &mut SessionHandle) -> Result<()> {
        let mut rl = prompt::rl()?;
        let prompt_text = generate_prompt(&self.config.title);

        loop {
            // The prompt is only shown again once the previous reply settled
            let line = match prompt::read_input(&mut rl, &prompt_text) {
                Ok(PromptInput::Line(line)) => line,
                Ok(PromptInput::Exit) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            };

            if !self.handle_line(session, &line).await? {
                break;
            }
        }

        Ok(())
    }

    /// Act on one line typed at the prompt. Returns `false` when the session
    /// should end.
    async fn handle_line(&mut self, session: &mut SessionHandle, line: &str) -> Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }

        let result = match Command::parse(line) {
            Command::Quit => return Ok(false),
            Command::Help => {
                writeln!(self.output, "{}", HELP_TEXT)?;
                return Ok(true);
            }
            Command::History => match session.transcript().await {
                Ok(messages) => display::write_transcript(self.output.as_mut(), &messages),
                Err(e) => Err(e),
            },
            Command::Message(text) => {
                if self.terminal {
                    // The transcript line replaces the raw echo
                    display::erase_previous_line(self.output.as_mut())?;
                }
                self.send(session, &text).await.map(|_| ())
            }
        };

        if let Err(e) = result {
            error!("Chat session failed: {}", e);
            writeln!(self.output, "Error: {}", e)?;
            return Ok(false);
        }

        Ok(true)
    }

    /// Submit `text` and render session events until it settles.
    async fn send(&mut self, session: &mut SessionHandle, text: &str) -> Result<SubmitOutcome> {
        session.submit(text).await?;

        let mut typing = false;
        while let Some(event) = session.next_event().await {
            match event {
                SessionEvent::MessageAppended(message) => {
                    if typing {
                        display::hide_typing(self.output.as_mut())?;
                        typing = false;
                    }
                    display::write_message(self.output.as_mut(), &message)?;
                }
                SessionEvent::AwaitingReply(true) => {
                    if self.terminal {
                        display::show_typing(self.output.as_mut())?;
                        typing = true;
                    }
                }
                SessionEvent::AwaitingReply(false) => {
                    if typing {
                        display::hide_typing(self.output.as_mut())?;
                        typing = false;
                    }
                }
                SessionEvent::ErrorNote(note) => {
                    writeln!(self.output, "{}", display::format_error_note(&note))?;
                }
                SessionEvent::Settled(outcome) => {
                    self.output.flush()?;
                    return Ok(outcome);
                }
            }
        }

        bail!("Chat session ended unexpectedly")
    }
}
