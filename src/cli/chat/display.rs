use std::io::Write;

use color_print::cformat;
use crossterm::cursor::{MoveToColumn, MoveToPreviousLine};
use crossterm::QueueableCommand;
use crossterm::terminal::{Clear, ClearType};
use eyre::Result;

use super::conversation_state::{Message, Sender};

pub const EMPTY_TRANSCRIPT: &str = "Start a conversation...";
pub const TYPING_TEXT: &str = "Bot is typing...";

pub fn format_message(message: &Message) -> String {
    let time = message.timestamp.format("%H:%M");
    match message.sender {
        Sender::User => cformat!("<dim>[{}]</> <bold><blue>you:</></> {}", time, message.text),
        Sender::Bot => cformat!("<dim>[{}]</> <bold><green>bot:</></> {}", time, message.text),
    }
}

pub fn format_error_note(note: &str) -> String {
    cformat!("<red>{}</>", note)
}

pub fn write_message(output: &mut dyn Write, message: &Message) -> Result<()> {
    writeln!(output, "{}", format_message(message))?;
    Ok(())
}

pub fn write_transcript(output: &mut dyn Write, messages: &[Message]) -> Result<()> {
    if messages.is_empty() {
        writeln!(output, "{}", cformat!("<dim>{}</>", EMPTY_TRANSCRIPT))?;
        return Ok(());
    }

    for message in messages {
        write_message(output, message)?;
    }
    Ok(())
}

/// Draw the typing indicator on the current line without a newline.
pub fn show_typing(output: &mut dyn Write) -> Result<()> {
    write!(output, "{}", cformat!("<dim><italic>{}</></>", TYPING_TEXT))?;
    output.flush()?;
    Ok(())
}

/// Erase whatever `show_typing` drew.
pub fn hide_typing(output: &mut dyn Write) -> Result<()> {
    output
        .queue(MoveToColumn(0))?
        .queue(Clear(ClearType::CurrentLine))?
        .flush()?;
    Ok(())
}

/// Remove the line the user just typed so it can be redrawn as a
/// transcript entry.
pub fn erase_previous_line(output: &mut dyn Write) -> Result<()> {
    output
        .queue(MoveToPreviousLine(1))?
        .queue(Clear(ClearType::CurrentLine))?
        .flush()?;
    Ok(())
}
