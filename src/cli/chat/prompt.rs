use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};

/// What the user did at the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum PromptInput {
    Line(String),
    /// Ctrl-C or Ctrl-D
    Exit,
}

pub fn generate_prompt(title: &str) -> String {
    format!("{}> ", title.trim().to_lowercase())
}

pub fn rl() -> rustyline::Result<Editor<()>> {
    let config = Config::builder().history_ignore_space(true).build();
    Editor::with_config(config)
}

pub fn read_input(rl: &mut Editor<()>, prompt: &str) -> rustyline::Result<PromptInput> {
    match rl.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                rl.add_history_entry(line.as_str());
            }
            Ok(PromptInput::Line(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(PromptInput::Exit),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_uses_lowercased_title() {
        assert_eq!(generate_prompt("Sabawi Tech"), "sabawi tech> ");
        assert_eq!(generate_prompt(" Chat "), "chat> ");
    }
}
