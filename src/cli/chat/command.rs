/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    History,
    Quit,
    /// Anything else goes to the chat service.
    Message(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/help" => Command::Help,
            "/history" => Command::History,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Message(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_commands() {
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("  /history "), Command::History);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
    }

    #[test]
    fn everything_else_is_a_message() {
        assert_eq!(
            Command::parse("hello there"),
            Command::Message("hello there".to_string())
        );
        // Unknown commands are sent as-is
        assert_eq!(
            Command::parse("/weather"),
            Command::Message("/weather".to_string())
        );
    }
}
