/// Bot commands recognised in private chats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    SetThumb,
    Cleanup,
}

impl Command {
    /// Parse `/name[@bot] [args...]`; unknown commands and plain text yield `None`
    pub fn parse(text: &str) -> Option<Self> {
        let head = text.trim_start().split_whitespace().next()?;
        let name = head.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "setthumb" => Some(Command::SetThumb),
            "cleanup" => Some(Command::Cleanup),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/setthumb"), Some(Command::SetThumb));
        assert_eq!(Command::parse("  /cleanup now"), Some(Command::Cleanup));
    }

    #[test]
    fn test_parse_bot_suffix_and_case() {
        assert_eq!(Command::parse("/SetThumb@thumb_bot"), Some(Command::SetThumb));
    }

    #[test]
    fn test_parse_rejects_other_text() {
        assert_eq!(Command::parse("start"), None);
        assert_eq!(Command::parse("/help"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/setthumbnail"), None);
    }
}
