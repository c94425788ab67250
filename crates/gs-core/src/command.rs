//! Operator commands typed into the chat input
//!
//! Staff can drive the kiosk from the customer's chat box: a command word
//! entered on its own is taken out of the input before it is sent.

use serde::{Deserialize, Serialize};

/// Action requested from the chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorCommand {
    /// Abandon the conversation and show the idle screen
    Reset,
    /// Print a random sample receipt
    TestPrint,
}

impl OperatorCommand {
    pub const ALL: [OperatorCommand; 2] = [OperatorCommand::Reset, OperatorCommand::TestPrint];

    /// Word typed into the chat input
    pub fn word(&self) -> &'static str {
        match self {
            OperatorCommand::Reset => "종료",
            OperatorCommand::TestPrint => "출력테스트",
        }
    }

    /// Exact command word, surrounding whitespace ignored
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL.into_iter().find(|command| command.word() == input)
    }
}

impl std::fmt::Display for OperatorCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatorCommand::Reset => write!(f, "reset"),
            OperatorCommand::TestPrint => write!(f, "test print"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_words() {
        assert_eq!(OperatorCommand::parse("종료"), Some(OperatorCommand::Reset));
        assert_eq!(
            OperatorCommand::parse("  출력테스트\n"),
            Some(OperatorCommand::TestPrint)
        );
    }

    #[test]
    fn test_parse_rejects_other_input() {
        assert_eq!(OperatorCommand::parse(""), None);
        assert_eq!(OperatorCommand::parse("종료 해주세요"), None);
        assert_eq!(OperatorCommand::parse("latte for Mina"), None);
    }
}
