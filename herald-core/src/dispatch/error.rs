use std::fmt::Display;

use crate::command::errors::{ErrorSeverity, GetErrorSeverity};

/// An error before any command was identified. All of these are part of
/// normal traffic (most messages are not commands) and stay silent towards
/// the user.
#[derive(Debug)]
pub enum PreParseError {
    /// Invocating user is a bot or webhook.
    UserIsBot(u64),
    /// Message does not start with any configured prefix.
    MessageNotPrefixed,
    /// A prefix with nothing after it.
    EmptyCommand,
}

impl Display for PreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserIsBot(id) => write!(f, "user {id} is a bot or webhook"),
            Self::MessageNotPrefixed => f.write_str("message does not start with a known prefix"),
            Self::EmptyCommand => f.write_str("no command name follows the prefix"),
        }
    }
}
impl std::error::Error for PreParseError {}

impl GetErrorSeverity for PreParseError {
    fn get_severity(&self) -> ErrorSeverity {
        ErrorSeverity::Low
    }
}

#[derive(Debug)]
pub enum ParseError {
    /// Failure with preprocessing of the message.
    PreParseFail(PreParseError),
    /// The parsed token matched no command name or alias. Carries the token
    /// so the router can run the suggestion flow.
    CommandNotFound(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreParseFail(error) => write!(f, "pre-parse failed: {error}"),
            Self::CommandNotFound(name) => write!(f, "no command named '{name}'"),
        }
    }
}
impl std::error::Error for ParseError {}

impl GetErrorSeverity for ParseError {
    fn get_severity(&self) -> ErrorSeverity {
        match self {
            Self::PreParseFail(error) => error.get_severity(),
            Self::CommandNotFound(_) => ErrorSeverity::Low,
        }
    }
}

impl From<PreParseError> for ParseError {
    fn from(value: PreParseError) -> Self {
        Self::PreParseFail(value)
    }
}
