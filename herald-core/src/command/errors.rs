use std::fmt::Display;

/// How bad an error is. `Low` severity errors are part of normal operation
/// (a message that simply is not a command, an argument that does not parse)
/// and are at most debug-logged; `High` severity errors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    High,
}

pub trait GetErrorSeverity {
    fn get_severity(&self) -> ErrorSeverity;
}

/// A failure while turning declarative command/resolver definitions into a
/// servable registry. All of these are fatal at startup: a bot must refuse
/// to serve traffic with a partially-built command set.
#[derive(Debug)]
pub enum RegistrationError {
    /// A resolver key was registered twice.
    DuplicateResolver(String),
    /// An overload references a resolver key that was never registered.
    UnknownResolver(String),
    /// A command name or alias collides with an already-registered one.
    DuplicateCommand(String),
    /// The assembled overload pattern is not valid regex syntax (a custom
    /// resolver fragment is malformed).
    InvalidPattern { command: String, pattern: String },
    /// The compiled overload pattern failed to match the example string
    /// assembled from its own resolvers.
    UnmatchableOverload {
        command: String,
        pattern: String,
        example: String,
    },
    /// The declared handler arity does not match the overload's slot count.
    ArityMismatch {
        command: String,
        declared: usize,
        slots: usize,
    },
    /// Every command needs a free-form fallback handler.
    MissingFallback(String),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateResolver(key) => {
                write!(f, "parameter resolver '{key}' is already registered")
            },
            Self::UnknownResolver(key) => {
                write!(f, "no parameter resolver registered for key '{key}'")
            },
            Self::DuplicateCommand(name) => {
                write!(f, "command name or alias '{name}' is already registered")
            },
            Self::InvalidPattern { command, pattern } => {
                write!(
                    f,
                    "an overload of '{command}' assembled an invalid pattern '{pattern}'"
                )
            },
            Self::UnmatchableOverload {
                command,
                pattern,
                example,
            } => {
                write!(
                    f,
                    "failed building pattern for an overload of '{command}': pattern '{pattern}' \
                     does not match its own example '{example}'. Try rearranging the arguments, \
                     especially free-text ones, into a parsable order"
                )
            },
            Self::ArityMismatch {
                command,
                declared,
                slots,
            } => {
                write!(
                    f,
                    "an overload of '{command}' declares arity {declared} but has {slots} slot(s)"
                )
            },
            Self::MissingFallback(name) => {
                write!(f, "command '{name}' has no fallback handler")
            },
        }
    }
}
impl std::error::Error for RegistrationError {}

impl GetErrorSeverity for RegistrationError {
    fn get_severity(&self) -> ErrorSeverity {
        ErrorSeverity::High
    }
}
