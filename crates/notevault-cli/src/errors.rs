//! CLI error types for structured error handling.
//!
//! Core errors are mapped onto a small set of typed CLI errors, each with
//! its own exit code.

use std::fmt;

use notevault_core::NoteError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug, Clone)]
pub enum CliError {
    /// Resource not found (note id)
    NotFound { message: String, hint: String },

    /// Unlock check failed or was cancelled
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Keychain, keyfile or database unreachable
    StorageUnavailable(String),

    /// A stored note could not be decrypted or decoded
    Unreadable { message: String, hint: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::StorageUnavailable(message) => write!(f, "{}", message),
            CliError::Unreadable { message, hint } => write!(f, "{}\n{}", message, hint),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::StorageUnavailable(_) => exit_codes::STORAGE_UNAVAILABLE,
            CliError::Unreadable { .. } => exit_codes::DECODE_FAILED,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

impl From<&NoteError> for CliError {
    fn from(err: &NoteError) -> Self {
        match err {
            NoteError::NotFound(message) => {
                CliError::not_found(message, "Run `notevault list` to see note IDs.")
            }
            NoteError::AuthenticationFailed(message) => CliError::auth_failed_with_hint(
                message,
                "Set [security] unlock = \"allow_when_unavailable\" to skip the check on headless hosts.",
            ),
            NoteError::InvalidInput(message) => CliError::invalid_input(message),
            NoteError::StorageUnavailable(message) => {
                CliError::StorageUnavailable(message.clone())
            }
            err if err.is_decode_failure() => CliError::Unreadable {
                message: err.to_string(),
                hint: "The note no longer decrypts with the stored key; remove it with `notevault delete <ID>`."
                    .to_string(),
            },
            other => CliError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Find a typed error anywhere in an anyhow chain.
pub fn classify(err: &anyhow::Error) -> Option<CliError> {
    err.chain().find_map(|cause| {
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return Some(cli.clone());
        }
        cause.downcast_ref::<NoteError>().map(CliError::from)
    })
}
