//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (note id).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Unlock check failed or was cancelled.
    pub const AUTH_FAILED: i32 = 5;

    /// Secret store or database could not be reached.
    pub const STORAGE_UNAVAILABLE: i32 = 6;

    /// A stored note could not be decrypted or decoded.
    pub const DECODE_FAILED: i32 = 7;
}

/// Prompt shown by the unlock gate.
pub const UNLOCK_PROMPT: &str = "Unlock your notes?";
