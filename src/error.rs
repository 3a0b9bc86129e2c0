//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the armpup application.
///
/// - 0: Success (every photo was found in the remote library)
/// - 1: General error (unexpected failure, including remote query failures)
/// - 2: Missing photos (at least one photo was not found)
/// - 3: Partial success (all dated photos found, some files had no EXIF date)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Every dated photo was matched.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// At least one photo has no remote counterpart.
    MissingPhotos = 2,
    /// Some files could not be dated, none were missing.
    PartialSuccess = 3,
    /// The run was interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "AP000",
            Self::GeneralError => "AP001",
            Self::MissingPhotos => "AP002",
            Self::PartialSuccess => "AP003",
            Self::Interrupted => "AP130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "AP001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
