//! Status reports sent back to the command's originator.

use serde::{Deserialize, Serialize};

/// The outcome of processing one command, as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Human-readable description of what happened.
    pub message: String,

    /// Whether this report describes a failure.
    pub is_error: bool,
}

impl StatusReport {
    /// Create an informational report.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    /// Create an error report.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}
