//! Error types for the relay's session plumbing.
//!
//! Command-level failures (misrouting, unknown actions) are reported to
//! the dispatcher as error [`StatusReport`]s, never as `Err` values —
//! these variants cover the internal seams where a session signal can
//! fail to be delivered.
//!
//! [`StatusReport`]: device_command_types::StatusReport

use thiserror::Error;

/// Errors from delivering signals into an active session.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The revision channel already holds an undrained revision. The
    /// channels are capacity one on purpose; more than one outstanding
    /// revision means the caller outran the monitoring loop.
    #[error("A duration revision is already pending for this session")]
    RevisionPending,

    /// The session tore down while the signal was in flight.
    #[error("The session ended before the signal could be delivered")]
    SessionGone,
}

/// Result alias for session signal delivery.
pub type RelayResult<T> = Result<T, RelayError>;
