//! Commands sent from the dispatcher to a device.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::report::StatusReport;

/// The action a command asks a device to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Switch the device on, indefinitely or for `Command::duration`.
    On,
    /// Switch the device off, cancelling any running activation.
    Off,
    /// Anything the device does not understand; carries the raw input.
    Unknown(String),
}

impl Action {
    /// Parse an action from raw dispatcher input.
    ///
    /// Matching is case-insensitive ("on", "On", "ON" all parse to
    /// [`Action::On`]); unrecognized input is preserved verbatim in
    /// [`Action::Unknown`] so the device can echo it back in its error
    /// report.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("on") {
            Self::On
        } else if raw.eq_ignore_ascii_case("off") {
            Self::Off
        } else {
            Self::Unknown(raw.to_string())
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "On"),
            Self::Off => write!(f, "Off"),
            Self::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// A command addressed to one named device.
#[derive(Debug, Clone)]
pub struct Command {
    /// Identity of the device this command is meant for.
    pub target: String,

    /// What the device should do.
    pub action: Action,

    /// How long an `On` activation should last. `None` or zero means
    /// indefinitely; ignored for other actions.
    pub duration: Option<Duration>,

    /// Where every report about this command is delivered.
    pub reply: mpsc::Sender<StatusReport>,
}

impl Command {
    /// Create a command with an explicit action.
    pub fn new(
        target: impl Into<String>,
        action: Action,
        duration: Option<Duration>,
        reply: mpsc::Sender<StatusReport>,
    ) -> Self {
        Self {
            target: target.into(),
            action,
            duration,
            reply,
        }
    }

    /// Create an `On` command.
    pub fn on(
        target: impl Into<String>,
        duration: Option<Duration>,
        reply: mpsc::Sender<StatusReport>,
    ) -> Self {
        Self::new(target, Action::On, duration, reply)
    }

    /// Create an `Off` command.
    pub fn off(target: impl Into<String>, reply: mpsc::Sender<StatusReport>) -> Self {
        Self::new(target, Action::Off, None, reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Action::parse("on"), Action::On);
        assert_eq!(Action::parse("On"), Action::On);
        assert_eq!(Action::parse("ON"), Action::On);
        assert_eq!(Action::parse("off"), Action::Off);
        assert_eq!(Action::parse("OFF"), Action::Off);
    }

    #[test]
    fn parse_preserves_unknown_input() {
        assert_eq!(
            Action::parse("Toggle"),
            Action::Unknown("Toggle".to_string())
        );
        assert_eq!(Action::parse(""), Action::Unknown(String::new()));
    }

    #[test]
    fn display_round_trips_known_actions() {
        assert_eq!(Action::On.to_string(), "On");
        assert_eq!(Action::Off.to_string(), "Off");
        assert_eq!(Action::Unknown("Blink".into()).to_string(), "Blink");
    }

    #[test]
    fn constructors_fill_fields() {
        let (tx, _rx) = mpsc::channel(1);
        let cmd = Command::on("Pump", Some(Duration::from_secs(5)), tx.clone());
        assert_eq!(cmd.target, "Pump");
        assert_eq!(cmd.action, Action::On);
        assert_eq!(cmd.duration, Some(Duration::from_secs(5)));

        let cmd = Command::off("Pump", tx);
        assert_eq!(cmd.action, Action::Off);
        assert!(cmd.duration.is_none());
    }
}
