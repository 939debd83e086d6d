//! Binary relay actuator with timed activations.
//!
//! A [`Relay`] drives a single digital output (typically an
//! electromechanical relay) and exposes it to a dispatcher as a named,
//! commandable device. The interesting part is the timed-activation
//! session: an `On` command can carry a duration, in which case a
//! background monitoring task owns the activation, times it out on its
//! own, and accepts in-flight duration revisions and cancellations.
//!
//! ## Architecture
//!
//! ```text
//! Dispatcher ──► Relay::execute(Command) ─┬─► identity check
//!                                         ├─► On  ──► spawn / revise session
//!                                         ├─► Off ──► cancel session, force low
//!                                         └─► Unknown ──► error report
//!
//!                  monitoring task (one per active session)
//!                  ┌──────────────────────────────────────┐
//!                  │ select! over:                        │
//!                  │   cancel signal   ──► pin low, exit  │
//!                  │   duration revise ──► update, loop   │
//!                  │   poll tick       ──► timeout check  │
//!                  └──────────────────────────────────────┘
//! ```
//!
//! Every report about a command — activation, revision, shutdown, or
//! error — is delivered on the command's own reply channel as a
//! [`device_command_types::StatusReport`].
//!
//! ## Session invariant
//!
//! At most one monitoring task exists per relay. The foreground
//! `execute` path is the only writer that activates a session, and the
//! monitoring task is the only writer that deactivates it, so the two
//! never race on the gate. While no session is active the timing fields
//! are zeroed and both session channels are torn down.
//!
//! ## Example
//!
//! ```ignore
//! use device_command_types::Command;
//! use relay_actuator::{MockPin, Relay};
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//!
//! let (reply_tx, mut reply_rx) = mpsc::channel(8);
//! let mut pump = Relay::new(MockPin::new(), "Pump");
//! pump.configure().await;
//!
//! pump.execute(Command::on("Pump", Some(Duration::from_secs(5)), reply_tx)).await;
//! // 5 seconds later the session times out, lowers the pin, and sends
//! // a final report on reply_rx.
//! ```

mod config;
mod error;
mod pin;
mod relay;
mod session;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use pin::{MockPin, OutputPin};
pub use relay::Relay;
