//! Command and status report types for commandable devices.
//!
//! A dispatcher routes a [`Command`] to the device whose identity matches
//! `Command::target`, and every outcome of processing that command comes
//! back as a [`StatusReport`] on the command's `reply` channel. Devices
//! never answer through return values — the reply channel is the only
//! report surface, which lets a transport bridge forward reports without
//! knowing which device produced them.
//!
//! ## Contract
//!
//! - A device exposes its identity as a routing key; the dispatcher
//!   compares it against `Command::target` before (or instead of) the
//!   device doing so.
//! - A misrouted or unintelligible command is answered with exactly one
//!   error report and must leave the device untouched.
//! - `duration` of `None` (or zero) on an `On` command means "on
//!   indefinitely".

mod command;
mod report;

pub use command::{Action, Command};
pub use report::StatusReport;
