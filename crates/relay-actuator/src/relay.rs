//! The relay actuator and its command entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use device_command_types::{Action, Command, StatusReport};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::pin::OutputPin;
use crate::session::{self, send_report, SessionContext, SessionHandles, Timing};

/// A named binary actuator driven through one digital output pin.
///
/// A relay is constructed once with its identity and pin, configured
/// once, and then fed [`Command`]s for its lifetime by a dispatcher
/// that routes on [`Relay::name`]. See the crate docs for the session
/// model.
pub struct Relay<P: OutputPin> {
    name: String,
    pin: Arc<Mutex<P>>,
    timing: Arc<Mutex<Timing>>,
    active: Arc<AtomicBool>,
    session: Option<SessionHandles>,
    config: RelayConfig,
}

impl<P: OutputPin> Relay<P> {
    /// Create a relay with default timing. The pin does not need to be
    /// configured yet.
    pub fn new(pin: P, name: impl Into<String>) -> Self {
        Self::with_config(pin, name, RelayConfig::default())
    }

    /// Create a relay with explicit timing knobs.
    pub fn with_config(pin: P, name: impl Into<String>, config: RelayConfig) -> Self {
        Self {
            name: name.into(),
            pin: Arc::new(Mutex::new(pin)),
            timing: Arc::new(Mutex::new(Timing::default())),
            active: Arc::new(AtomicBool::new(false)),
            session: None,
            config,
        }
    }

    /// The relay's identity, used by the dispatcher as a routing key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a monitoring task currently owns an activation.
    pub fn session_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Set up the pin for use, beginning in the off state. Must be
    /// called exactly once before any command is executed.
    pub async fn configure(&mut self) {
        self.pin
            .lock()
            .expect("lock poisoned")
            .configure_output();
        self.off().await;
        debug!(relay = %self.name, "configured");
    }

    /// Process one command addressed to this relay.
    ///
    /// Every outcome is reported on the command's reply channel; this
    /// method never fails toward the caller. It returns without
    /// blocking except for the bounded cancellation grace period on
    /// `Off`.
    pub async fn execute(&mut self, command: Command) {
        debug!(relay = %self.name, action = %command.action, "executing command");

        if command.target != self.name {
            let message = format!(
                "error - {} received a command intended for {}",
                self.name, command.target
            );
            warn!(relay = %self.name, target = %command.target, "misrouted command");
            send_report(&command.reply, StatusReport::error(message)).await;
            return;
        }

        match command.action {
            Action::On => self.handle_on(command).await,
            Action::Off => self.handle_off(command).await,
            Action::Unknown(ref action) => {
                let message = format!(
                    "error - {} does not understand action '{}' (expected On or Off)",
                    self.name, action
                );
                send_report(&command.reply, StatusReport::error(message)).await;
            }
        }
    }

    /// Start a fresh session, or revise the one already running.
    async fn handle_on(&mut self, command: Command) {
        let requested = command.duration.unwrap_or(Duration::ZERO);

        if self.session_active() {
            let current = self.timing.lock().expect("lock poisoned").duration;
            if requested == current {
                return;
            }
            if let Some(session) = &self.session {
                debug!(relay = %self.name, ?requested, "forwarding duration revision");
                if let Err(err) = session.revise(requested) {
                    warn!(relay = %self.name, error = %err, "dropping duration revision");
                }
            }
            return;
        }

        // A finished session leaves stale handles behind; the task that
        // owned them is gone, so dropping them here is safe.
        self.session = None;

        {
            let mut timing = self.timing.lock().expect("lock poisoned");
            timing.stamp();
            timing.duration = requested;
        }
        self.pin.lock().expect("lock poisoned").write(true);

        // Foreground is the only writer that flips the gate on; the
        // monitoring task is the only one that flips it off.
        self.active.store(true, Ordering::SeqCst);

        let ctx = SessionContext {
            name: self.name.clone(),
            pin: Arc::clone(&self.pin),
            timing: Arc::clone(&self.timing),
            active: Arc::clone(&self.active),
            poll_interval: self.config.poll_interval,
        };
        self.session = Some(session::spawn(ctx, command.reply));
        debug!(relay = %self.name, ?requested, "session started");
    }

    /// Cancel any running session and make sure the pin ends up low.
    ///
    /// The cancellation is advisory with a forced fallback: signal the
    /// monitoring task, give it the grace period to lower the pin and
    /// report, and only if the pin is still high take over — abort the
    /// task so it cannot also report, force the pin low, and report
    /// here instead. An already-off relay is a silent no-op.
    async fn handle_off(&mut self, command: Command) {
        let session = self.session.take();

        if let Some(session) = &session {
            match session.cancel() {
                Ok(()) => sleep(self.config.cancel_grace).await,
                Err(err) => debug!(relay = %self.name, error = %err, "session already gone"),
            }
        }

        if !self.get() {
            return;
        }

        if let Some(session) = &session {
            session.abort();
        }
        let elapsed = self.timing.lock().expect("lock poisoned").elapsed();
        self.pin.lock().expect("lock poisoned").write(false);
        warn!(relay = %self.name, ?elapsed, "forcing relay off");
        let message = format!(
            "{} - Forced off after {elapsed:?} at {}",
            self.name,
            Utc::now().to_rfc3339()
        );
        send_report(&command.reply, StatusReport::info(message)).await;
        self.timing.lock().expect("lock poisoned").reset();
        self.active.store(false, Ordering::SeqCst);
    }

    /// A measured reading of the relay's pin.
    pub fn get(&self) -> bool {
        self.pin.lock().expect("lock poisoned").read()
    }

    /// Drive the pin to `level` directly, bypassing the session
    /// machinery, and return a subsequent measured confirmation.
    ///
    /// Not meant to be mixed with an active session; the session's
    /// monitoring task knows nothing about direct writes.
    pub async fn set(&mut self, level: bool) -> bool {
        self.pin.lock().expect("lock poisoned").write(level);
        self.timing.lock().expect("lock poisoned").stamp();
        sleep(self.config.settle_delay).await;
        self.get()
    }

    /// Drive the pin high directly and confirm.
    pub async fn on(&mut self) -> bool {
        self.set(true).await
    }

    /// Drive the pin low directly and confirm.
    pub async fn off(&mut self) -> bool {
        self.set(false).await
    }

    /// The pin level and the wall-clock time it has been valid since.
    pub fn state(&self) -> (bool, Option<DateTime<Utc>>) {
        let since = self.timing.lock().expect("lock poisoned").on_at;
        (self.get(), since)
    }

    /// The relay's state as a human-readable line.
    pub fn state_string(&self) -> String {
        let (level, since) = self.state();
        let level = if level { "ON" } else { "OFF" };
        let since = since
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "startup".to_string());
        format!(
            "{} -- (Relay) {} {} since {}",
            Utc::now().to_rfc3339(),
            self.name,
            level,
            since
        )
    }
}
