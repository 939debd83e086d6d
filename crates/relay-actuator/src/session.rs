//! The background monitoring task that owns one timed activation.
//!
//! A session begins when the foreground `execute` path drives the pin
//! high and spawns a monitoring task, and ends when that task lowers
//! the pin again — on cancellation, on timeout, or on a zero duration
//! revision. The task is the sole writer of the session's end: it
//! zeroes the timing fields and clears the active gate last, so the
//! foreground never observes a half-torn-down session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use device_command_types::StatusReport;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{RelayError, RelayResult};
use crate::pin::OutputPin;

/// Timing state shared between the foreground path and the monitoring
/// task. The foreground writes it only before a session starts; the
/// task owns it afterwards. Everyone else reads snapshots.
#[derive(Debug, Default)]
pub(crate) struct Timing {
    /// When the current activation began. `None` while off.
    pub(crate) on_since: Option<Instant>,

    /// Wall-clock counterpart of `on_since`, for report messages.
    pub(crate) on_at: Option<DateTime<Utc>>,

    /// How long the activation should last. Zero means indefinite.
    pub(crate) duration: Duration,
}

impl Timing {
    /// Mark now as the start of an activation.
    pub(crate) fn stamp(&mut self) {
        self.on_since = Some(Instant::now());
        self.on_at = Some(Utc::now());
    }

    /// Zero all fields.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Time since the activation began, zero if there is none.
    pub(crate) fn elapsed(&self) -> Duration {
        self.on_since.map(|since| since.elapsed()).unwrap_or_default()
    }
}

/// Everything the monitoring task needs, cloned out of the relay before
/// the spawn.
pub(crate) struct SessionContext<P: OutputPin> {
    pub(crate) name: String,
    pub(crate) pin: Arc<Mutex<P>>,
    pub(crate) timing: Arc<Mutex<Timing>>,
    pub(crate) active: Arc<AtomicBool>,
    pub(crate) poll_interval: Duration,
}

/// Foreground-owned handles into the active session. Dropping them
/// closes both signal channels.
pub(crate) struct SessionHandles {
    revision_tx: mpsc::Sender<Duration>,
    cancel_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SessionHandles {
    /// Forward a new duration to the monitoring task. Zero asks the
    /// task to end the session.
    pub(crate) fn revise(&self, duration: Duration) -> RelayResult<()> {
        self.revision_tx.try_send(duration).map_err(|err| match err {
            TrySendError::Full(_) => RelayError::RevisionPending,
            TrySendError::Closed(_) => RelayError::SessionGone,
        })
    }

    /// Signal the monitoring task to end the session now. A cancel that
    /// is already queued counts as delivered.
    pub(crate) fn cancel(&self) -> RelayResult<()> {
        match self.cancel_tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(RelayError::SessionGone),
        }
    }

    /// Kill the monitoring task without letting it report. Used by the
    /// foreground when it takes over the final pin write itself.
    pub(crate) fn abort(&self) {
        self.task.abort();
    }
}

/// Deliver a report, logging instead of failing if the originator went
/// away.
pub(crate) async fn send_report(reply: &mpsc::Sender<StatusReport>, report: StatusReport) {
    if let Err(err) = reply.send(report).await {
        warn!(error = %err, "status report dropped; reply channel closed");
    }
}

/// Spawn the monitoring task for a freshly activated session.
///
/// Expects the caller to have already stamped the timing state, driven
/// the pin high, and set the active gate. The task immediately emits
/// the activation report, then loops until one of its three exits.
pub(crate) fn spawn<P: OutputPin>(
    ctx: SessionContext<P>,
    reply: mpsc::Sender<StatusReport>,
) -> SessionHandles {
    let (revision_tx, mut revision_rx) = mpsc::channel::<Duration>(1);
    let (cancel_tx, mut cancel_rx) = mpsc::channel::<()>(1);

    let task = tokio::spawn(async move {
        let SessionContext {
            name,
            pin,
            timing,
            active,
            poll_interval,
        } = ctx;

        let (duration, on_at) = {
            let timing = timing.lock().expect("lock poisoned");
            (timing.duration, timing.on_at)
        };
        let on_at = on_at.map(|at| at.to_rfc3339()).unwrap_or_default();
        let activation = if duration.is_zero() {
            format!("{name} - On indefinitely at {on_at}")
        } else {
            format!("{name} - On for {duration:?} at {on_at}")
        };
        send_report(&reply, StatusReport::info(activation)).await;

        loop {
            tokio::select! {
                signal = cancel_rx.recv() => {
                    let elapsed = lower_pin(&pin, &timing);
                    if signal.is_none() {
                        // Foreground dropped its handles; pin is low,
                        // nobody is left to report to on its behalf.
                        debug!(relay = %name, "cancel channel closed; ending session");
                        break;
                    }
                    let message = format!(
                        "{name} - Forced off after {elapsed:?} at {}",
                        Utc::now().to_rfc3339()
                    );
                    send_report(&reply, StatusReport::info(message)).await;
                    break;
                }
                revision = revision_rx.recv() => match revision {
                    Some(new_duration) if !new_duration.is_zero() => {
                        let (elapsed, scheduled) = {
                            let mut timing = timing.lock().expect("lock poisoned");
                            let snapshot = (timing.elapsed(), timing.duration);
                            timing.duration = new_duration;
                            snapshot
                        };
                        debug!(relay = %name, ?new_duration, "revising session duration");
                        let message = format!(
                            "{name} - Changing on duration to {new_duration:?} \
                             (after {elapsed:?} of a scheduled {scheduled:?}) at {}",
                            Utc::now().to_rfc3339()
                        );
                        send_report(&reply, StatusReport::info(message)).await;
                    }
                    Some(_) => {
                        // A zero revision is an implicit cancellation.
                        let elapsed = lower_pin(&pin, &timing);
                        let message = format!(
                            "{name} - Off after {elapsed:?} at {}",
                            Utc::now().to_rfc3339()
                        );
                        send_report(&reply, StatusReport::info(message)).await;
                        break;
                    }
                    None => {
                        lower_pin(&pin, &timing);
                        debug!(relay = %name, "revision channel closed; ending session");
                        break;
                    }
                },
                _ = sleep(poll_interval) => {
                    let expired = {
                        let timing = timing.lock().expect("lock poisoned");
                        !timing.duration.is_zero() && timing.elapsed() > timing.duration
                    };
                    if expired {
                        let elapsed = lower_pin(&pin, &timing);
                        let message = format!(
                            "{name} - Off after {elapsed:?} at {}",
                            Utc::now().to_rfc3339()
                        );
                        send_report(&reply, StatusReport::info(message)).await;
                        break;
                    }
                }
            }
        }

        timing.lock().expect("lock poisoned").reset();
        active.store(false, Ordering::SeqCst);
        debug!(relay = %name, "session task exiting");
    });

    SessionHandles {
        revision_tx,
        cancel_tx,
        task,
    }
}

/// Drive the pin low and return how long the activation lasted.
fn lower_pin<P: OutputPin>(pin: &Arc<Mutex<P>>, timing: &Arc<Mutex<Timing>>) -> Duration {
    pin.lock().expect("lock poisoned").write(false);
    timing.lock().expect("lock poisoned").elapsed()
}
