//! Digital output pin abstraction.

use std::sync::{Arc, Mutex};

/// A digital output the relay drives.
///
/// Implementations wrap whatever the platform offers (memory-mapped
/// GPIO, a sysfs pin, an I/O expander register). The relay guarantees
/// that at most one execution context touches the pin at a time, so
/// implementations do not need their own locking.
pub trait OutputPin: Send + 'static {
    /// Put the pin into output mode. Called once during configuration.
    fn configure_output(&mut self);

    /// Drive the pin high (`true`) or low (`false`).
    fn write(&mut self, level: bool);

    /// Measure the pin's current level.
    fn read(&self) -> bool;
}

/// An in-memory pin for tests and dispatcher development.
///
/// Clones share the same underlying state, so a test can keep a handle
/// while the relay owns another and observe every write the relay makes.
#[derive(Debug, Clone, Default)]
pub struct MockPin {
    inner: Arc<Mutex<MockPinState>>,
}

#[derive(Debug, Default)]
struct MockPinState {
    level: bool,
    configured: bool,
    writes: u64,
}

impl MockPin {
    /// Create an unconfigured pin at level low.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pin's current level.
    pub fn level(&self) -> bool {
        self.inner.lock().expect("lock poisoned").level
    }

    /// Whether `configure_output` has been called.
    pub fn is_configured(&self) -> bool {
        self.inner.lock().expect("lock poisoned").configured
    }

    /// How many writes the pin has seen.
    pub fn write_count(&self) -> u64 {
        self.inner.lock().expect("lock poisoned").writes
    }
}

impl OutputPin for MockPin {
    fn configure_output(&mut self) {
        self.inner.lock().expect("lock poisoned").configured = true;
    }

    fn write(&mut self, level: bool) {
        let mut state = self.inner.lock().expect("lock poisoned");
        state.level = level;
        state.writes += 1;
    }

    fn read(&self) -> bool {
        self.inner.lock().expect("lock poisoned").level
    }
}
