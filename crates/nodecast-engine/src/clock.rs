//! Time source abstraction for cooldown tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time in whole seconds since the Unix epoch.
///
/// The engine never reads the wall clock directly; it goes through this
/// trait so tests can advance time deterministically.
pub trait Clock: Send + Sync {
    fn epoch_secs(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// A manually advanced clock for tests.
///
/// Clones share the same underlying instant, so a test can keep a handle
/// and advance time after handing the clock to an engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock frozen at the given epoch second.
    pub fn at(epoch_secs: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(epoch_secs)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute epoch second.
    pub fn set(&self, epoch_secs: u64) {
        self.now.store(epoch_secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn epoch_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
