// Clock sources
// Shared timebase for pluck timestamps and the completion gate

use std::sync::{Arc, Mutex};

/// Anything that can report the current session time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Externally driven clock, for replaying recorded sessions
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        ManualClock {
            now_ms: Arc::new(Mutex::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: f64) {
        *self.now_ms.lock().unwrap_or_else(|p| p.into_inner()) = now_ms;
    }

    pub fn advance(&self, delta_ms: f64) {
        *self.now_ms.lock().unwrap_or_else(|p| p.into_inner()) += delta_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now_ms.lock().unwrap_or_else(|p| p.into_inner())
    }
}
