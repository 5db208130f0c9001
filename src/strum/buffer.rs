// Event buffer and completion gate
// Collects plucks until a quiet gap marks the end of a strum

use serde::{Deserialize, Serialize};

use super::config::GAP_THRESHOLD_MS;
use super::types::StrumEvent;

/// Where the buffer is within one strum-detection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrumPhase {
    /// Nothing buffered
    Idle,

    /// Plucks are arriving within the gap threshold
    Accumulating,

    /// The gap has elapsed; the strum is ready to drain
    Complete,
}

/// Ordered log of plucks since the last drain
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: Vec<StrumEvent>,
    last_event_ms: f64,
    gap_threshold_ms: f64,
}

impl EventBuffer {
    /// Create an empty buffer with the default 100 ms gap
    pub fn new() -> Self {
        Self::with_gap_threshold(GAP_THRESHOLD_MS)
    }

    pub fn with_gap_threshold(gap_threshold_ms: f64) -> Self {
        EventBuffer {
            events: Vec::new(),
            last_event_ms: 0.0,
            gap_threshold_ms,
        }
    }

    /// Append a pluck and remember its time as the latest activity
    pub fn add_event(&mut self, event: StrumEvent) {
        self.last_event_ms = event.timestamp_ms;
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events within `window_ms / 2` of `center_ms`, in insertion order
    pub fn events_in_window(&self, center_ms: f64, window_ms: f64) -> Vec<StrumEvent> {
        let half_window = window_ms / 2.0;
        self.events
            .iter()
            .filter(|event| (event.timestamp_ms - center_ms).abs() <= half_window)
            .copied()
            .collect()
    }

    /// Snapshot the buffered events and clear the buffer in one step
    pub fn take_completed_strum(&mut self) -> Vec<StrumEvent> {
        std::mem::take(&mut self.events)
    }

    /// True once more than the gap threshold has passed since the last pluck
    pub fn is_strum_complete(&self, now_ms: f64) -> bool {
        if self.events.is_empty() {
            return false;
        }
        now_ms - self.last_event_ms > self.gap_threshold_ms
    }

    pub fn phase(&self, now_ms: f64) -> StrumPhase {
        if self.events.is_empty() {
            StrumPhase::Idle
        } else if self.is_strum_complete(now_ms) {
            StrumPhase::Complete
        } else {
            StrumPhase::Accumulating
        }
    }

    pub fn events(&self) -> &[StrumEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the most recent pluck (0.0 before any pluck)
    pub fn last_event_ms(&self) -> f64 {
        self.last_event_ms
    }

    pub fn gap_threshold_ms(&self) -> f64 {
        self.gap_threshold_ms
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}
