// Strum session
// Owns the event buffer for one practice session and drives the gate

use std::sync::{Arc, Mutex, MutexGuard};

use super::buffer::{EventBuffer, StrumPhase};
use super::config::DetectionConfig;
use super::types::{StrumEvent, StrumInstruction, StrumValidationResult};
use super::validator::StrumValidator;

/// Single controller for pluck buffering, segmentation and scoring
#[derive(Debug, Clone)]
pub struct StrumSession {
    config: DetectionConfig,
    buffer: EventBuffer,
    validator: StrumValidator,
}

impl StrumSession {
    pub fn new(config: DetectionConfig) -> Self {
        StrumSession {
            buffer: EventBuffer::with_gap_threshold(config.gap_threshold_ms),
            validator: StrumValidator::with_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn buffer(&self) -> &EventBuffer {
        &self.buffer
    }

    pub fn validator(&self) -> &StrumValidator {
        &self.validator
    }

    /// Feed one pluck from the input source
    pub fn on_pluck(&mut self, event: StrumEvent) {
        self.buffer.add_event(event);
    }

    pub fn phase(&self, now_ms: f64) -> StrumPhase {
        self.buffer.phase(now_ms)
    }

    /// Drain the buffer if the current strum has finished
    pub fn poll(&mut self, now_ms: f64) -> Option<Vec<StrumEvent>> {
        if self.buffer.is_strum_complete(now_ms) {
            Some(self.buffer.take_completed_strum())
        } else {
            None
        }
    }

    /// Drain whatever is buffered without waiting for the gap
    pub fn flush(&mut self) -> Option<Vec<StrumEvent>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer.take_completed_strum())
        }
    }

    /// Drain a finished strum and score it against `instruction`
    pub fn evaluate(
        &mut self,
        now_ms: f64,
        instruction: &StrumInstruction,
    ) -> Option<StrumValidationResult> {
        self.poll(now_ms)
            .map(|events| self.validator.validate(&events, instruction))
    }

    /// Drop any partial strum
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for StrumSession {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

/// Thread-safe session handle
///
/// Each method holds the lock for the whole operation, so a drain can never
/// interleave with a pluck delivered from another thread.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<StrumSession>>,
}

impl SharedSession {
    pub fn new(session: StrumSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Lock the session, recovering it if another holder panicked
    pub fn lock(&self) -> MutexGuard<'_, StrumSession> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn on_pluck(&self, event: StrumEvent) {
        self.lock().on_pluck(event);
    }

    pub fn poll(&self, now_ms: f64) -> Option<Vec<StrumEvent>> {
        self.lock().poll(now_ms)
    }

    pub fn flush(&self) -> Option<Vec<StrumEvent>> {
        self.lock().flush()
    }

    pub fn evaluate(
        &self,
        now_ms: f64,
        instruction: &StrumInstruction,
    ) -> Option<StrumValidationResult> {
        self.lock().evaluate(now_ms, instruction)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strum::types::{DetectedDirection, StrumDirection};
    use std::thread;

    #[test]
    fn test_poll_waits_for_gap() {
        let mut session = StrumSession::default();
        session.on_pluck(StrumEvent::new(6, 0.0));
        session.on_pluck(StrumEvent::new(5, 15.0));

        assert!(session.poll(50.0).is_none());
        assert!(session.poll(115.0).is_none());
        assert_eq!(session.phase(116.0), StrumPhase::Complete);

        let strum = session.poll(116.0).unwrap();
        assert_eq!(strum.len(), 2);
        assert_eq!(session.phase(116.0), StrumPhase::Idle);
        assert!(session.poll(1000.0).is_none());
    }

    #[test]
    fn test_evaluate_scores_completed_strum() {
        let mut session = StrumSession::default();
        let instruction = StrumInstruction::new(0, 0.0, StrumDirection::Down, &[4, 5, 6]);

        for (i, string) in [6, 5, 4].iter().enumerate() {
            session.on_pluck(StrumEvent::new(*string, i as f64 * 10.0));
        }

        assert!(session.evaluate(60.0, &instruction).is_none());

        let result = session.evaluate(200.0, &instruction).unwrap();
        assert!(result.valid);
        assert_eq!(result.direction, DetectedDirection::Down);
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn test_consecutive_strums_are_separated() {
        let mut session = StrumSession::default();

        session.on_pluck(StrumEvent::new(6, 0.0));
        session.on_pluck(StrumEvent::new(5, 10.0));
        let first = session.poll(200.0).unwrap();

        session.on_pluck(StrumEvent::new(1, 250.0));
        session.on_pluck(StrumEvent::new(2, 260.0));
        let second = session.poll(400.0).unwrap();

        assert_eq!(first.iter().map(|e| e.string).collect::<Vec<_>>(), vec![6, 5]);
        assert_eq!(second.iter().map(|e| e.string).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_flush_and_reset() {
        let mut session = StrumSession::default();
        assert!(session.flush().is_none());

        session.on_pluck(StrumEvent::new(3, 0.0));
        assert_eq!(session.flush().unwrap().len(), 1);

        session.on_pluck(StrumEvent::new(3, 0.0));
        session.reset();
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn test_config_gap_is_applied() {
        let config = DetectionConfig {
            gap_threshold_ms: 30.0,
            ..DetectionConfig::default()
        };
        let mut session = StrumSession::new(config);
        session.on_pluck(StrumEvent::new(1, 0.0));

        assert!(session.poll(31.0).is_some());
    }

    #[test]
    fn test_shared_session_across_threads() {
        let shared = SharedSession::new(StrumSession::default());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        shared.on_pluck(StrumEvent::new(((t + i) % 6 + 1) as u8, i as f64));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let drained = shared.flush().unwrap();
        assert_eq!(drained.len(), 100);
        assert!(shared.flush().is_none());
    }

    #[test]
    fn test_drain_while_plucks_arrive() {
        use std::collections::BTreeSet;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let shared = SharedSession::new(StrumSession::default());
        let done = Arc::new(AtomicBool::new(false));

        let drainer = {
            let shared = shared.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut drained = Vec::new();
                while !done.load(Ordering::SeqCst) {
                    if let Some(events) = shared.flush() {
                        drained.extend(events);
                    }
                    thread::yield_now();
                }
                drained
            })
        };

        let appenders: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        // Unique timestamp per pluck
                        shared.on_pluck(StrumEvent::new((i % 6 + 1) as u8, (t * 1000 + i) as f64));
                        if i % 10 == 0 {
                            thread::yield_now();
                        }
                    }
                })
            })
            .collect();

        for handle in appenders {
            handle.join().unwrap();
        }
        done.store(true, Ordering::SeqCst);

        let mut drained = drainer.join().unwrap();
        if let Some(rest) = shared.flush() {
            drained.extend(rest);
        }

        assert_eq!(drained.len(), 1000);
        let unique: BTreeSet<u64> = drained.iter().map(|e| e.timestamp_ms as u64).collect();
        assert_eq!(unique.len(), 1000);
    }
}
