// Strum runner
// Single-writer loop feeding plucks into a session and reporting finished strums

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::explainability::StrumAttempt;
use super::session::StrumSession;
use super::types::{DetectedDirection, StrumEvent};
use crate::groove::{Clock, PatternSchedule, ScheduledStrum, DEFAULT_TOLERANCE_MS};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Report receiver was dropped")]
    OutputClosed,
}

/// Messages accepted by the runner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionInput {
    Pluck(StrumEvent),

    /// Discard the strum in progress
    Reset,
}

/// A finished strum, scored when it lined up with the pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrumReport {
    pub events: Vec<StrumEvent>,
    pub direction: DetectedDirection,
    pub confidence: f64,

    /// The instruction the strum was matched to, if any was close enough
    pub scheduled: Option<ScheduledStrum>,

    pub attempt: Option<StrumAttempt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// How often the completion gate is checked
    pub poll_interval_ms: u64,

    /// Max distance from a scheduled strum for a match
    pub timing_tolerance_ms: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            poll_interval_ms: 10,
            timing_tolerance_ms: DEFAULT_TOLERANCE_MS,
        }
    }
}

/// Owns a session and is the only writer to its buffer
pub struct StrumRunner<C: Clock> {
    session: StrumSession,
    schedule: Option<PatternSchedule>,
    clock: C,
    config: RunnerConfig,
}

impl<C: Clock + Send + Sync + 'static> StrumRunner<C> {
    pub fn new(session: StrumSession, clock: C) -> Self {
        StrumRunner {
            session,
            schedule: None,
            clock,
            config: RunnerConfig::default(),
        }
    }

    /// Score strums against a looping pattern
    pub fn with_schedule(mut self, schedule: PatternSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run on a new task, returning its input and report channels
    pub fn spawn(
        self,
        capacity: usize,
    ) -> (
        mpsc::Sender<SessionInput>,
        mpsc::Receiver<StrumReport>,
        JoinHandle<Result<(), RunnerError>>,
    ) {
        let (input_tx, input_rx) = mpsc::channel(capacity);
        let (report_tx, report_rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(self.run(input_rx, report_tx));
        (input_tx, report_rx, handle)
    }

    /// Process input until the sender side closes, then flush the last strum
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<SessionInput>,
        reports: mpsc::Sender<StrumReport>,
    ) -> Result<(), RunnerError> {
        let period = Duration::from_millis(self.config.poll_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!("Strum runner started");

        loop {
            tokio::select! {
                // Drain queued plucks before checking the gate
                biased;

                message = input.recv() => match message {
                    Some(SessionInput::Pluck(event)) => {
                        // A pluck after the gap closes the previous strum first
                        if let Some(events) = self.session.poll(event.timestamp_ms) {
                            self.report(events, &reports).await?;
                        }
                        self.session.on_pluck(event);
                    }
                    Some(SessionInput::Reset) => {
                        log::debug!("Discarding {} buffered plucks", self.session.buffer().len());
                        self.session.reset();
                    }
                    None => {
                        if let Some(events) = self.session.flush() {
                            self.report(events, &reports).await?;
                        }
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if let Some(events) = self.session.poll(self.clock.now_ms()) {
                        self.report(events, &reports).await?;
                    }
                }
            }
        }

        log::info!("Strum runner stopped");
        Ok(())
    }

    async fn report(
        &self,
        events: Vec<StrumEvent>,
        reports: &mpsc::Sender<StrumReport>,
    ) -> Result<(), RunnerError> {
        let report = self.score(events);
        reports
            .send(report)
            .await
            .map_err(|_| RunnerError::OutputClosed)
    }

    fn score(&self, events: Vec<StrumEvent>) -> StrumReport {
        let validator = self.session.validator();

        let onset = events
            .iter()
            .map(|e| e.timestamp_ms)
            .min_by(|a, b| a.total_cmp(b));

        let scheduled = match (&self.schedule, onset) {
            (Some(schedule), Some(onset)) => schedule.within(onset, self.config.timing_tolerance_ms),
            _ => None,
        };

        match scheduled {
            Some(scheduled) => {
                let result = validator.validate(&events, &scheduled.instruction);
                let attempt = StrumAttempt::from_validation(
                    &scheduled.instruction,
                    &events,
                    &result,
                    scheduled.expected_time_ms,
                    validator.confidence_floor(),
                );
                log::info!("{}", attempt.summary());

                StrumReport {
                    events,
                    direction: result.direction,
                    confidence: result.confidence,
                    scheduled: Some(scheduled),
                    attempt: Some(attempt),
                }
            }
            None => {
                let direction = validator.detector().detect(&events);
                let confidence = validator.detector().confidence(&events, direction);

                StrumReport {
                    events,
                    direction,
                    confidence,
                    scheduled: None,
                    attempt: None,
                }
            }
        }
    }
}
