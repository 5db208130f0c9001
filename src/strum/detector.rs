// Strum direction detector
// Majority vote over string-to-string transitions within one strum

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::config::TieBreak;
use super::types::{DetectedDirection, StrumEvent};

/// Vote cast by one transition between neighbouring strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    /// String number decreased (e.g. 6 -> 5)
    Down,

    /// String number increased (e.g. 1 -> 2)
    Up,
}

/// One step in the collapsed string sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: u8,
    pub to: u8,
    pub vote: Vote,
}

/// Which rule produced the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Fewer than two plucks
    TooFewEvents,

    /// Fewer than two strings left after collapsing repeats
    TooFewStrings,

    /// One vote count was larger
    Majority,

    /// Votes tied; first and last strings decided
    TieBreak,

    /// Votes tied and the tie-break could not decide
    Unresolved,
}

/// Full account of a detection, for debugging and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionTrace {
    /// String numbers after sorting and collapsing repeats
    pub collapsed: Vec<u8>,

    pub transitions: Vec<Transition>,
    pub down_votes: usize,
    pub up_votes: usize,
    pub direction: DetectedDirection,
    pub decision: Decision,
}

/// Sort plucks by time (stable) and drop consecutive repeats of a string
pub fn collapse_repeats(events: &[StrumEvent]) -> Vec<StrumEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));

    let mut collapsed: Vec<StrumEvent> = Vec::with_capacity(sorted.len());
    for event in sorted {
        if collapsed.last().map(|prev| prev.string) != Some(event.string) {
            collapsed.push(event);
        }
    }

    collapsed
}

fn transitions(collapsed: &[StrumEvent]) -> Vec<Transition> {
    collapsed
        .windows(2)
        .filter_map(|pair| {
            let (from, to) = (pair[0].string, pair[1].string);
            let vote = match from.cmp(&to) {
                Ordering::Greater => Vote::Down,
                Ordering::Less => Vote::Up,
                Ordering::Equal => return None,
            };
            Some(Transition { from, to, vote })
        })
        .collect()
}

/// Rule-based direction detector
#[derive(Debug, Clone, Copy)]
pub struct DirectionDetector {
    tie_break: TieBreak,
}

impl DirectionDetector {
    /// Create a detector that breaks ties on first versus last string
    pub fn new() -> Self {
        DirectionDetector {
            tie_break: TieBreak::FirstVersusLast,
        }
    }

    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        DirectionDetector { tie_break }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Detect the direction of a strum
    pub fn detect(&self, events: &[StrumEvent]) -> DetectedDirection {
        let trace = self.detect_traced(events);

        log::debug!(
            "Strum {:?} -> {} ({:?}, down {} / up {})",
            trace.collapsed,
            trace.direction.as_str(),
            trace.decision,
            trace.down_votes,
            trace.up_votes
        );

        trace.direction
    }

    /// Detect the direction and report every vote that led to it
    pub fn detect_traced(&self, events: &[StrumEvent]) -> DirectionTrace {
        if events.len() < 2 {
            return DirectionTrace {
                collapsed: events.iter().map(|e| e.string).collect(),
                transitions: Vec::new(),
                down_votes: 0,
                up_votes: 0,
                direction: DetectedDirection::Unclear,
                decision: Decision::TooFewEvents,
            };
        }

        let collapsed = collapse_repeats(events);
        let strings: Vec<u8> = collapsed.iter().map(|e| e.string).collect();

        if collapsed.len() < 2 {
            return DirectionTrace {
                collapsed: strings,
                transitions: Vec::new(),
                down_votes: 0,
                up_votes: 0,
                direction: DetectedDirection::Unclear,
                decision: Decision::TooFewStrings,
            };
        }

        let transitions = transitions(&collapsed);
        let down_votes = transitions.iter().filter(|t| t.vote == Vote::Down).count();
        let up_votes = transitions.len() - down_votes;

        let (direction, decision) = match down_votes.cmp(&up_votes) {
            Ordering::Greater => (DetectedDirection::Down, Decision::Majority),
            Ordering::Less => (DetectedDirection::Up, Decision::Majority),
            Ordering::Equal => self.break_tie(&strings),
        };

        DirectionTrace {
            collapsed: strings,
            transitions,
            down_votes,
            up_votes,
            direction,
            decision,
        }
    }

    fn break_tie(&self, strings: &[u8]) -> (DetectedDirection, Decision) {
        if self.tie_break == TieBreak::Unclear {
            return (DetectedDirection::Unclear, Decision::Unresolved);
        }

        match (strings.first(), strings.last()) {
            (Some(first), Some(last)) if first > last => {
                (DetectedDirection::Down, Decision::TieBreak)
            }
            (Some(first), Some(last)) if first < last => {
                (DetectedDirection::Up, Decision::TieBreak)
            }
            _ => (DetectedDirection::Unclear, Decision::Unresolved),
        }
    }

    /// Fraction of transitions that agree with `direction` [0.0, 1.0]
    ///
    /// Zero for fewer than two distinct strings and for an unclear direction.
    pub fn confidence(&self, events: &[StrumEvent], direction: DetectedDirection) -> f64 {
        let expected = match direction {
            DetectedDirection::Down => Vote::Down,
            DetectedDirection::Up => Vote::Up,
            DetectedDirection::Unclear => return 0.0,
        };

        if events.len() < 2 {
            return 0.0;
        }

        let collapsed = collapse_repeats(events);
        if collapsed.len() < 2 {
            return 0.0;
        }

        let transitions = transitions(&collapsed);
        if transitions.is_empty() {
            return 0.0;
        }

        let correct = transitions.iter().filter(|t| t.vote == expected).count();
        correct as f64 / transitions.len() as f64
    }
}

impl Default for DirectionDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect a strum direction with the default tie-break
pub fn detect_direction(events: &[StrumEvent]) -> DetectedDirection {
    DirectionDetector::new().detect(events)
}

/// Transition agreement with `direction`, see [`DirectionDetector::confidence`]
pub fn calculate_confidence(events: &[StrumEvent], direction: DetectedDirection) -> f64 {
    DirectionDetector::new().confidence(events, direction)
}
