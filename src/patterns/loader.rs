// Pattern loading
// Reads user-supplied pattern files and rejects ones the detector cannot score

use thiserror::Error;

use crate::strum::types::{StrumPattern, MAX_STRING, MIN_STRING};

/// Largest bar length a pattern may declare
pub const MAX_BEATS_PER_BAR: u32 = 32;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Invalid pattern JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern '{0}' has no strums")]
    Empty(String),

    #[error("Pattern '{pattern}' has {beats} beats per bar, expected 1-32")]
    InvalidTimeSignature { pattern: String, beats: u32 },

    #[error("Pattern '{pattern}' strum {index} has no strings")]
    NoStrings { pattern: String, index: usize },

    #[error("Pattern '{pattern}' strum {index} uses string {string}, expected 1-6")]
    StringOutOfRange {
        pattern: String,
        index: usize,
        string: u8,
    },

    #[error("Pattern '{pattern}' strum {index} has subdivision {subdivision}, expected [0, 1)")]
    SubdivisionOutOfRange {
        pattern: String,
        index: usize,
        subdivision: f64,
    },

    #[error("Pattern '{pattern}' strum {index} is on beat {beat}, pattern has {beats} beats")]
    BeatOutOfRange {
        pattern: String,
        index: usize,
        beat: u32,
        beats: u64,
    },
}

/// Check that every instruction in a pattern can be scheduled and scored
pub fn validate_pattern(pattern: &StrumPattern) -> Result<(), PatternError> {
    if pattern.strums.is_empty() {
        return Err(PatternError::Empty(pattern.id.clone()));
    }

    let per_bar = pattern.time_signature.beats;
    if per_bar == 0 || per_bar > MAX_BEATS_PER_BAR {
        return Err(PatternError::InvalidTimeSignature {
            pattern: pattern.id.clone(),
            beats: per_bar,
        });
    }

    let beats = u64::from(per_bar) * u64::from(pattern.bars.max(1));

    for (index, strum) in pattern.strums.iter().enumerate() {
        if strum.strings.is_empty() {
            return Err(PatternError::NoStrings {
                pattern: pattern.id.clone(),
                index,
            });
        }

        if let Some(&string) = strum
            .strings
            .iter()
            .find(|s| !(MIN_STRING..=MAX_STRING).contains(*s))
        {
            return Err(PatternError::StringOutOfRange {
                pattern: pattern.id.clone(),
                index,
                string,
            });
        }

        if !(0.0..1.0).contains(&strum.subdivision) {
            return Err(PatternError::SubdivisionOutOfRange {
                pattern: pattern.id.clone(),
                index,
                subdivision: strum.subdivision,
            });
        }

        if u64::from(strum.beat) >= beats {
            return Err(PatternError::BeatOutOfRange {
                pattern: pattern.id.clone(),
                index,
                beat: strum.beat,
                beats,
            });
        }
    }

    Ok(())
}

/// Parse a JSON array of patterns, validating each one
pub fn load_patterns_json(json: &str) -> Result<Vec<StrumPattern>, PatternError> {
    let patterns: Vec<StrumPattern> = serde_json::from_str(json)?;
    for pattern in &patterns {
        validate_pattern(pattern)?;
    }
    log::info!("Loaded {} strumming patterns", patterns.len());
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_json(strums: &str) -> String {
        format!(
            r#"[{{
                "id": "custom",
                "name": "Custom",
                "description": "Test pattern",
                "difficulty": "beginner",
                "timeSignature": {{ "beats": 4, "noteValue": 4 }},
                "bars": 1,
                "strums": {},
                "recommendedBPM": {{ "min": 60, "max": 100 }}
            }}]"#,
            strums
        )
    }

    #[test]
    fn test_load_valid_pattern() {
        let json = pattern_json(
            r#"[
                { "beat": 0, "subdivision": 0, "direction": "down", "strings": [1,2,3,4,5,6], "emphasis": true },
                { "beat": 0, "subdivision": 0.5, "direction": "up", "strings": [1,2,3,4] }
            ]"#,
        );

        let patterns = load_patterns_json(&json).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].strums.len(), 2);
        assert!(patterns[0].strums[0].emphasis);
        assert!(patterns[0].recommended_bpm.contains(80.0));
    }

    #[test]
    fn test_rejects_empty_pattern() {
        let err = load_patterns_json(&pattern_json("[]")).unwrap_err();
        assert!(matches!(err, PatternError::Empty(id) if id == "custom"));
    }

    #[test]
    fn test_rejects_bad_instructions() {
        let no_strings = pattern_json(r#"[{ "beat": 0, "subdivision": 0, "direction": "down", "strings": [] }]"#);
        assert!(matches!(
            load_patterns_json(&no_strings).unwrap_err(),
            PatternError::NoStrings { index: 0, .. }
        ));

        let bad_string = pattern_json(r#"[{ "beat": 0, "subdivision": 0, "direction": "down", "strings": [1, 7] }]"#);
        assert!(matches!(
            load_patterns_json(&bad_string).unwrap_err(),
            PatternError::StringOutOfRange { string: 7, .. }
        ));

        let bad_sub = pattern_json(r#"[{ "beat": 0, "subdivision": 1.0, "direction": "up", "strings": [1] }]"#);
        assert!(matches!(
            load_patterns_json(&bad_sub).unwrap_err(),
            PatternError::SubdivisionOutOfRange { .. }
        ));

        let bad_beat = pattern_json(r#"[{ "beat": 4, "subdivision": 0, "direction": "up", "strings": [1] }]"#);
        assert!(matches!(
            load_patterns_json(&bad_beat).unwrap_err(),
            PatternError::BeatOutOfRange { beat: 4, beats: 4, .. }
        ));
    }

    #[test]
    fn test_rejects_oversized_time_signature() {
        let json = r#"[{
            "id": "huge",
            "name": "Huge",
            "description": "Bar too long to schedule",
            "difficulty": "advanced",
            "timeSignature": { "beats": 4294967295, "noteValue": 4 },
            "bars": 2,
            "strums": [{ "beat": 0, "subdivision": 0, "direction": "down", "strings": [6] }],
            "recommendedBPM": { "min": 60, "max": 100 }
        }]"#;

        assert!(matches!(
            load_patterns_json(json).unwrap_err(),
            PatternError::InvalidTimeSignature { beats: 4294967295, .. }
        ));

        let zero = json.replace("4294967295", "0");
        assert!(matches!(
            load_patterns_json(&zero).unwrap_err(),
            PatternError::InvalidTimeSignature { beats: 0, .. }
        ));
    }

    #[test]
    fn test_many_bars_do_not_overflow() {
        let json = pattern_json(r#"[{ "beat": 7, "subdivision": 0, "direction": "down", "strings": [6] }]"#)
            .replace(r#""bars": 1"#, r#""bars": 4294967295"#);

        let patterns = load_patterns_json(&json).unwrap();
        assert_eq!(patterns[0].bars, u32::MAX);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            load_patterns_json("{ not json").unwrap_err(),
            PatternError::Json(_)
        ));
    }
}
