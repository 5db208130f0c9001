// Built-in strumming patterns

use crate::strum::types::{
    BpmRange, Difficulty, PatternTimeSignature, StrumDirection, StrumInstruction, StrumPattern,
};

/// All six strings for full strums
const ALL_STRINGS: [u8; 6] = [1, 2, 3, 4, 5, 6];

/// Top four strings for lighter strums
const TOP_4_STRINGS: [u8; 4] = [1, 2, 3, 4];

const FOUR_FOUR: PatternTimeSignature = PatternTimeSignature {
    beats: 4,
    note_value: 4,
};

fn down(beat: u32, subdivision: f64, strings: &[u8]) -> StrumInstruction {
    StrumInstruction::new(beat, subdivision, StrumDirection::Down, strings)
}

fn up(beat: u32, subdivision: f64, strings: &[u8]) -> StrumInstruction {
    StrumInstruction::new(beat, subdivision, StrumDirection::Up, strings)
}

fn pattern(
    id: &str,
    name: &str,
    description: &str,
    difficulty: Difficulty,
    strums: Vec<StrumInstruction>,
    bpm: (f64, f64),
) -> StrumPattern {
    StrumPattern {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        difficulty,
        time_signature: FOUR_FOUR,
        bars: 1,
        strums,
        recommended_bpm: BpmRange {
            min: bpm.0,
            max: bpm.1,
        },
    }
}

/// Down on every beat with all strings, up on the "and" with the top four
fn eighths_down_up() -> Vec<StrumInstruction> {
    (0..4)
        .flat_map(|beat| {
            let first = down(beat, 0.0, &ALL_STRINGS);
            let first = if beat == 0 { first.accented() } else { first };
            [first, up(beat, 0.5, &TOP_4_STRINGS)]
        })
        .collect()
}

pub(super) fn basic_down() -> StrumPattern {
    pattern(
        "basic-down",
        "Basic Downstrokes",
        "Four downstrokes per bar - the simplest pattern",
        Difficulty::Beginner,
        vec![
            down(0, 0.0, &ALL_STRINGS).accented(),
            down(1, 0.0, &ALL_STRINGS),
            down(2, 0.0, &ALL_STRINGS),
            down(3, 0.0, &ALL_STRINGS),
        ],
        (60.0, 100.0),
    )
}

pub(super) fn down_up_simple() -> StrumPattern {
    pattern(
        "down-up-simple",
        "Simple Down-Up",
        "Down on the beat, up on the offbeat (eighth notes)",
        Difficulty::Beginner,
        eighths_down_up(),
        (50.0, 90.0),
    )
}

pub(super) fn old_faithful() -> StrumPattern {
    pattern(
        "old-faithful",
        "Old Faithful (D-DU-UDU)",
        "Classic country/folk pattern: Down, Down-Up, Up-Down-Up",
        Difficulty::Intermediate,
        vec![
            down(0, 0.0, &ALL_STRINGS).accented(),
            down(1, 0.0, &ALL_STRINGS),
            up(1, 0.5, &TOP_4_STRINGS),
            up(2, 0.5, &TOP_4_STRINGS),
            down(3, 0.0, &ALL_STRINGS),
            up(3, 0.5, &TOP_4_STRINGS),
        ],
        (60.0, 110.0),
    )
}

pub(super) fn common_time() -> StrumPattern {
    pattern(
        "common-time",
        "Common Time",
        "Down on 1,2,3,4 and up on all the \"ands\"",
        Difficulty::Beginner,
        eighths_down_up(),
        (60.0, 120.0),
    )
}

pub(super) fn bass_strum() -> StrumPattern {
    let bass = |beat: u32| if beat % 2 == 0 { [6u8] } else { [5u8] };
    let strums = (0..4)
        .flat_map(|beat| {
            let root = down(beat, 0.0, &bass(beat));
            let root = if beat == 0 { root.accented() } else { root };
            [root, down(beat, 0.5, &TOP_4_STRINGS)]
        })
        .collect();

    pattern(
        "bass-strum",
        "Bass-Strum Pattern",
        "Alternating bass notes and strums (fingerstyle transition)",
        Difficulty::Intermediate,
        strums,
        (50.0, 90.0),
    )
}

pub(super) fn reggae_skank() -> StrumPattern {
    let strums = (0..4)
        .map(|beat| {
            let skank = up(beat, 0.5, &[2, 3, 4]);
            if beat == 0 {
                skank.accented()
            } else {
                skank
            }
        })
        .collect();

    pattern(
        "reggae-skank",
        "Reggae Skank",
        "Upstrokes on the offbeat - classic reggae feel",
        Difficulty::Intermediate,
        strums,
        (70.0, 110.0),
    )
}

pub(super) fn boom_chicka() -> StrumPattern {
    let strums = (0..4)
        .flat_map(|beat| {
            let boom = down(beat, 0.0, &[4, 5, 6]);
            let boom = if beat == 0 { boom.accented() } else { boom };
            [boom, down(beat, 0.5, &[1, 2, 3])]
        })
        .collect();

    pattern(
        "boom-chicka",
        "Boom-Chicka",
        "Country/Johnny Cash pattern with bass emphasis",
        Difficulty::Intermediate,
        strums,
        (80.0, 140.0),
    )
}

pub(super) fn sixteenth_note() -> StrumPattern {
    let strums = (0..4)
        .flat_map(|beat| {
            let first = down(beat, 0.0, &ALL_STRINGS);
            let first = if beat == 0 { first.accented() } else { first };
            [
                first,
                up(beat, 0.25, &TOP_4_STRINGS),
                down(beat, 0.5, &ALL_STRINGS),
                up(beat, 0.75, &TOP_4_STRINGS),
            ]
        })
        .collect();

    pattern(
        "sixteenth-note",
        "16th Note Pattern",
        "Fast down-up pattern with all sixteenth notes",
        Difficulty::Advanced,
        strums,
        (40.0, 80.0),
    )
}
