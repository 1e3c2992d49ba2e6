// Chord template matching.
//
// The dictionary is a fixed, ordered slice of hand-curated triads. Slice
// order is part of the contract: when two templates score equally, the
// earlier one wins, so tie-breaking is reproducible across runs.
//
// Matching is pitch-class-set intersection: for each template,
//   matched = |template ∩ input|
//   score   = (matched / template.len()) × weight
// Templates sharing fewer than min_matches pitch classes with the input are
// skipped entirely. The best score wins. The matcher deliberately does NOT
// apply the acceptance cutoff — deciding whether the best match is good
// enough to deliver is the scheduler's job.

use super::pitch::{PitchClass, PitchClassSet};

use PitchClass::*;

/// One recognizable chord: a name, its required pitch classes, and a weight.
#[derive(Debug, Clone, Copy)]
pub struct ChordTemplate {
    pub name: &'static str,
    pub pitch_classes: &'static [PitchClass],
    pub weight: f32,
}

/// The fixed chord dictionary: six common major triads and their relative
/// minors. Iteration order (majors first, then minors) is the tie-break
/// order.
pub const CHORD_DICTIONARY: &[ChordTemplate] = &[
    ChordTemplate { name: "C", pitch_classes: &[C, E, G], weight: 1.0 },
    ChordTemplate { name: "D", pitch_classes: &[D, FSharp, A], weight: 1.0 },
    ChordTemplate { name: "E", pitch_classes: &[E, GSharp, B], weight: 1.0 },
    ChordTemplate { name: "F", pitch_classes: &[F, A, C], weight: 1.0 },
    ChordTemplate { name: "G", pitch_classes: &[G, B, D], weight: 1.0 },
    ChordTemplate { name: "A", pitch_classes: &[A, CSharp, E], weight: 1.0 },
    ChordTemplate { name: "Am", pitch_classes: &[A, C, E], weight: 1.0 },
    ChordTemplate { name: "Bm", pitch_classes: &[B, D, FSharp], weight: 1.0 },
    ChordTemplate { name: "C#m", pitch_classes: &[CSharp, E, GSharp], weight: 1.0 },
    ChordTemplate { name: "Dm", pitch_classes: &[D, F, A], weight: 1.0 },
    ChordTemplate { name: "Em", pitch_classes: &[E, G, B], weight: 1.0 },
    ChordTemplate { name: "F#m", pitch_classes: &[FSharp, A, CSharp], weight: 1.0 },
];

/// The best template match for a pitch-class set.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordMatch {
    /// Name of the winning template.
    pub name: &'static str,
    /// Raw match score in [0, 1]: (matched / template size) × weight.
    pub score: f32,
    /// How many of the template's pitch classes were present.
    pub matched: usize,
}

/// Score the input against every template and return the best match, or
/// None when no template shares at least `min_matches` pitch classes.
pub fn match_chord(input: PitchClassSet, min_matches: usize) -> Option<ChordMatch> {
    let mut best: Option<ChordMatch> = None;

    for template in CHORD_DICTIONARY {
        let matched = template
            .pitch_classes
            .iter()
            .filter(|&&pc| input.contains(pc))
            .count();

        if matched < min_matches {
            continue;
        }

        let score = (matched as f32 / template.pitch_classes.len() as f32) * template.weight;

        // Strict > keeps the earliest template on ties
        let is_better = match &best {
            Some(current) => score > current.score,
            None => true,
        };
        if is_better {
            best = Some(ChordMatch {
                name: template.name,
                score,
                matched,
            });
        }
    }

    best
}
