// Pitch classes and frequency-to-pitch-class mapping (12-TET, A4=440Hz).

use std::fmt;

/// The 12 equal-tempered pitch classes, independent of octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes in semitone order starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Note name using sharps ("C", "C#", ..., "B").
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Semitone index within the octave (C=0 ... B=11).
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A deduplicated set of pitch classes, stored as a 12-bit mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub fn new() -> Self {
        PitchClassSet(0)
    }

    pub fn insert(&mut self, pc: PitchClass) {
        self.0 |= 1 << pc.index();
    }

    pub fn contains(&self, pc: PitchClass) -> bool {
        self.0 & (1 << pc.index()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = PitchClass>>(iter: I) -> Self {
        let mut set = PitchClassSet::new();
        for pc in iter {
            set.insert(pc);
        }
        set
    }
}

/// Map a frequency to its nearest equal-tempered pitch class.
///
/// Reference C0 = 440 × 2^(-4.75) ≈ 16.35Hz. The semitone number
/// h = round(12·log2(freq / C0)) determines both octave (h / 12) and pitch
/// class (h mod 12). Frequencies outside octaves 0–9, non-positive, or
/// non-finite return None. Pure function: no hidden state.
pub fn pitch_class_for(freq: f32) -> Option<PitchClass> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }

    let c0 = 440.0_f64 * (-4.75_f64).exp2();
    let h = (12.0 * (freq as f64 / c0).log2()).round() as i64;

    let octave = h.div_euclid(12);
    if !(0..=9).contains(&octave) {
        return None;
    }

    Some(PitchClass::ALL[h.rem_euclid(12) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_maps_to_a() {
        assert_eq!(pitch_class_for(440.0), Some(PitchClass::A));
    }

    #[test]
    fn test_middle_c_maps_to_c() {
        assert_eq!(pitch_class_for(261.63), Some(PitchClass::C));
    }

    #[test]
    fn test_all_octaves_of_e() {
        // E across several octaves should always map to E
        for octave in 1..=7 {
            let freq = 20.60 * (1 << octave) as f32; // E0 ≈ 20.60Hz
            assert_eq!(
                pitch_class_for(freq),
                Some(PitchClass::E),
                "E at octave {} ({:.1}Hz) should map to E",
                octave,
                freq
            );
        }
    }

    #[test]
    fn test_out_of_range_octaves_rejected() {
        // Below octave 0 (C0 ≈ 16.35Hz)
        assert_eq!(pitch_class_for(8.0), None);
        // Above octave 9
        assert_eq!(pitch_class_for(20000.0), None);
    }

    #[test]
    fn test_invalid_frequencies_rejected() {
        assert_eq!(pitch_class_for(0.0), None);
        assert_eq!(pitch_class_for(-440.0), None);
        assert_eq!(pitch_class_for(f32::NAN), None);
        assert_eq!(pitch_class_for(f32::INFINITY), None);
    }

    #[test]
    fn test_mapping_is_pure() {
        for _ in 0..10 {
            assert_eq!(pitch_class_for(329.63), Some(PitchClass::E));
        }
    }

    #[test]
    fn test_set_deduplicates() {
        let set: PitchClassSet = [PitchClass::C, PitchClass::E, PitchClass::C]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(PitchClass::C));
        assert!(set.contains(PitchClass::E));
        assert!(!set.contains(PitchClass::G));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PitchClass::CSharp.to_string(), "C#");
        assert_eq!(PitchClass::B.to_string(), "B");
        let names: Vec<&str> = PitchClass::ALL.iter().map(|pc| pc.name()).collect();
        assert_eq!(
            names,
            ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"]
        );
    }
}
