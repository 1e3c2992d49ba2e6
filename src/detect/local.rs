// Local detection path: peak extraction -> pitch mapping -> template match.

use async_trait::async_trait;
use tracing::debug;

use crate::audio::chord::match_chord;
use crate::audio::frame::AudioFrame;
use crate::audio::peaks::extract_fundamentals;
use crate::audio::pitch::{pitch_class_for, PitchClassSet};
use crate::config::DetectorConfig;

use super::{ChordClassifier, ChordDetection, DetectionMethod};

/// Runs the whole local pipeline over a frame's spectrum. Synchronous in
/// practice: `classify` completes without suspending.
pub struct LocalChordClassifier {
    config: DetectorConfig,
}

impl LocalChordClassifier {
    pub fn new(config: DetectorConfig) -> Self {
        LocalChordClassifier { config }
    }
}

#[async_trait]
impl ChordClassifier for LocalChordClassifier {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Local
    }

    async fn classify(&self, frame: &AudioFrame) -> Option<ChordDetection> {
        let fundamentals =
            extract_fundamentals(&frame.spectrum, frame.sample_rate, &self.config);
        if fundamentals.is_empty() {
            debug!(timestamp = frame.timestamp, "no spectral peaks above floor");
            return None;
        }

        let pitch_classes: PitchClassSet = fundamentals
            .iter()
            .filter_map(|f| pitch_class_for(f.frequency))
            .collect();

        let chord_match = match match_chord(pitch_classes, self.config.min_matches) {
            Some(m) => m,
            None => {
                debug!(
                    timestamp = frame.timestamp,
                    pitch_classes = pitch_classes.len(),
                    "no template reached the minimum match count"
                );
                return None;
            }
        };

        Some(ChordDetection {
            chord: chord_match.name.to_string(),
            confidence: chord_match.score,
            timestamp: frame.timestamp,
            method: DetectionMethod::Local,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// Generate a chord frame (multiple frequencies summed and normalized).
    fn chord_frame(frequencies: &[f32], timestamp: f64) -> AudioFrame {
        let sample_rate = 44100;
        let n_freqs = frequencies.len() as f32;
        let samples: Vec<f32> = (0..4096)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                let sum: f32 = frequencies
                    .iter()
                    .map(|&freq| (2.0 * PI * freq * t).sin())
                    .sum();
                sum / n_freqs
            })
            .collect();
        AudioFrame::from_samples(samples, sample_rate, timestamp)
    }

    #[tokio::test]
    async fn test_c_major_chord_detected() {
        let classifier = LocalChordClassifier::new(DetectorConfig::default());
        // C4 + E4 + G4
        let frame = chord_frame(&[261.63, 329.63, 392.00], 2.5);
        let detection = classifier
            .classify(&frame)
            .await
            .expect("C-E-G should detect a chord");

        assert_eq!(detection.chord, "C");
        assert!(
            detection.confidence > 0.9,
            "full triad should score high, got {:.3}",
            detection.confidence
        );
        assert_eq!(detection.timestamp, 2.5);
        assert_eq!(detection.method, DetectionMethod::Local);
    }

    #[tokio::test]
    async fn test_silence_yields_nothing() {
        let classifier = LocalChordClassifier::new(DetectorConfig::default());
        let frame = AudioFrame::from_samples(vec![0.0; 4096], 44100, 0.0);
        assert_eq!(classifier.classify(&frame).await, None);
    }

    #[tokio::test]
    async fn test_single_tone_is_insufficient_evidence() {
        let classifier = LocalChordClassifier::new(DetectorConfig::default());
        let frame = chord_frame(&[440.0], 0.0);
        assert_eq!(
            classifier.classify(&frame).await,
            None,
            "one pitch class cannot reach the two-match floor"
        );
    }
}
