// One frame of captured audio as handed to the detector.

use super::spectrum::magnitude_spectrum;

/// A transient snapshot of the audio stream at one capture instant.
///
/// Frames are produced by the external capture/decode pipeline and are never
/// stored: the detector either analyzes a frame in the same scheduling turn
/// or drops it.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Mono time-domain samples, nominally in [-1, 1].
    pub samples: Vec<f32>,
    /// Normalized magnitude spectrum (1.0 ~ full-scale sine).
    pub spectrum: Vec<f32>,
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// Capture timestamp in seconds on the media clock.
    pub timestamp: f64,
}

impl AudioFrame {
    /// Build a frame from raw samples, computing the spectrum internally.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, timestamp: f64) -> Self {
        let spectrum = magnitude_spectrum(&samples);
        AudioFrame {
            samples,
            spectrum,
            sample_rate,
            timestamp,
        }
    }

    /// Build a frame from a precomputed magnitude spectrum.
    ///
    /// For callers whose capture pipeline already runs an FFT. The spectrum
    /// must use the same normalization as [`magnitude_spectrum`].
    pub fn from_spectrum(
        samples: Vec<f32>,
        spectrum: Vec<f32>,
        sample_rate: u32,
        timestamp: f64,
    ) -> Self {
        AudioFrame {
            samples,
            spectrum,
            sample_rate,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_samples_computes_spectrum() {
        let samples = vec![0.0f32; 1024];
        let frame = AudioFrame::from_samples(samples, 44100, 1.25);
        assert_eq!(frame.spectrum.len(), 512);
        assert_eq!(frame.sample_rate, 44100);
        assert_eq!(frame.timestamp, 1.25);
    }

    #[test]
    fn test_from_spectrum_keeps_given_spectrum() {
        let spectrum = vec![0.1, 0.2, 0.3];
        let frame = AudioFrame::from_spectrum(Vec::new(), spectrum.clone(), 48000, 0.0);
        assert_eq!(frame.spectrum, spectrum);
    }
}
