// Detection pipeline configuration.
//
// Every tuning constant the pipeline uses lives here as a named default on
// DetectorConfig / RemoteConfig. Nothing in the pipeline reads a bare literal:
// callers can override any knob per session without touching the analysis code.

use std::time::Duration;

use crate::detect::DetectionMethod;

/// Minimum enforced gap between two dispatched detection attempts for one
/// audio source, measured in frame media time.
/// Chords rarely change faster than once a second in practice, and each
/// attempt costs either an FFT walk or a network round trip.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1500);

/// Trailing debounce applied before the throttle check.
/// Frames typically arrive once per ~100ms of decoded audio; coalescing a
/// burst means only the most recent frame is ever analyzed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Detections scoring at or below this confidence are discarded before
/// delivery. Matching two of three triad notes scores ~0.67, so the cutoff
/// admits two-note evidence but rejects weaker template overlap.
pub const DEFAULT_CONFIDENCE_CUTOFF: f32 = 0.5;

/// Absolute magnitude floor for spectral peaks, in dB relative to a
/// full-scale sine (0 dBFS). -40 dB = 0.01 linear.
pub const DEFAULT_PEAK_FLOOR_DB: f32 = -40.0;

/// Musical range considered for candidate fundamentals (Hz).
/// Below ~80Hz bass rumble and noise dominate; above ~2000Hz harmonics
/// rather than fundamentals dominate.
pub const DEFAULT_MIN_FREQ: f32 = 80.0;
pub const DEFAULT_MAX_FREQ: f32 = 2000.0;

/// Maximum number of candidate fundamentals fed to the matcher.
pub const DEFAULT_MAX_FUNDAMENTALS: usize = 6;

/// Minimum pitch classes a chord template must share with the input
/// before it is considered at all.
pub const DEFAULT_MIN_MATCHES: usize = 2;

/// Request timeout for the remote inference endpoint.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tuning knobs for one detection session.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Which analysis path to run: local spectral analysis or the remote
    /// inference endpoint. Chosen once at session construction.
    pub method: DetectionMethod,
    /// Minimum media-time gap between dispatched attempts.
    pub throttle: Duration,
    /// Trailing debounce that coalesces frame bursts.
    pub debounce: Duration,
    /// Detections must score strictly above this to be delivered.
    pub confidence_cutoff: f32,
    /// Spectral peak floor in dBFS.
    pub peak_floor_db: f32,
    /// Lower bound of the candidate fundamental range (Hz).
    pub min_freq: f32,
    /// Upper bound of the candidate fundamental range (Hz).
    pub max_freq: f32,
    /// At most this many fundamentals are kept per frame.
    pub max_fundamentals: usize,
    /// Minimum template/input pitch-class overlap for a match.
    pub min_matches: usize,
    /// Remote endpoint settings (only used when method is Backend).
    pub remote: RemoteConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            method: DetectionMethod::Local,
            throttle: DEFAULT_THROTTLE,
            debounce: DEFAULT_DEBOUNCE,
            confidence_cutoff: DEFAULT_CONFIDENCE_CUTOFF,
            peak_floor_db: DEFAULT_PEAK_FLOOR_DB,
            min_freq: DEFAULT_MIN_FREQ,
            max_freq: DEFAULT_MAX_FREQ,
            max_fundamentals: DEFAULT_MAX_FUNDAMENTALS,
            min_matches: DEFAULT_MIN_MATCHES,
            remote: RemoteConfig::default(),
        }
    }
}

/// Settings for the remote inference endpoint.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// URL the detection request is POSTed to. Must be set before a
    /// Backend session can be constructed.
    pub endpoint: String,
    /// Whole-request timeout enforced by the HTTP client.
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            endpoint: String::new(),
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_preserve_tuned_values() {
        let config = DetectorConfig::default();
        assert_eq!(config.throttle, Duration::from_millis(1500));
        assert_eq!(config.debounce, Duration::from_millis(100));
        assert_eq!(config.confidence_cutoff, 0.5);
        assert_eq!(config.peak_floor_db, -40.0);
        assert_eq!(config.min_freq, 80.0);
        assert_eq!(config.max_freq, 2000.0);
        assert_eq!(config.max_fundamentals, 6);
        assert_eq!(config.min_matches, 2);
        assert_eq!(config.method, DetectionMethod::Local);
        assert_eq!(config.remote.timeout, Duration::from_secs(10));
    }
}
