// Chord detection pipeline
// Modules: local, remote, scheduler, session

pub mod local;
pub mod remote;
pub mod scheduler;
pub mod session;

pub use local::LocalChordClassifier;
pub use remote::RemoteChordClassifier;
pub use session::DetectionSession;

use crate::audio::frame::AudioFrame;
use async_trait::async_trait;

/// Which analysis path produced (or should produce) a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// Local spectral analysis: peak extraction, pitch mapping, template
    /// matching.
    Local,
    /// Remote inference endpoint.
    Backend,
}

impl DetectionMethod {
    /// Stable string tag used in logs and the detection store.
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Local => "local",
            DetectionMethod::Backend => "backend",
        }
    }
}

/// One chord detection. Immutable once created; append-only when persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordDetection {
    /// Chord name from the dictionary (local) or the endpoint (backend).
    pub chord: String,
    /// Normalized confidence in [0, 1].
    pub confidence: f32,
    /// Media-clock timestamp (seconds) of the analyzed frame.
    pub timestamp: f64,
    /// Which path produced this detection.
    pub method: DetectionMethod,
}

/// Strategy seam between the two analysis paths.
///
/// A classifier never surfaces errors: any failure collapses to None so the
/// scheduler treats "failed", "silent", and "no chord" identically.
#[async_trait]
pub trait ChordClassifier: Send + Sync {
    /// Tag stamped on detections from this classifier.
    fn method(&self) -> DetectionMethod;

    /// Analyze one frame. The local implementation completes without
    /// suspending; the remote one awaits a network round trip.
    async fn classify(&self, frame: &AudioFrame) -> Option<ChordDetection>;
}

/// Receives accepted detections from a session.
pub trait ChordSink: Send + Sync {
    fn on_chord_detected(&self, detection: &ChordDetection);
}

impl<F> ChordSink for F
where
    F: Fn(&ChordDetection) + Send + Sync,
{
    fn on_chord_detected(&self, detection: &ChordDetection) {
        self(detection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_tags() {
        assert_eq!(DetectionMethod::Local.as_str(), "local");
        assert_eq!(DetectionMethod::Backend.as_str(), "backend");
    }

    #[test]
    fn test_closure_sink() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let sink: Arc<dyn ChordSink> = Arc::new(move |_: &ChordDetection| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let detection = ChordDetection {
            chord: "C".to_string(),
            confidence: 1.0,
            timestamp: 0.0,
            method: DetectionMethod::Local,
        };
        sink.on_chord_detected(&detection);
        sink.on_chord_detected(&detection);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
