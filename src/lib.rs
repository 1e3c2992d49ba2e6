// Real-time chord detection.
//
// Pipeline: AudioFrame -> DetectionSession (debounce/throttle gate) ->
// { local spectral analysis | remote inference } -> ChordDetection ->
// sink callback + optional append-only SQLite log.
//
// The crate is headless: audio capture/decoding, the UI consuming
// detections, and the inference endpoint itself are external collaborators.
// Nothing here installs a tracing subscriber or spawns anything outside the
// per-session scheduler task.

// Modules
pub mod audio;
pub mod config;
pub mod db;
pub mod detect;
pub mod error;

pub use audio::frame::AudioFrame;
pub use config::{DetectorConfig, RemoteConfig};
pub use db::{DetectionRecord, DetectionStore};
pub use detect::{
    ChordClassifier, ChordDetection, ChordSink, DetectionMethod, DetectionSession,
    LocalChordClassifier, RemoteChordClassifier,
};
pub use error::{Error, Result};
