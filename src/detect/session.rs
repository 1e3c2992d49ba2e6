// Per-source detection session: the public handle around the scheduler loop.
//
// Each session owns its own scheduler state on a dedicated tokio task; no
// state is shared across sessions. The handle is cheap to use from a capture
// callback: submit_frame is synchronous and infallible from the producer's
// point of view (a frame that cannot be delivered is simply dropped, which
// matches the pipeline's lossy contract).

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::audio::frame::AudioFrame;
use crate::config::DetectorConfig;
use crate::db::DetectionStore;
use crate::error::Result;

use super::scheduler::{Command, SchedulerLoop};
use super::{
    ChordClassifier, ChordSink, DetectionMethod, LocalChordClassifier, RemoteChordClassifier,
};

/// Handle to one audio source's detection pipeline.
///
/// Dropping the handle (or calling [`close`](Self::close)) shuts the loop
/// down; any attempt still in flight is fenced out and its result discarded.
pub struct DetectionSession {
    tx: mpsc::UnboundedSender<Command>,
}

impl DetectionSession {
    /// Spawn a session for `source_id`. The classifier is chosen once from
    /// `config.method`; a Backend session fails here if the remote endpoint
    /// is not configured. Must be called within a tokio runtime.
    pub fn spawn(
        source_id: &str,
        config: DetectorConfig,
        sink: Arc<dyn ChordSink>,
        store: Option<Arc<Mutex<DetectionStore>>>,
    ) -> Result<Self> {
        let classifier: Arc<dyn ChordClassifier> = match config.method {
            DetectionMethod::Local => Arc::new(LocalChordClassifier::new(config.clone())),
            DetectionMethod::Backend => Arc::new(RemoteChordClassifier::new(&config.remote)?),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = SchedulerLoop::new(source_id, config, classifier, sink, store, rx);
        tokio::spawn(scheduler.run());

        Ok(DetectionSession { tx })
    }

    /// Hand a frame to the scheduler. Never blocks and never fails: frames
    /// submitted after close are silently dropped.
    pub fn submit_frame(&self, frame: AudioFrame) {
        let _ = self.tx.send(Command::Frame(frame));
    }

    /// Gate the whole pipeline. Disabling cancels any pending debounce and
    /// discards the result of any attempt already in flight.
    pub fn set_enabled(&self, enabled: bool) {
        let _ = self.tx.send(Command::SetEnabled(enabled));
    }

    /// Shut the scheduler loop down. Idempotent.
    pub fn close(&self) {
        let _ = self.tx.send(Command::Close);
    }
}
