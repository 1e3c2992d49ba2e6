// Detection scheduling: debounce, throttle, in-flight guard, delivery.
//
// Per-source state machine: Idle -> Debouncing -> Detecting -> Idle, with no
// durable error state. Frames are lossy by design:
// - While an attempt is in flight, arriving frames are dropped outright.
// - Bursts are coalesced by a trailing debounce; each new frame replaces the
//   pending one, so only the most recent frame at dispatch time is analyzed.
// - A frame surviving the debounce is still dropped if it falls inside the
//   throttle window of the last dispatch (media time).
//
// The throttle compares frame media timestamps, which keeps delivered
// timestamps monotonically non-decreasing per session: a frame older than
// the last dispatch always lands inside the window. The debounce runs on the
// tokio clock so tests can pause and step it.
//
// Late completions: every dispatch captures the session generation; disable
// and shutdown bump it, and a completion whose captured generation no longer
// matches is discarded instead of delivered.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::audio::frame::AudioFrame;
use crate::config::DetectorConfig;
use crate::db::DetectionStore;

use super::{ChordClassifier, ChordDetection, ChordSink, DetectionMethod};

/// Messages from the session handle to the scheduler loop.
pub(crate) enum Command {
    Frame(AudioFrame),
    SetEnabled(bool),
    Close,
}

/// Gating state for one audio source.
///
/// Only the scheduler loop mutates this; the in-flight guard and generation
/// are atomics because spawned remote attempts clear/read them on
/// completion.
pub(crate) struct Gate {
    enabled: bool,
    throttle_secs: f64,
    last_dispatch_ts: Option<f64>,
    in_flight: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl Gate {
    pub(crate) fn new(config: &DetectorConfig) -> Self {
        Gate {
            enabled: true,
            throttle_secs: config.throttle.as_secs_f64(),
            last_dispatch_ts: None,
            in_flight: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// May a fresh frame enter the debounce? False while disabled or while
    /// an attempt is in flight.
    pub(crate) fn accepts_frame(&self) -> bool {
        self.enabled && !self.in_flight.load(Ordering::SeqCst)
    }

    /// May the debounced frame be dispatched now? Re-checks the in-flight
    /// guard and applies the throttle window in media time.
    pub(crate) fn should_dispatch(&self, timestamp: f64) -> bool {
        if !self.enabled || self.in_flight.load(Ordering::SeqCst) {
            return false;
        }
        match self.last_dispatch_ts {
            None => true,
            Some(last) => timestamp - last >= self.throttle_secs,
        }
    }

    /// Record a dispatch: set the guard, advance the throttle anchor, and
    /// return the generation this attempt belongs to.
    pub(crate) fn mark_dispatched(&mut self, timestamp: f64) -> u64 {
        self.in_flight.store(true, Ordering::SeqCst);
        self.last_dispatch_ts = Some(timestamp);
        self.generation.load(Ordering::SeqCst)
    }

    /// Enable or disable the gate. Disabling fences out any in-flight
    /// completion by bumping the generation.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.invalidate();
        }
        self.enabled = enabled;
    }

    /// Bump the generation so completions dispatched before this call are
    /// discarded at delivery.
    pub(crate) fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn in_flight_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.in_flight)
    }

    fn generation_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.generation)
    }
}

/// Everything needed to finish an attempt: release the guard, fence stale
/// results, apply the cutoff, deliver to the sink, append to the store.
/// Cloneable so remote attempts can carry it into a spawned task.
#[derive(Clone)]
struct Completion {
    source_id: Arc<str>,
    confidence_cutoff: f32,
    sink: Arc<dyn ChordSink>,
    store: Option<Arc<Mutex<DetectionStore>>>,
    in_flight: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl Completion {
    fn finish(&self, dispatched_generation: u64, result: Option<ChordDetection>) {
        // The guard is released on every path, including stale and rejected
        // results, so the next qualifying frame can start fresh.
        self.in_flight.store(false, Ordering::SeqCst);

        let Some(detection) = result else {
            return;
        };

        if self.generation.load(Ordering::SeqCst) != dispatched_generation {
            debug!(
                source = %self.source_id,
                chord = %detection.chord,
                "discarding detection from a superseded attempt"
            );
            return;
        }

        if detection.confidence <= self.confidence_cutoff {
            debug!(
                source = %self.source_id,
                chord = %detection.chord,
                confidence = detection.confidence,
                "detection below confidence cutoff"
            );
            return;
        }

        info!(
            source = %self.source_id,
            chord = %detection.chord,
            confidence = detection.confidence,
            timestamp = detection.timestamp,
            method = detection.method.as_str(),
            "chord detected"
        );
        self.sink.on_chord_detected(&detection);

        // Persistence is decoupled from delivery: a store failure never
        // undoes or blocks the callback.
        if let Some(store) = &self.store {
            match store.lock() {
                Ok(store) => {
                    if let Err(e) = store.append(&self.source_id, &detection) {
                        warn!(source = %self.source_id, error = %e, "failed to persist detection");
                    }
                }
                Err(_) => {
                    warn!(source = %self.source_id, "detection store mutex poisoned");
                }
            }
        }
    }
}

/// The per-source scheduler loop. Owned by the task a DetectionSession
/// spawns; consumes commands until the channel closes.
pub(crate) struct SchedulerLoop {
    config: DetectorConfig,
    classifier: Arc<dyn ChordClassifier>,
    rx: UnboundedReceiver<Command>,
    gate: Gate,
    completion: Completion,
}

impl SchedulerLoop {
    pub(crate) fn new(
        source_id: &str,
        config: DetectorConfig,
        classifier: Arc<dyn ChordClassifier>,
        sink: Arc<dyn ChordSink>,
        store: Option<Arc<Mutex<DetectionStore>>>,
        rx: UnboundedReceiver<Command>,
    ) -> Self {
        let gate = Gate::new(&config);
        let completion = Completion {
            source_id: Arc::from(source_id),
            confidence_cutoff: config.confidence_cutoff,
            sink,
            store,
            in_flight: gate.in_flight_handle(),
            generation: gate.generation_handle(),
        };
        SchedulerLoop {
            config,
            classifier,
            rx,
            gate,
            completion,
        }
    }

    pub(crate) async fn run(mut self) {
        // The frame (if any) waiting out the debounce, with its deadline.
        let mut pending: Option<(AudioFrame, Instant)> = None;

        loop {
            let deadline = pending
                .as_ref()
                .map(|(_, deadline)| *deadline)
                .unwrap_or_else(Instant::now);

            tokio::select! {
                command = self.rx.recv() => match command {
                    None | Some(Command::Close) => break,
                    Some(Command::SetEnabled(enabled)) => {
                        if !enabled {
                            pending = None;
                        }
                        self.gate.set_enabled(enabled);
                    }
                    Some(Command::Frame(frame)) => {
                        if self.gate.accepts_frame() {
                            // Replace any pending frame and re-arm the timer
                            let deadline = Instant::now() + self.config.debounce;
                            pending = Some((frame, deadline));
                        } else {
                            debug!(
                                source = %self.completion.source_id,
                                timestamp = frame.timestamp,
                                "frame dropped (disabled or attempt in flight)"
                            );
                        }
                    }
                },
                _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    if let Some((frame, _)) = pending.take() {
                        if self.gate.should_dispatch(frame.timestamp) {
                            self.dispatch(frame).await;
                        } else {
                            debug!(
                                source = %self.completion.source_id,
                                timestamp = frame.timestamp,
                                "frame dropped (inside throttle window)"
                            );
                        }
                    }
                }
            }
        }

        // Fence out any attempt still in flight at shutdown
        self.gate.invalidate();
    }

    async fn dispatch(&mut self, frame: AudioFrame) {
        let generation = self.gate.mark_dispatched(frame.timestamp);

        match self.classifier.method() {
            // The local path completes without suspending, so running it
            // inline keeps the loop turn short
            DetectionMethod::Local => {
                let result = self.classifier.classify(&frame).await;
                self.completion.finish(generation, result);
            }
            // The remote path is the one suspension point: spawn it so the
            // loop keeps draining (and dropping) frames while the call is
            // outstanding
            DetectionMethod::Backend => {
                let classifier = Arc::clone(&self.classifier);
                let completion = self.completion.clone();
                tokio::spawn(async move {
                    let result = classifier.classify(&frame).await;
                    completion.finish(generation, result);
                });
            }
        }
    }
}
