// Remote detection path: ship the frame's raw samples to the inference
// endpoint and map its response to a ChordDetection.
//
// Wire contract:
//   request  POST { "action": "detect_chord", "audioData": base64(pcm16le),
//                   "timestamp": <seconds> }
//   response      { "chord"?: string, "confidence"?: number }
//
// A missing "chord" means no detection. Any transport error, non-2xx status,
// or malformed body is logged and collapsed to None — the scheduler never
// sees an error from this path.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audio::frame::AudioFrame;
use crate::config::RemoteConfig;
use crate::error::{Error, Result};

use super::{ChordClassifier, ChordDetection, DetectionMethod};

const DETECT_ACTION: &str = "detect_chord";

#[derive(Debug, Serialize)]
struct DetectRequest {
    action: &'static str,
    #[serde(rename = "audioData")]
    audio_data: String,
    timestamp: f64,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    chord: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

pub struct RemoteChordClassifier {
    endpoint: String,
    client: Client,
}

impl RemoteChordClassifier {
    /// Build a classifier for the configured endpoint. The request timeout
    /// is enforced by the HTTP client for the whole round trip.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(Error::Config(
                "remote endpoint is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(RemoteChordClassifier {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

/// Quantize samples to 16-bit little-endian PCM and base64-encode them.
/// Samples are clamped to [-1, 1] first.
fn encode_pcm16(samples: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        bytes.extend_from_slice(&quantized.to_le_bytes());
    }
    BASE64.encode(&bytes)
}

#[async_trait]
impl ChordClassifier for RemoteChordClassifier {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Backend
    }

    async fn classify(&self, frame: &AudioFrame) -> Option<ChordDetection> {
        let request = DetectRequest {
            action: DETECT_ACTION,
            audio_data: encode_pcm16(&frame.samples),
            timestamp: frame.timestamp,
        };

        let response = match self.client.post(&self.endpoint).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "chord inference request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "chord inference returned an error status");
            return None;
        }

        let body: DetectResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to parse chord inference response");
                return None;
            }
        };

        let chord = body.chord?;
        // A present chord without a confidence fails the cutoff downstream
        let confidence = body.confidence.unwrap_or(0.0).clamp(0.0, 1.0);

        Some(ChordDetection {
            chord,
            confidence,
            timestamp: frame.timestamp,
            method: DetectionMethod::Backend,
        })
    }
}
