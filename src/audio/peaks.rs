// Spectral peak extraction: magnitude spectrum -> candidate fundamentals.
//
// A bin is a peak when it exceeds both neighbors and the absolute magnitude
// floor. Peaks outside the configured musical range are discarded, the rest
// are sorted by descending magnitude and truncated to the configured maximum.
// Silence (or an all-sub-floor spectrum) yields an empty list, which ends the
// local detection attempt with no chord and no error.

use crate::config::DetectorConfig;

/// A candidate fundamental: a spectral peak inside the musical range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fundamental {
    /// Peak frequency in Hz (bin center).
    pub frequency: f32,
    /// Normalized linear magnitude at the peak.
    pub magnitude: f32,
}

/// Extract up to `config.max_fundamentals` candidate fundamentals from a
/// magnitude spectrum.
///
/// The spectrum covers DC..Nyquist, so bin width = sample_rate / (2 * bins).
/// Spectra with fewer than 3 bins have no interior bins and yield an empty
/// list.
pub fn extract_fundamentals(
    spectrum: &[f32],
    sample_rate: u32,
    config: &DetectorConfig,
) -> Vec<Fundamental> {
    let n = spectrum.len();
    if n < 3 {
        return Vec::new();
    }

    let bin_width = sample_rate as f32 / (2.0 * n as f32);
    let floor = 10.0_f32.powf(config.peak_floor_db / 20.0);

    let mut peaks: Vec<Fundamental> = Vec::new();
    for i in 1..n - 1 {
        let mag = spectrum[i];
        if mag > spectrum[i - 1] && mag > spectrum[i + 1] && mag > floor {
            let frequency = i as f32 * bin_width;
            if frequency >= config.min_freq && frequency <= config.max_freq {
                peaks.push(Fundamental {
                    frequency,
                    magnitude: mag,
                });
            }
        }
    }

    peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    peaks.truncate(config.max_fundamentals);
    peaks
}
