// Audio analysis (DSP)
// Modules: frame, spectrum, peaks, pitch, chord

pub mod chord;
pub mod frame;
pub mod peaks;
pub mod pitch;
pub mod spectrum;
