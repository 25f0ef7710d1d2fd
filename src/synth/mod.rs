//! This namespace contains all the parts converting from note names to scheduled tones.

pub mod envelope;
pub mod oscillator;
pub mod player;
pub mod tuning;

pub use envelope::{EnvelopeConfig, EnvelopeUpdate};
pub use oscillator::WaveShape;
pub use player::{Playback, TonePlayer};
