// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Attack-release envelopes and the settings that shape every played tone.

use super::oscillator::WaveShape;

/// Gain reached at the end of the attack phase.
pub const PEAK_GAIN: f64 = 0.7;
/// Gain at the end of the release phase. Kept slightly above zero.
pub const RELEASE_FLOOR: f64 = 0.001;
/// Time in seconds the oscillator keeps running after the release ramp ended.
pub const STOP_TAIL: f64 = 0.1;

/// The settings applied to every tone that is played.
///
/// When a key is pressed, the amplitude rises linearly from zero to [`PEAK_GAIN`]
/// over `attack` seconds, and then immediately falls back to [`RELEASE_FLOOR`]
/// over the next `release` seconds.
///
/// Neither time is validated here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    pub waveform: WaveShape,
    /// Time in seconds to go from silence to the peak.
    pub attack: f64,
    /// Time in seconds to go from the peak back to (almost) silence.
    pub release: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        EnvelopeConfig {
            waveform: WaveShape::Sine,
            attack: 0.1,
            release: 0.5,
        }
    }
}

/// A partial [`EnvelopeConfig`]. Fields that are `None` are left untouched on merge.
///
/// ```
/// use synthwave::synth::envelope::*;
/// use synthwave::synth::oscillator::WaveShape;
///
/// let mut config = EnvelopeConfig::default();
/// config.merge(EnvelopeUpdate::attack(0.2));
/// assert_eq!(config.attack, 0.2);
/// assert_eq!(config.release, 0.5);
/// assert_eq!(config.waveform, WaveShape::Sine);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvelopeUpdate {
    pub waveform: Option<WaveShape>,
    pub attack: Option<f64>,
    pub release: Option<f64>,
}

impl EnvelopeUpdate {
    pub fn waveform(waveform: WaveShape) -> Self {
        EnvelopeUpdate {
            waveform: Some(waveform),
            ..Default::default()
        }
    }

    pub fn attack(attack: f64) -> Self {
        EnvelopeUpdate {
            attack: Some(attack),
            ..Default::default()
        }
    }

    pub fn release(release: f64) -> Self {
        EnvelopeUpdate {
            release: Some(release),
            ..Default::default()
        }
    }
}

impl EnvelopeConfig {
    /// Overwrite the fields present in `update`, keeping all others.
    pub fn merge(&mut self, update: EnvelopeUpdate) {
        if let Some(waveform) = update.waveform {
            self.waveform = waveform;
        }
        if let Some(attack) = update.attack {
            self.attack = attack;
        }
        if let Some(release) = update.release {
            self.release = release;
        }
    }

    /// Audible length of a tone, excluding the stop tail.
    pub fn duration(&self) -> f64 {
        self.attack + self.release
    }

    /// Compute the absolute times of the envelope for a tone starting at `start`.
    pub fn schedule(&self, start: f64) -> EnvelopeSchedule {
        let peak_at = start + self.attack;
        let floor_at = peak_at + self.release;
        EnvelopeSchedule {
            start,
            peak_at,
            floor_at,
            stop_at: floor_at + STOP_TAIL,
        }
    }
}

/// Absolute context times of one scheduled tone, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSchedule {
    /// The gain is zero and the oscillator starts.
    pub start: f64,
    /// End of the linear ramp to [`PEAK_GAIN`].
    pub peak_at: f64,
    /// End of the linear ramp to [`RELEASE_FLOOR`].
    pub floor_at: f64,
    /// The oscillator is stopped.
    pub stop_at: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_absent_fields() {
        let mut config = EnvelopeConfig::default();
        config.merge(EnvelopeUpdate::waveform(WaveShape::Triangle));
        config.merge(EnvelopeUpdate::release(1.5));
        assert_eq!(
            config,
            EnvelopeConfig {
                waveform: WaveShape::Triangle,
                attack: 0.1,
                release: 1.5,
            }
        );

        config.merge(EnvelopeUpdate::default());
        assert_eq!(config.release, 1.5);
    }

    #[test]
    fn negative_times_pass_through() {
        let mut config = EnvelopeConfig::default();
        config.merge(EnvelopeUpdate::attack(-1.0));
        assert_eq!(config.attack, -1.0);
        assert_eq!(config.schedule(2.0).peak_at, 1.0);
    }

    #[test]
    fn schedule_times() {
        let config = EnvelopeConfig {
            waveform: WaveShape::Square,
            attack: 0.25,
            release: 0.5,
        };
        assert_eq!(config.duration(), 0.75);
        assert_eq!(
            config.schedule(1.0),
            EnvelopeSchedule {
                start: 1.0,
                peak_at: 1.25,
                floor_at: 1.75,
                stop_at: 1.85,
            }
        );
    }
}
