// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

/// Position within one period of a wave, in the half-open interval [0, 1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Phase(f64);

impl Phase {
    pub const ZERO: Phase = Phase(0.0);

    pub fn new(offset: f64) -> Phase {
        let wrapped = offset - offset.floor();
        // `floor` can round a tiny negative offset up to exactly 1.0
        if wrapped.is_finite() && wrapped < 1.0 {
            Phase(wrapped)
        } else {
            Phase::ZERO
        }
    }

    pub fn offset(self) -> f64 {
        self.0
    }

    pub fn step(self, amount: f64) -> Phase {
        Phase::new(self.0 + amount)
    }

    pub fn step_frequency(self, frequency: f64, sample_rate: f64) -> Phase {
        self.step(frequency / sample_rate)
    }
}

/// The built-in oscillator types.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaveShape {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl WaveShape {
    pub const ALL: [WaveShape; 4] = [
        WaveShape::Sine,
        WaveShape::Square,
        WaveShape::Sawtooth,
        WaveShape::Triangle,
    ];

    /// Evaluate one period of the wave, normalized to the range [-1, 1].
    ///
    /// ```
    /// use synthwave::synth::oscillator::*;
    ///
    /// assert_eq!(WaveShape::Square.eval(Phase::new(0.25)), 1.0);
    /// assert_eq!(WaveShape::Sawtooth.eval(Phase::new(0.75)), 0.5);
    /// assert_eq!(WaveShape::Triangle.eval(Phase::new(0.25)), 1.0);
    /// ```
    pub fn eval(self, phase: Phase) -> f64 {
        let offset = phase.offset();
        use std::f64::consts::PI;
        match self {
            WaveShape::Sine => (offset * 2.0 * PI).sin(),
            WaveShape::Square => {
                if offset < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            WaveShape::Sawtooth => 2.0 * offset - 1.0,
            WaveShape::Triangle => {
                if offset < 0.25 {
                    4.0 * offset
                } else if offset < 0.75 {
                    2.0 - 4.0 * offset
                } else {
                    4.0 * offset - 4.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WaveShape::Sine => "sine",
            WaveShape::Square => "square",
            WaveShape::Sawtooth => "sawtooth",
            WaveShape::Triangle => "triangle",
        }
    }
}

impl fmt::Display for WaveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ParseWaveShapeError {
    #[snafu(display(
        "Unknown waveform {:?}, expected one of sine, square, sawtooth, triangle",
        name
    ))]
    UnknownWaveShape { name: String },
}

impl FromStr for WaveShape {
    type Err = ParseWaveShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WaveShape::ALL
            .iter()
            .copied()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| ParseWaveShapeError::UnknownWaveShape { name: s.to_owned() })
    }
}

/// An oscillator sampling a wave of some shape at a fixed sample rate.
#[derive(Debug)]
pub struct Oscillator {
    shape: WaveShape,
    sample_rate: f64,
    frequency: f64,
    phase: Phase,
}

impl Oscillator {
    pub fn new(shape: WaveShape, sample_rate: f64, frequency: f64) -> Self {
        Self {
            shape,
            sample_rate,
            frequency,
            phase: Phase::ZERO,
        }
    }

    pub fn next_sample(&mut self) -> f64 {
        let result = self.shape.eval(self.phase);
        self.phase = self.phase.step_frequency(self.frequency, self.sample_rate);
        result
    }
}
