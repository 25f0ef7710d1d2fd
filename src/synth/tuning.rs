// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use crate::note::*;
use crate::util;

/// Defines the tuning of an instrument by assigning a frequency to a certain note.
/// This defines the frequencies of all other notes at a standard tuning of 12 half-tones per octave.
///
/// # Examples
///
/// ```
/// use synthwave::note::*;
/// use synthwave::synth::tuning::*;
///
/// let a3 = Pitch { name: NoteName::A, offset: NoteOffset::Base, octave: 3 };
/// let a5 = Pitch { name: NoteName::A, offset: NoteOffset::Base, octave: 5 };
/// assert_eq!(Tuning::default().frequency(&a3), Some(220.0));
/// assert_eq!(Tuning::default().frequency(&a5), Some(880.0));
/// ```
#[derive(Debug, Clone)]
pub struct Tuning {
    pub reference_pitch: Pitch,
    pub reference_frequency: f64,
}

impl Tuning {
    /// Return the frequency of a pitch relative to this tuning,
    /// or `None` if either spelling has no pitch class.
    pub fn frequency(&self, other: &Pitch) -> Option<f64> {
        let semitones = other.class()?.index() - self.reference_pitch.class()?.index();
        let octaves = (other.octave - self.reference_pitch.octave) as f64;
        Some(self.reference_frequency * util::from_octaves(semitones as f64 / 12.0 + octaves))
    }
}

/// Default concert tuning, where A4 corresponds to 440 Hz.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_pitch: Pitch {
                name: NoteName::A,
                offset: NoteOffset::Base,
                octave: 4,
            },
            reference_frequency: 440.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_reference() {
        let baroque = Tuning {
            reference_frequency: 415.0,
            ..Tuning::default()
        };
        let a4 = Pitch::parse("A4").unwrap();
        let a2 = Pitch::parse("A2").unwrap();
        assert_eq!(baroque.frequency(&a4), Some(415.0));
        assert_eq!(baroque.frequency(&a2), Some(103.75));
    }

    #[test]
    fn unknown_spelling_has_no_frequency() {
        let e_sharp = Pitch {
            name: NoteName::E,
            offset: NoteOffset::Sharp,
            octave: 4,
        };
        assert_eq!(Tuning::default().frequency(&e_sharp), None);
    }
}
