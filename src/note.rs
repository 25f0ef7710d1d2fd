// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is, and how note names are spelled.

use crate::synth::tuning::Tuning;

/// The letter of a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

/// Any offset applied to a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteOffset {
    /// The note is a half-tone lower then indicated by its name.
    Flat,
    /// The note is left unchanged.
    Base,
    /// The note is a half-tone higher then indicated by its name.
    Sharp,
}

/// Semitone offset from C within an octave, in the range 0 to 11.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PitchClass(u8);

impl PitchClass {
    pub fn index(self) -> i32 {
        self.0 as i32
    }
}

/// A note spelled with a letter, an optional accidental and an octave,
/// following scientific pitch notation (C4 through B4 is one octave).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pitch {
    pub name: NoteName,
    pub offset: NoteOffset,
    pub octave: i32,
}

impl NoteName {
    fn from_ascii(ch: u8) -> Option<NoteName> {
        match ch {
            b'A' => Some(NoteName::A),
            b'B' => Some(NoteName::B),
            b'C' => Some(NoteName::C),
            b'D' => Some(NoteName::D),
            b'E' => Some(NoteName::E),
            b'F' => Some(NoteName::F),
            b'G' => Some(NoteName::G),
            _ => None,
        }
    }
}

impl Pitch {
    /// Look up the pitch class of a spelling in the keyboard table.
    ///
    /// Only the seventeen spellings of the table are known: the naturals, the
    /// sharps of C, D, F, G and A, and the flats of D, E, G, A and B.
    /// Cb, Fb, E# and B# have no entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use synthwave::note::*;
    ///
    /// assert_eq!(Pitch::pitch_class(NoteName::C, NoteOffset::Base).map(|p| p.index()), Some(0));
    /// assert_eq!(Pitch::pitch_class(NoteName::G, NoteOffset::Flat).map(|p| p.index()), Some(6));
    /// assert_eq!(Pitch::pitch_class(NoteName::E, NoteOffset::Sharp), None);
    /// ```
    pub fn pitch_class(name: NoteName, offset: NoteOffset) -> Option<PitchClass> {
        let name_index = match name {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        };
        let offset_index = match (name, offset) {
            (NoteName::C, NoteOffset::Flat)
            | (NoteName::F, NoteOffset::Flat)
            | (NoteName::E, NoteOffset::Sharp)
            | (NoteName::B, NoteOffset::Sharp) => return None,
            (_, NoteOffset::Base) => 0,
            (_, NoteOffset::Flat) => -1,
            (_, NoteOffset::Sharp) => 1,
        };
        Some(PitchClass((name_index + offset_index) as u8))
    }

    /// The pitch class of this note.
    pub fn class(&self) -> Option<PitchClass> {
        Pitch::pitch_class(self.name, self.offset)
    }

    /// Parse a name string of the format `<letter><accidental><octave>`.
    ///
    /// A name containing a lowercase `b` must be a flat: one letter `A`-`G`,
    /// the `b`, and a single digit. All other names are one letter, an
    /// optional `#` and a single digit. Octaves with more than one digit
    /// are not accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// # use synthwave::note::*;
    ///
    /// assert_eq!(
    ///     Pitch::parse("C#4"),
    ///     Some(Pitch { name: NoteName::C, offset: NoteOffset::Sharp, octave: 4 })
    /// );
    /// assert_eq!(
    ///     Pitch::parse("Bb3"),
    ///     Some(Pitch { name: NoteName::B, offset: NoteOffset::Flat, octave: 3 })
    /// );
    /// assert_eq!(Pitch::parse("C10"), None);
    /// assert_eq!(Pitch::parse("a4"), None);
    /// ```
    pub fn parse(name_str: &str) -> Option<Pitch> {
        let flat_marked = name_str.contains('b');
        let (letter, offset, digit) = match *name_str.as_bytes() {
            [letter, b'b', digit] if flat_marked => (letter, NoteOffset::Flat, digit),
            [letter, b'#', digit] if !flat_marked => (letter, NoteOffset::Sharp, digit),
            [letter, digit] if !flat_marked => (letter, NoteOffset::Base, digit),
            _ => return None,
        };
        if !digit.is_ascii_digit() {
            return None;
        }
        let pitch = Pitch {
            name: NoteName::from_ascii(letter)?,
            offset,
            octave: (digit - b'0') as i32,
        };
        // Spellings outside the table are rejected here rather than later
        pitch.class()?;
        Some(pitch)
    }
}

/// Resolve a note name to its frequency in Hz at concert pitch (A4 = 440 Hz).
///
/// # Examples
///
/// ```
/// use synthwave::note::resolve;
///
/// assert_eq!(resolve("A4"), Some(440.0));
/// assert_eq!(resolve("A#3"), resolve("Bb3"));
/// assert_eq!(resolve("H4"), None);
/// ```
pub fn resolve(name_str: &str) -> Option<f64> {
    let pitch = Pitch::parse(name_str)?;
    Tuning::default().frequency(&pitch)
}
