// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The notes and chords offered as buttons.

/// One button per natural note from C3 to C5.
pub const NOTE_BUTTONS: &[&str] = &[
    "C3", "D3", "E3", "F3", "G3", "A3", "B3", "C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5",
];

/// Named chords, in the order their buttons are shown.
pub const CHORDS: &[(&str, &[&str])] = &[
    ("C Major", &["C4", "E4", "G4"]),
    ("G Major", &["G3", "B3", "D4"]),
    ("A Minor", &["A3", "C4", "E4"]),
    ("F Major", &["F3", "A3", "C4"]),
    ("D Minor", &["D3", "F3", "A3"]),
    ("E Minor", &["E3", "G3", "B3"]),
    ("D Major", &["D3", "F#3", "A3"]),
    ("G Minor", &["G3", "Bb3", "D4"]),
];

/// Look up the notes of a chord by its name, ignoring case.
///
/// ```
/// use synthwave::presets::chord;
///
/// assert_eq!(chord("g minor"), Some(&["G3", "Bb3", "D4"][..]));
/// assert_eq!(chord("H Major"), None);
/// ```
pub fn chord(name: &str) -> Option<&'static [&'static str]> {
    CHORDS
        .iter()
        .find(|(chord_name, _)| chord_name.eq_ignore_ascii_case(name.trim()))
        .map(|(_, notes)| *notes)
}
