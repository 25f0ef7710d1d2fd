// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The controls of the player: each user action maps to exactly one call on
//! the [`TonePlayer`], and may ask for a button to be highlighted for a while.

use std::str::FromStr;
use std::time::Duration;

use log::info;
use snafu::Snafu;

use crate::graph::{ScheduleError, SynthContext};
use crate::presets;
use crate::synth::envelope::EnvelopeUpdate;
use crate::synth::oscillator::WaveShape;
use crate::synth::player::TonePlayer;

/// How long a chord button stays highlighted, independent of the envelope.
pub const CHORD_HIGHLIGHT: Duration = Duration::from_millis(500);

/// Something the user did.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetWaveform(WaveShape),
    SetAttack(f64),
    SetRelease(f64),
    /// A note button was pressed. The name is only checked when playing.
    PlayNote(String),
    /// A chord button was pressed.
    PlayChord(Vec<String>),
}

/// Visual feedback requested by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    /// How long the pressed button stays highlighted.
    pub highlight: Duration,
}

#[derive(Debug, PartialEq, Snafu)]
pub enum ActionParseError {
    #[snafu(display("Empty action"))]
    Empty,
    #[snafu(display("Unknown setting {:?}, expected waveform, attack, release or chord", key))]
    UnknownSetting { key: String },
    #[snafu(display("Invalid number {:?} for {}", value, key))]
    InvalidNumber { key: String, value: String },
    #[snafu(display("{}", source))]
    InvalidWaveform {
        source: crate::synth::oscillator::ParseWaveShapeError,
    },
    #[snafu(display("Unknown chord {:?}", name))]
    UnknownChord { name: String },
}

impl FromStr for Action {
    type Err = ActionParseError;

    /// Parse an action from its textual form:
    ///
    /// - `waveform=<sine|square|sawtooth|triangle>`, `attack=<seconds>`, `release=<seconds>`
    /// - `chord=<name>` for one of the preset chords
    /// - `<note>+<note>+...` for any other chord
    /// - anything else is the name of a single note
    ///
    /// ```
    /// use synthwave::control::Action;
    ///
    /// assert_eq!("attack=0.2".parse::<Action>(), Ok(Action::SetAttack(0.2)));
    /// assert_eq!("C4".parse::<Action>(), Ok(Action::PlayNote("C4".to_owned())));
    /// assert_eq!(
    ///     "C4+E4".parse::<Action>(),
    ///     Ok(Action::PlayChord(vec!["C4".to_owned(), "E4".to_owned()]))
    /// );
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ActionParseError::Empty);
        }

        if let Some((key, value)) = s.split_once('=') {
            let key = key.trim();
            let value = value.trim();
            let number = || {
                value
                    .parse::<f64>()
                    .map_err(|_| ActionParseError::InvalidNumber {
                        key: key.to_owned(),
                        value: value.to_owned(),
                    })
            };
            return match key {
                "waveform" => value
                    .parse()
                    .map(Action::SetWaveform)
                    .map_err(|source| ActionParseError::InvalidWaveform { source }),
                "attack" => number().map(Action::SetAttack),
                "release" => number().map(Action::SetRelease),
                "chord" => presets::chord(value)
                    .map(|notes| Action::PlayChord(notes.iter().map(|n| (*n).to_owned()).collect()))
                    .ok_or_else(|| ActionParseError::UnknownChord {
                        name: value.to_owned(),
                    }),
                _ => Err(ActionParseError::UnknownSetting {
                    key: key.to_owned(),
                }),
            };
        }

        if s.contains('+') {
            return Ok(Action::PlayChord(
                s.split('+').map(|n| n.trim().to_owned()).collect(),
            ));
        }

        Ok(Action::PlayNote(s.to_owned()))
    }
}

/// Perform an action on the player.
///
/// Notes are highlighted for the duration of their envelope, chords for a
/// fixed [`CHORD_HIGHLIGHT`]. Settings and notes that did not play have no feedback.
pub fn dispatch<C: SynthContext>(
    player: &mut TonePlayer<C>,
    action: &Action,
) -> Result<Option<Feedback>, ScheduleError> {
    match action {
        Action::SetWaveform(waveform) => {
            player.update_settings(EnvelopeUpdate::waveform(*waveform));
            Ok(None)
        }
        Action::SetAttack(attack) => {
            player.update_settings(EnvelopeUpdate::attack(*attack));
            Ok(None)
        }
        Action::SetRelease(release) => {
            player.update_settings(EnvelopeUpdate::release(*release));
            Ok(None)
        }
        Action::PlayNote(name) => {
            let playback = player.play_note(name)?;
            if let Some(playback) = &playback {
                info!("{} ({:.2} Hz)", name, playback.frequency);
            }
            Ok(playback.map(|playback| Feedback {
                highlight: playback.highlight(),
            }))
        }
        Action::PlayChord(names) => {
            let played = player.play_many(names.as_slice())?;
            info!("chord {} ({} of {} notes)", names.join(" "), played.len(), names.len());
            Ok(Some(Feedback {
                highlight: CHORD_HIGHLIGHT,
            }))
        }
    }
}
