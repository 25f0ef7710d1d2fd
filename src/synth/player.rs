// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Playing single tones and chords on a synthesis context.

use std::time::Duration;

use log::{debug, trace};

use super::envelope::{EnvelopeConfig, EnvelopeUpdate, PEAK_GAIN, RELEASE_FLOOR};
use crate::graph::{ContextState, NodeId, ScheduleError, SynthContext};
use crate::note;

/// Linear gain of the stage all tones are mixed into.
pub const MASTER_GAIN: f64 = 0.5;

/// Information about a tone that was scheduled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub frequency: f64,
    /// Context time at which the tone started.
    pub started_at: f64,
    /// Audible length of the tone in seconds (attack plus release).
    pub duration: f64,
}

impl Playback {
    /// The duration as wall clock time in whole milliseconds, for timing visual feedback.
    /// Negative or non-finite durations count as zero.
    pub fn highlight(&self) -> Duration {
        let millis = (self.duration * 1000.0).round();
        if millis.is_finite() && millis > 0.0 {
            Duration::from_millis(millis as u64)
        } else {
            Duration::from_millis(0)
        }
    }
}

/// Plays tones through a master gain stage of a synthesis context.
///
/// The player owns the envelope settings; every tone uses the settings that are
/// current when it is played.
///
/// # Examples
///
/// ```
/// use synthwave::graph::offline::OfflineContext;
/// use synthwave::synth::envelope::EnvelopeUpdate;
/// use synthwave::synth::player::TonePlayer;
///
/// let mut player = TonePlayer::new(OfflineContext::new(44100.0)).unwrap();
/// player.update_settings(EnvelopeUpdate::attack(0.2));
///
/// let playback = player.play_note("A4").unwrap().unwrap();
/// assert_eq!(playback.frequency, 440.0);
/// assert_eq!(playback.duration, 0.7);
///
/// assert_eq!(player.play_note("H4").unwrap(), None);
/// ```
pub struct TonePlayer<C> {
    context: C,
    master: NodeId,
    settings: EnvelopeConfig,
}

impl<C: SynthContext> TonePlayer<C> {
    pub fn new(context: C) -> Result<Self, ScheduleError> {
        Self::with_settings(context, EnvelopeConfig::default())
    }

    /// Create the master gain stage and connect it to the speakers.
    pub fn with_settings(mut context: C, settings: EnvelopeConfig) -> Result<Self, ScheduleError> {
        let master = context.create_gain(MASTER_GAIN);
        let destination = context.destination();
        context.connect(master, destination)?;
        Ok(Self {
            context,
            master,
            settings,
        })
    }

    pub fn settings(&self) -> &EnvelopeConfig {
        &self.settings
    }

    /// Merge a partial update into the current settings.
    pub fn update_settings(&mut self, update: EnvelopeUpdate) {
        self.settings.merge(update);
        debug!(
            "settings: {} attack {}s release {}s",
            self.settings.waveform, self.settings.attack, self.settings.release
        );
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Schedule a single tone with the given envelope.
    ///
    /// Returns `Ok(None)` without touching the context when there is no usable
    /// frequency, i.e. it is missing, zero, negative or not finite. Note names
    /// never resolve to negative frequencies, so rejecting them only matters
    /// for callers passing raw frequencies.
    /// Errors of the context are passed on; nodes created before the error
    /// stay in the graph but are not audible.
    pub fn play_tone(
        &mut self,
        frequency: Option<f64>,
        envelope: &EnvelopeConfig,
    ) -> Result<Option<Playback>, ScheduleError> {
        let frequency = match frequency {
            Some(f) if f.is_finite() && f > 0.0 => f,
            _ => return Ok(None),
        };
        self.resume_if_suspended();

        let osc = self.context.create_oscillator(envelope.waveform, frequency);
        let note_gain = self.context.create_gain(0.0);
        self.context.connect(osc, note_gain)?;
        self.context.connect(note_gain, self.master)?;

        let schedule = envelope.schedule(self.context.current_time());
        self.context.start(osc)?;
        self.context
            .linear_ramp(note_gain, PEAK_GAIN, schedule.peak_at)?;
        self.context
            .linear_ramp(note_gain, RELEASE_FLOOR, schedule.floor_at)?;
        self.context.stop(osc, schedule.stop_at)?;

        trace!(
            "{:.3}: {} tone at {:.2} Hz until {:.3}",
            schedule.start,
            envelope.waveform,
            frequency,
            schedule.stop_at
        );
        Ok(Some(Playback {
            frequency,
            started_at: schedule.start,
            duration: envelope.duration(),
        }))
    }

    /// Schedule a single tone with the current settings.
    pub fn play_frequency(&mut self, frequency: Option<f64>) -> Result<Option<Playback>, ScheduleError> {
        let settings = self.settings;
        self.play_tone(frequency, &settings)
    }

    /// Resolve a note name and play it with the current settings.
    /// Names that do not resolve are a silent no-op; in particular they do not
    /// resume a suspended context.
    pub fn play_note(&mut self, name: &str) -> Result<Option<Playback>, ScheduleError> {
        let frequency = note::resolve(name);
        if frequency.is_none() {
            debug!("skipping invalid note {:?}", name);
        }
        self.play_frequency(frequency)
    }

    /// Play several notes at once, each as an independent tone.
    ///
    /// Notes that do not resolve are skipped without affecting the others.
    /// Returns the tones that were scheduled, in order.
    pub fn play_many<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<Playback>, ScheduleError> {
        self.resume_if_suspended();
        let mut playbacks = Vec::with_capacity(names.len());
        for name in names {
            if let Some(playback) = self.play_note(name.as_ref())? {
                playbacks.push(playback);
            }
        }
        Ok(playbacks)
    }

    fn resume_if_suspended(&mut self) {
        if self.context.state() == ContextState::Suspended {
            self.context.resume();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use expect_test::{expect, Expect};

    use super::*;
    use crate::graph::offline::OfflineContext;
    use crate::synth::oscillator::WaveShape;

    /// Records every call made against it, resuming only when asked to.
    struct RecordingContext {
        now: f64,
        state: ContextState,
        nodes: usize,
        log: String,
    }

    impl RecordingContext {
        fn new(now: f64) -> Self {
            Self {
                now,
                state: ContextState::Suspended,
                nodes: 1,
                log: String::new(),
            }
        }

        fn next_node(&mut self) -> NodeId {
            self.nodes += 1;
            NodeId::new(self.nodes - 1)
        }
    }

    impl SynthContext for RecordingContext {
        fn current_time(&self) -> f64 {
            self.now
        }
        fn state(&self) -> ContextState {
            self.state
        }
        fn resume(&mut self) {
            writeln!(self.log, "resume").unwrap();
            self.state = ContextState::Running;
        }
        fn destination(&self) -> NodeId {
            NodeId::new(0)
        }
        fn create_oscillator(&mut self, shape: WaveShape, frequency: f64) -> NodeId {
            let id = self.next_node();
            writeln!(self.log, "#{} = {} {:.2} Hz", id.index(), shape, frequency).unwrap();
            id
        }
        fn create_gain(&mut self, initial: f64) -> NodeId {
            let id = self.next_node();
            writeln!(self.log, "#{} = gain {:.3}", id.index(), initial).unwrap();
            id
        }
        fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), ScheduleError> {
            writeln!(self.log, "#{} -> #{}", from.index(), to.index()).unwrap();
            Ok(())
        }
        fn linear_ramp(&mut self, gain: NodeId, target: f64, at: f64) -> Result<(), ScheduleError> {
            writeln!(self.log, "#{} ramp {:.3} at {:.3}", gain.index(), target, at).unwrap();
            if at < 0.0 {
                return Err(ScheduleError::InvalidTime { time: at });
            }
            Ok(())
        }
        fn start(&mut self, node: NodeId) -> Result<(), ScheduleError> {
            writeln!(self.log, "#{} start at {:.3}", node.index(), self.now).unwrap();
            Ok(())
        }
        fn stop(&mut self, node: NodeId, at: f64) -> Result<(), ScheduleError> {
            writeln!(self.log, "#{} stop at {:.3}", node.index(), at).unwrap();
            Ok(())
        }
    }

    fn player_at(now: f64) -> TonePlayer<RecordingContext> {
        let mut player = TonePlayer::new(RecordingContext::new(now)).unwrap();
        player.context_mut().log.clear();
        player
    }

    fn check_log(player: &TonePlayer<RecordingContext>, log: Expect) {
        log.assert_eq(&player.context().log);
    }

    #[test]
    fn master_stage() {
        let player = TonePlayer::new(RecordingContext::new(0.0)).unwrap();
        check_log(
            &player,
            expect![[r#"
                #1 = gain 0.500
                #1 -> #0
            "#]],
        );
    }

    #[test]
    fn tone_envelope() {
        let mut player = player_at(2.0);
        let envelope = EnvelopeConfig {
            waveform: WaveShape::Triangle,
            attack: 0.1,
            release: 0.5,
        };
        let playback = player.play_tone(Some(440.0), &envelope).unwrap().unwrap();

        assert_eq!(playback.duration, 0.6);
        assert_eq!(playback.started_at, 2.0);
        assert_eq!(playback.highlight(), Duration::from_millis(600));
        check_log(
            &player,
            expect![[r#"
                resume
                #2 = triangle 440.00 Hz
                #3 = gain 0.000
                #2 -> #3
                #3 -> #1
                #2 start at 2.000
                #3 ramp 0.700 at 2.100
                #3 ramp 0.001 at 2.600
                #2 stop at 2.700
            "#]],
        );
    }

    #[test]
    fn invalid_frequency_schedules_nothing() {
        let mut player = player_at(0.0);
        let envelope = EnvelopeConfig::default();
        for frequency in [None, Some(0.0), Some(-440.0), Some(f64::NAN)].iter() {
            assert_eq!(player.play_tone(*frequency, &envelope), Ok(None));
        }
        assert_eq!(player.play_note("C10"), Ok(None));
        check_log(&player, expect![[""]]);
        assert_eq!(player.context().state(), ContextState::Suspended);
    }

    #[test]
    fn chord_skips_invalid_notes() {
        let mut player = player_at(1.0);
        let played = player.play_many(&["C4", "H9", "E4"]).unwrap();

        let frequencies: Vec<String> = played
            .iter()
            .map(|p| format!("{:.2}", p.frequency))
            .collect();
        assert_eq!(frequencies, vec!["261.63", "329.63"]);
        check_log(
            &player,
            expect![[r#"
                resume
                #2 = sine 261.63 Hz
                #3 = gain 0.000
                #2 -> #3
                #3 -> #1
                #2 start at 1.000
                #3 ramp 0.700 at 1.100
                #3 ramp 0.001 at 1.600
                #2 stop at 1.700
                #4 = sine 329.63 Hz
                #5 = gain 0.000
                #4 -> #5
                #5 -> #1
                #4 start at 1.000
                #5 ramp 0.700 at 1.100
                #5 ramp 0.001 at 1.600
                #4 stop at 1.700
            "#]],
        );
    }

    #[test]
    fn settings_merge_into_next_tone() {
        let mut player = player_at(0.0);
        player.update_settings(EnvelopeUpdate::waveform(WaveShape::Square));
        player.update_settings(EnvelopeUpdate::attack(0.2));
        assert_eq!(
            *player.settings(),
            EnvelopeConfig {
                waveform: WaveShape::Square,
                attack: 0.2,
                release: 0.5,
            }
        );

        let playback = player.play_note("A4").unwrap().unwrap();
        assert_eq!(playback.duration, 0.7);
        check_log(
            &player,
            expect![[r#"
                resume
                #2 = square 440.00 Hz
                #3 = gain 0.000
                #2 -> #3
                #3 -> #1
                #2 start at 0.000
                #3 ramp 0.700 at 0.200
                #3 ramp 0.001 at 0.700
                #2 stop at 0.800
            "#]],
        );
    }

    #[test]
    fn context_errors_are_passed_on() {
        let mut player = player_at(0.0);
        player.update_settings(EnvelopeUpdate::attack(-1.0));
        assert_eq!(
            player.play_note("A4"),
            Err(ScheduleError::InvalidTime { time: -1.0 })
        );
        assert_eq!(
            player.play_many(&["C4", "E4"]),
            Err(ScheduleError::InvalidTime { time: -1.0 })
        );
        // the failure does not poison the player
        player.update_settings(EnvelopeUpdate::attack(0.1));
        assert!(player.play_note("A4").unwrap().is_some());
    }

    #[test]
    fn rendered_tone() {
        let mut player = TonePlayer::new(OfflineContext::new(1000.0)).unwrap();
        player.update_settings(EnvelopeUpdate::waveform(WaveShape::Square));
        let playback = player.play_note("A4").unwrap().unwrap();
        assert!((player.context().busy_until() - 0.7).abs() < 1e-9);

        let audio = player.context_mut().render_seconds(1.0).unwrap();
        let samples = audio.samples();
        // silence at the start, peak at the end of the attack, silence after the stop
        assert_eq!(samples[0].left, 0.0);
        assert!((samples[100].left.abs() - PEAK_GAIN * MASTER_GAIN).abs() < 1e-9);
        assert!((samples[600].left.abs() - RELEASE_FLOOR * MASTER_GAIN).abs() < 1e-9);
        assert!(samples[701..].iter().all(|s| s.left == 0.0));
        assert!(audio.peak() <= PEAK_GAIN * MASTER_GAIN + 1e-9);
        assert_eq!(playback.started_at, 0.0);
    }

    #[test]
    fn finished_tones_leave_the_graph() {
        let mut player = TonePlayer::new(OfflineContext::new(1000.0)).unwrap();
        for _ in 0..100 {
            player.play_many(&["A4", "C5"]).unwrap();
            let context = player.context_mut();
            let remaining = context.busy_until() - context.current_time();
            context.render_seconds(remaining + 0.01).unwrap();
            assert_eq!(context.node_count(), 2);
        }
        // the master stage survives and still carries new tones
        player.play_note("A4").unwrap();
        assert_eq!(player.context().node_count(), 4);
        let audio = player.context_mut().render_seconds(0.2).unwrap();
        assert!(audio.peak() > 0.0);
    }

    #[test]
    fn playing_resumes_a_suspended_context() {
        let mut player = TonePlayer::new(OfflineContext::new(1000.0)).unwrap();
        player.play_note("A4").unwrap();
        player.context_mut().render(100).unwrap();
        player.context_mut().suspend();
        player.context_mut().render(100).unwrap();
        assert_eq!(player.context().current_time(), 0.1);

        assert_eq!(player.play_note("H4"), Ok(None));
        assert_eq!(player.context().state(), ContextState::Suspended);

        let playback = player.play_note("C4").unwrap().unwrap();
        assert_eq!(player.context().state(), ContextState::Running);
        assert_eq!(playback.started_at, 0.1);
    }

    #[test]
    fn chord_tones_mix() {
        let mut player = TonePlayer::new(OfflineContext::new(1000.0)).unwrap();
        player.update_settings(EnvelopeUpdate::waveform(WaveShape::Square));
        let played = player.play_many(&["A4", "A5"]).unwrap();
        assert_eq!(played.len(), 2);
        assert_eq!(player.context().node_count(), 6);

        let audio = player.context_mut().render_seconds(0.2).unwrap();
        // both square waves are in their upper half at 105 ms, early in the release
        let gain = PEAK_GAIN + (RELEASE_FLOOR - PEAK_GAIN) * (0.105 - 0.1) / 0.5;
        assert!((audio.samples()[105].left - 2.0 * gain * MASTER_GAIN).abs() < 1e-9);
    }
}
