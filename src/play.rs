// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Playing a sequence of button presses from the command line.

use std::io;
use std::path::PathBuf;

use log::{info, trace, warn};
use snafu::{ResultExt, Snafu};
use structopt::StructOpt;

use crate::control::{self, Action};
use crate::graph::offline::{OfflineContext, RenderError};
use crate::graph::sox::{SoxSink, SoxTarget};
use crate::graph::{ScheduleError, SynthContext};
use crate::presets;
use crate::synth::envelope::EnvelopeConfig;
use crate::synth::oscillator::WaveShape;
use crate::synth::player::TonePlayer;
use crate::util;

/// Number of samples rendered at once (10 ms at 44100 Hz).
const BUFFER_SIZE: usize = 441;

#[derive(Debug, StructOpt)]
#[structopt(name = "synthwave", about = "Playing tones and chords")]
pub struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: usize,

    /// Initial waveform: sine, square, sawtooth or triangle.
    #[structopt(short, long, default_value = "sine")]
    pub waveform: WaveShape,

    /// Initial attack time in seconds.
    #[structopt(short, long, default_value = "0.1")]
    pub attack: f64,

    /// Initial release time in seconds.
    #[structopt(short, long, default_value = "0.5")]
    pub release: f64,

    /// Sample rate of the generated audio, in Hz.
    #[structopt(long, default_value = "44100", parse(try_from_str = parse_sample_rate))]
    pub rate: u32,

    /// Seconds of silence after a button highlight ended, before the next action.
    #[structopt(long, default_value = "0")]
    pub gap: f64,

    /// Output file (any sox-supported format). Sound is played directly if not given.
    #[structopt(short, long, parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// Print the note and chord buttons and exit.
    #[structopt(long)]
    pub list: bool,

    /// Actions performed in order: a note (`C4`), a chord (`C4+E4+G4` or `chord=C Major`),
    /// or a setting (`waveform=square`, `attack=0.2`, `release=1`).
    pub actions: Vec<Action>,
}

#[derive(Debug, Snafu)]
pub enum PlayError {
    #[snafu(display("Could not initialize logging: {}", source))]
    Logger { source: log::SetLoggerError },
    #[snafu(display("Could not perform {}: {}", action, source))]
    Schedule {
        action: String,
        source: ScheduleError,
    },
    #[snafu(display("Rendering failed: {}", source))]
    Render { source: RenderError },
    #[snafu(display("Audio output failed: {}", source))]
    Output { source: io::Error },
}

fn parse_sample_rate(src: &str) -> Result<u32, String> {
    match src.parse::<u32>() {
        Ok(0) => Err("the sample rate must be positive".to_owned()),
        Ok(rate) => Ok(rate),
        Err(err) => Err(format!("invalid sample rate {:?}: {}", src, err)),
    }
}

/// Entry point of the `synthwave` binary.
pub fn play_main() -> Result<(), PlayError> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).context(Logger)?;

    run(&opt)
}

pub fn run(opt: &Opt) -> Result<(), PlayError> {
    if opt.list {
        print_presets();
        return Ok(());
    }

    let settings = EnvelopeConfig {
        waveform: opt.waveform,
        attack: opt.attack,
        release: opt.release,
    };
    let mut player = TonePlayer::with_settings(OfflineContext::new(f64::from(opt.rate)), settings)
        .context(Schedule {
            action: "setup of the master gain",
        })?;

    let target = match &opt.output {
        None => SoxTarget::Play,
        Some(path) => SoxTarget::File(path.as_path()),
    };
    let mut sink = SoxSink::new(opt.rate, target).context(Output)?;
    info!(
        "playing {} actions at {} Hz",
        opt.actions.len(),
        opt.rate
    );

    for action in opt.actions.iter() {
        let feedback = control::dispatch(&mut player, action).context(Schedule {
            action: format!("{:?}", action),
        })?;
        if let Some(feedback) = feedback {
            trace!("highlight for {} ms", feedback.highlight.as_millis());
            let wait = feedback.highlight.as_secs_f64() + opt.gap;
            stream(player.context_mut(), &mut sink, wait)?;
        }
    }

    // Let the last tones ring out
    let context = player.context_mut();
    let remaining = context.busy_until() - context.current_time();
    if remaining.is_finite() {
        stream(context, &mut sink, remaining)?;
    } else {
        warn!("some tones never stop, cutting them off");
    }

    sink.finish().context(Output)
}

/// Render `seconds` of audio into the sink, one buffer at a time.
fn stream(context: &mut OfflineContext, sink: &mut SoxSink, seconds: f64) -> Result<(), PlayError> {
    let mut remaining = util::seconds_to_samples(seconds, context.sample_rate());
    while remaining > 0 {
        let length = remaining.min(BUFFER_SIZE);
        let audio = context.render(length).context(Render)?;
        sink.write(&audio).context(Output)?;
        remaining -= length;
    }
    Ok(())
}

fn print_presets() {
    println!("notes:  {}", presets::NOTE_BUTTONS.join(" "));
    println!("chords:");
    for (name, notes) in presets::CHORDS.iter() {
        println!("  {:<8} {}", name, notes.join(" "));
    }
}
