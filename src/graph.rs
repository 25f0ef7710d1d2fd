// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A synthesis context owns the audio clock and a graph of audio nodes.
//! Tones are played by adding nodes to the graph and scheduling changes
//! at absolute times on the clock.

pub mod offline;
pub mod sox;

use snafu::Snafu;

use crate::automation::AutomationError;
use crate::synth::oscillator::WaveShape;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether the clock of a context is running.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ContextState {
    /// Nothing is rendered and the clock stands still, e.g. until the first user interaction.
    Suspended,
    Running,
}

/// Errors reported by a context when building the graph or scheduling changes.
#[derive(Debug, PartialEq, Snafu)]
pub enum ScheduleError {
    #[snafu(display("Referenced node {:?} does not exist", node))]
    InvalidNode { node: NodeId },
    #[snafu(display("Node {:?} is not a gain stage", node))]
    NotAGain { node: NodeId },
    #[snafu(display("Node {:?} is not an oscillator", node))]
    NotAnOscillator { node: NodeId },
    #[snafu(display("Node {:?} was already started", node))]
    AlreadyStarted { node: NodeId },
    #[snafu(display("Node {:?} must be started before it can be stopped", node))]
    NotStarted { node: NodeId },
    #[snafu(display("Time {} is negative or not finite", time))]
    InvalidTime { time: f64 },
    #[snafu(display("Value {} is not finite", value))]
    InvalidValue { value: f64 },
}

impl From<AutomationError> for ScheduleError {
    fn from(err: AutomationError) -> Self {
        match err {
            AutomationError::InvalidTime { time } => ScheduleError::InvalidTime { time },
            AutomationError::InvalidValue { value } => ScheduleError::InvalidValue { value },
        }
    }
}

/// The operations a tone player needs from an audio engine.
///
/// All scheduling calls return immediately; the changes they describe take
/// effect when the clock reaches the given time.
pub trait SynthContext {
    /// Current time of the audio clock in seconds.
    fn current_time(&self) -> f64;

    fn state(&self) -> ContextState;

    /// Ask a suspended context to start running. Has no effect on a running context.
    fn resume(&mut self);

    /// The node representing the speakers.
    fn destination(&self) -> NodeId;

    /// Create an oscillator that stays silent until it is started.
    fn create_oscillator(&mut self, shape: WaveShape, frequency: f64) -> NodeId;

    /// Create a gain stage multiplying the sum of its inputs with `initial`.
    fn create_gain(&mut self, initial: f64) -> NodeId;

    /// Feed the output of `from` into `to`.
    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), ScheduleError>;

    /// Move the gain of a gain stage linearly, reaching `target` at time `at`.
    fn linear_ramp(&mut self, gain: NodeId, target: f64, at: f64) -> Result<(), ScheduleError>;

    /// Start an oscillator at the current time.
    fn start(&mut self, node: NodeId) -> Result<(), ScheduleError>;

    /// Stop an oscillator at time `at`.
    fn stop(&mut self, node: NodeId, at: f64) -> Result<(), ScheduleError>;
}
