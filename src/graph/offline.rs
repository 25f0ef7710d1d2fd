// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A synthesis context that renders its graph into buffers on demand.
//! The clock advances by exactly the number of samples rendered.

use log::{debug, trace};
use snafu::Snafu;

use super::{ContextState, NodeId, ScheduleError, SynthContext};
use crate::automation::{Automation, AutomationEvent};
use crate::synth::oscillator::{Oscillator, WaveShape};
use crate::util;
use crate::wave::{AudioBuffer, Stereo};

#[derive(Debug, PartialEq, Snafu)]
pub enum RenderError {
    #[snafu(display("There is a cycle in the graph"))]
    Cycle,
}

pub struct OfflineContext {
    sample_rate: f64,
    /// Number of samples rendered while running. This is the clock.
    rendered: usize,
    state: ContextState,
    /// Indexed by node id. Collected nodes leave an empty slot behind.
    nodes: Vec<Option<NodeHolder>>,
    /// Empty slots, handed out again to new nodes.
    free: Vec<usize>,
    /// Cached evaluation order, reset whenever the graph changes.
    evaluation_order: Option<Vec<NodeId>>,
}

struct NodeHolder {
    kind: NodeKind,
    inputs: Vec<NodeId>,
}

enum NodeKind {
    Destination,
    Oscillator(OscillatorNode),
    Gain(Automation),
}

struct OscillatorNode {
    oscillator: Oscillator,
    start: Option<f64>,
    stop: Option<f64>,
}

impl OscillatorNode {
    fn playing_at(&self, t: f64) -> bool {
        match self.start {
            Some(start) => start <= t && self.stop.map_or(true, |stop| t < stop),
            None => false,
        }
    }

    /// Whether the oscillator stays silent from `t` on.
    fn finished_at(&self, t: f64) -> bool {
        self.start.is_some() && self.stop.map_or(false, |stop| stop <= t)
    }
}

impl OfflineContext {
    /// Create a suspended context containing only the destination node.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            rendered: 0,
            state: ContextState::Suspended,
            nodes: vec![Some(NodeHolder {
                kind: NodeKind::Destination,
                inputs: Vec::new(),
            })],
            free: Vec::new(),
            evaluation_order: None,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Put the context back into the suspended state.
    pub fn suspend(&mut self) {
        if self.state == ContextState::Running {
            debug!("suspending context at {:.3}s", self.current_time());
            self.state = ContextState::Suspended;
        }
    }

    /// Number of nodes in the graph, including the destination.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// The automation timeline of a gain stage.
    pub fn gain_automation(&self, node: NodeId) -> Option<&Automation> {
        match &self.nodes.get(node.0)?.as_ref()?.kind {
            NodeKind::Gain(automation) => Some(automation),
            _ => None,
        }
    }

    /// The time after which no started oscillator is audible anymore.
    /// An oscillator that was never stopped keeps the context busy forever.
    pub fn busy_until(&self) -> f64 {
        self.live_nodes()
            .filter_map(|(_, holder)| match &holder.kind {
                NodeKind::Oscillator(node) if node.start.is_some() => {
                    Some(node.stop.unwrap_or(f64::INFINITY))
                }
                _ => None,
            })
            .fold(self.current_time(), f64::max)
    }

    /// Render the given number of samples, advancing the clock accordingly.
    /// A suspended context renders silence and its clock stands still.
    ///
    /// Afterwards, oscillators that have stopped are removed from the graph,
    /// together with the gain stages only they fed. Their ids may be handed
    /// out again to new nodes.
    pub fn render(&mut self, length: usize) -> Result<AudioBuffer, RenderError> {
        let mut buffer = AudioBuffer::new(length);
        if self.state == ContextState::Suspended {
            trace!("rendering {} samples of silence while suspended", length);
            return Ok(buffer);
        }

        let order = self.evaluation_order()?;
        let mut outputs: Vec<Vec<f64>> = vec![Vec::new(); self.nodes.len()];
        let start_sample = self.rendered;
        let sample_rate = self.sample_rate;
        let time_of = |i: usize| (start_sample + i) as f64 / sample_rate;

        for id in order {
            let holder = match self.nodes[id.0].as_mut() {
                Some(holder) => holder,
                None => continue,
            };
            let mut signal = vec![0.0; length];
            for input in holder.inputs.iter() {
                for (s, x) in signal.iter_mut().zip(outputs[input.0].iter()) {
                    *s += *x;
                }
            }

            match &mut holder.kind {
                NodeKind::Destination => {}
                NodeKind::Oscillator(node) => {
                    for (i, s) in signal.iter_mut().enumerate() {
                        // the phase only advances while the oscillator is playing
                        *s = if node.playing_at(time_of(i)) {
                            node.oscillator.next_sample()
                        } else {
                            0.0
                        };
                    }
                }
                NodeKind::Gain(automation) => {
                    for (i, s) in signal.iter_mut().enumerate() {
                        *s *= automation.value_at(time_of(i));
                    }
                }
            }
            outputs[id.0] = signal;
        }

        for (out, x) in buffer
            .samples_mut()
            .iter_mut()
            .zip(outputs[self.destination().0].iter())
        {
            *out = Stereo::mono(*x);
        }
        self.rendered += length;
        self.collect_finished();
        Ok(buffer)
    }

    /// Render the given duration, rounded to whole samples.
    pub fn render_seconds(&mut self, seconds: f64) -> Result<AudioBuffer, RenderError> {
        self.render(util::seconds_to_samples(seconds, self.sample_rate))
    }

    fn live_nodes(&self) -> impl Iterator<Item = (NodeId, &NodeHolder)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|holder| (NodeId(index), holder)))
    }

    /// Remove stopped oscillators, and gain stages whose inputs were all removed.
    /// Gain stages feeding the destination directly are mix buses and stay.
    fn collect_finished(&mut self) {
        let now = self.current_time();
        let mut finished: Vec<bool> = self
            .nodes
            .iter()
            .map(|slot| match slot {
                Some(NodeHolder {
                    kind: NodeKind::Oscillator(node),
                    ..
                }) => node.finished_at(now),
                _ => false,
            })
            .collect();
        if !finished.iter().any(|f| *f) {
            return;
        }

        let mix_buses = match &self.nodes[self.destination().0] {
            Some(holder) => holder.inputs.clone(),
            None => Vec::new(),
        };
        let mut changed = true;
        while changed {
            changed = false;
            for (id, holder) in self.live_nodes() {
                if finished[id.0] || mix_buses.contains(&id) {
                    continue;
                }
                if let NodeKind::Gain(_) = holder.kind {
                    if !holder.inputs.is_empty() && holder.inputs.iter().all(|i| finished[i.0]) {
                        finished[id.0] = true;
                        changed = true;
                    }
                }
            }
        }

        let mut collected = 0;
        for (index, slot) in self.nodes.iter_mut().enumerate() {
            if finished[index] {
                *slot = None;
                self.free.push(index);
                collected += 1;
            } else if let Some(holder) = slot {
                holder.inputs.retain(|input| !finished[input.0]);
            }
        }
        self.evaluation_order = None;
        trace!("collected {} finished nodes at {:.3}s", collected, now);
    }

    /// Sort the nodes topologically using Kahn's algorithm, so that each node
    /// is evaluated after all of its inputs.
    fn evaluation_order(&mut self) -> Result<Vec<NodeId>, RenderError> {
        if let Some(order) = &self.evaluation_order {
            return Ok(order.clone());
        }

        let mut incoming: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        let mut outgoing: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        let mut nodes_without_incoming_edges = Vec::new();
        for (id, holder) in self.live_nodes() {
            incoming[id.0] = holder.inputs.clone();
            for input in holder.inputs.iter() {
                outgoing[input.0].push(id);
            }
            if holder.inputs.is_empty() {
                nodes_without_incoming_edges.push(id);
            }
        }

        let mut sorted_nodes = Vec::new();
        while let Some(n) = nodes_without_incoming_edges.pop() {
            sorted_nodes.push(n);

            for m in std::mem::take(&mut outgoing[n.0]) {
                incoming[m.0].retain(|x| *x != n);
                if incoming[m.0].is_empty() {
                    nodes_without_incoming_edges.push(m);
                }
            }
        }

        if incoming.iter().any(|from| !from.is_empty()) {
            return Err(RenderError::Cycle);
        }
        debug!("graph of {} nodes sorted", sorted_nodes.len());
        self.evaluation_order = Some(sorted_nodes.clone());
        Ok(sorted_nodes)
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let holder = NodeHolder {
            kind,
            inputs: Vec::new(),
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(holder);
                index
            }
            None => {
                self.nodes.push(Some(holder));
                self.nodes.len() - 1
            }
        };
        self.evaluation_order = None;
        NodeId(index)
    }

    fn holder_mut(&mut self, node: NodeId) -> Result<&mut NodeHolder, ScheduleError> {
        self.nodes
            .get_mut(node.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(ScheduleError::InvalidNode { node })
    }

    fn oscillator_mut(&mut self, node: NodeId) -> Result<&mut OscillatorNode, ScheduleError> {
        match &mut self.holder_mut(node)?.kind {
            NodeKind::Oscillator(osc) => Ok(osc),
            _ => Err(ScheduleError::NotAnOscillator { node }),
        }
    }
}

impl SynthContext for OfflineContext {
    fn current_time(&self) -> f64 {
        self.rendered as f64 / self.sample_rate
    }

    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) {
        if self.state == ContextState::Suspended {
            debug!("resuming context at {:.3}s", self.current_time());
            self.state = ContextState::Running;
        }
    }

    fn destination(&self) -> NodeId {
        NodeId(0)
    }

    fn create_oscillator(&mut self, shape: WaveShape, frequency: f64) -> NodeId {
        self.add_node(NodeKind::Oscillator(OscillatorNode {
            oscillator: Oscillator::new(shape, self.sample_rate, frequency),
            start: None,
            stop: None,
        }))
    }

    fn create_gain(&mut self, initial: f64) -> NodeId {
        let origin = self.current_time();
        self.add_node(NodeKind::Gain(Automation::new(initial, origin)))
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), ScheduleError> {
        self.holder_mut(from)?;
        let target = self.holder_mut(to)?;
        if !target.inputs.contains(&from) {
            target.inputs.push(from);
            self.evaluation_order = None;
        }
        Ok(())
    }

    fn linear_ramp(&mut self, gain: NodeId, target: f64, at: f64) -> Result<(), ScheduleError> {
        match &mut self.holder_mut(gain)?.kind {
            NodeKind::Gain(automation) => {
                automation.schedule(AutomationEvent::LinearRamp {
                    value: target,
                    time: at,
                })?;
                Ok(())
            }
            _ => Err(ScheduleError::NotAGain { node: gain }),
        }
    }

    fn start(&mut self, node: NodeId) -> Result<(), ScheduleError> {
        let now = self.current_time();
        let osc = self.oscillator_mut(node)?;
        if osc.start.is_some() {
            return Err(ScheduleError::AlreadyStarted { node });
        }
        osc.start = Some(now);
        Ok(())
    }

    fn stop(&mut self, node: NodeId, at: f64) -> Result<(), ScheduleError> {
        if !at.is_finite() || at < 0.0 {
            return Err(ScheduleError::InvalidTime { time: at });
        }
        let osc = self.oscillator_mut(node)?;
        if osc.start.is_none() {
            return Err(ScheduleError::NotStarted { node });
        }
        osc.stop = Some(at);
        Ok(())
    }
}
