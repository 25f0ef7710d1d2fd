// synthwave -- a tone and chord player
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Parameter automation: values that change over time at pre-scheduled points.

use snafu::Snafu;

/// A change of a parameter, taking effect at an absolute time in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    /// Jump to `value` at `time`.
    SetValue { value: f64, time: f64 },
    /// Move linearly from the previous value so that `value` is reached at `time`.
    LinearRamp { value: f64, time: f64 },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. } => time,
            AutomationEvent::LinearRamp { time, .. } => time,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { value, .. } => value,
            AutomationEvent::LinearRamp { value, .. } => value,
        }
    }
}

#[derive(Debug, PartialEq, Snafu)]
pub enum AutomationError {
    #[snafu(display("Automation time {} is negative or not finite", time))]
    InvalidTime { time: f64 },
    #[snafu(display("Automation value {} is not finite", value))]
    InvalidValue { value: f64 },
}

/// The timeline of a single parameter, such as the gain of a gain stage.
///
/// Before the first event, the parameter holds its initial value, and a
/// ramp scheduled as first event starts from there at the `origin` time.
///
/// # Examples
///
/// ```
/// use synthwave::automation::*;
///
/// let mut gain = Automation::new(0.0, 1.0);
/// gain.schedule(AutomationEvent::LinearRamp { value: 1.0, time: 2.0 }).unwrap();
/// gain.schedule(AutomationEvent::LinearRamp { value: 0.0, time: 4.0 }).unwrap();
///
/// assert_eq!(gain.value_at(0.5), 0.0);
/// assert_eq!(gain.value_at(1.5), 0.5);
/// assert_eq!(gain.value_at(2.0), 1.0);
/// assert_eq!(gain.value_at(3.0), 0.5);
/// assert_eq!(gain.value_at(10.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Automation {
    initial: f64,
    origin: f64,
    /// Sorted by time. Events at the same time keep their scheduling order.
    events: Vec<AutomationEvent>,
}

impl Automation {
    /// A parameter holding `initial` from time `origin` on.
    pub fn new(initial: f64, origin: f64) -> Self {
        Self {
            initial,
            origin,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    pub fn schedule(&mut self, event: AutomationEvent) -> Result<(), AutomationError> {
        let time = event.time();
        if !time.is_finite() || time < 0.0 {
            return Err(AutomationError::InvalidTime { time });
        }
        let value = event.value();
        if !value.is_finite() {
            return Err(AutomationError::InvalidValue { value });
        }
        let index = self
            .events
            .iter()
            .position(|e| e.time() > time)
            .unwrap_or_else(|| self.events.len());
        self.events.insert(index, event);
        Ok(())
    }

    /// Evaluate the parameter at an absolute point in time.
    pub fn value_at(&self, t: f64) -> f64 {
        let mut prev_time = self.origin;
        let mut prev_value = self.initial;
        for event in self.events.iter() {
            if event.time() <= t {
                prev_time = event.time();
                prev_value = event.value();
                continue;
            }
            return match *event {
                AutomationEvent::LinearRamp { value, time } if t > prev_time => {
                    let progress = (t - prev_time) / (time - prev_time);
                    prev_value + (value - prev_value) * progress
                }
                _ => prev_value,
            };
        }
        prev_value
    }

    /// The time after which the value no longer changes.
    pub fn settled_at(&self) -> f64 {
        self.events
            .last()
            .map_or(self.origin, |event| event.time().max(self.origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_release_shape() {
        let mut gain = Automation::new(0.0, 0.0);
        gain.schedule(AutomationEvent::LinearRamp {
            value: 0.7,
            time: 0.1,
        })
        .unwrap();
        gain.schedule(AutomationEvent::LinearRamp {
            value: 0.001,
            time: 0.6,
        })
        .unwrap();

        assert_eq!(gain.value_at(0.0), 0.0);
        assert!((gain.value_at(0.05) - 0.35).abs() < 1e-12);
        assert_eq!(gain.value_at(0.1), 0.7);
        assert!((gain.value_at(0.35) - 0.3505).abs() < 1e-12);
        assert_eq!(gain.value_at(0.6), 0.001);
        assert_eq!(gain.value_at(5.0), 0.001);
        assert_eq!(gain.settled_at(), 0.6);
    }

    #[test]
    fn events_are_kept_sorted() {
        let mut gain = Automation::new(1.0, 0.0);
        gain.schedule(AutomationEvent::SetValue {
            value: 3.0,
            time: 3.0,
        })
        .unwrap();
        gain.schedule(AutomationEvent::SetValue {
            value: 2.0,
            time: 2.0,
        })
        .unwrap();
        gain.schedule(AutomationEvent::SetValue {
            value: 4.0,
            time: 2.0,
        })
        .unwrap();

        let times: Vec<f64> = gain.events().iter().map(|e| e.time()).collect();
        assert_eq!(times, vec![2.0, 2.0, 3.0]);
        // the later of two events at the same time wins
        assert_eq!(gain.value_at(2.5), 4.0);
        assert_eq!(gain.value_at(1.0), 1.0);
    }

    #[test]
    fn zero_length_ramp_jumps() {
        let mut gain = Automation::new(0.0, 1.0);
        gain.schedule(AutomationEvent::LinearRamp {
            value: 0.7,
            time: 1.0,
        })
        .unwrap();
        assert_eq!(gain.value_at(0.999), 0.0);
        assert_eq!(gain.value_at(1.0), 0.7);
    }

    #[test]
    fn invalid_events() {
        let mut gain = Automation::new(0.0, 0.0);
        assert_eq!(
            gain.schedule(AutomationEvent::LinearRamp {
                value: 1.0,
                time: -0.5
            }),
            Err(AutomationError::InvalidTime { time: -0.5 })
        );
        assert!(gain
            .schedule(AutomationEvent::SetValue {
                value: 1.0,
                time: f64::INFINITY
            })
            .is_err());
        assert!(gain
            .schedule(AutomationEvent::SetValue {
                value: f64::NAN,
                time: 1.0
            })
            .is_err());
        assert!(gain.events().is_empty());
    }
}
