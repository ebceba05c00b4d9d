use std::collections::VecDeque;

use crate::neuro::neuron::{Phase, PostsynapticEffect};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    EnterPhase(Phase),
    /// Commits `target` to the membrane once the step's duration has elapsed.
    Ramp { target: f64 },
    Propagate,
    ResetPropagation,
    Hold,
    ReleaseTransmitter,
    SetEffect(PostsynapticEffect),
    ClearRelease,
    EndFiring,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub action: Action,
    pub duration: f64,
}

impl Step {
    pub fn instant(action: Action) -> Self {
        Step {
            action,
            duration: 0.0,
        }
    }

    pub fn timed(action: Action, duration: f64) -> Self {
        Step {
            action,
            duration: duration.max(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SequenceKind {
    Firing,
    /// `baseline` is the voltage the transient decays back to.
    Subthreshold { baseline: f64 },
}

/// Receives steps from a running [`Sequence`].
pub trait StepDriver {
    fn begin(&mut self, action: &Action);

    fn finish(&mut self, _action: &Action) {}
}

/// An ordered list of timed steps advanced by a cooperative clock.
///
/// Each step begins, then occupies its duration, then finishes before the
/// next one begins. Instant steps begin and finish inside the same advance.
#[derive(Clone, Debug)]
pub struct Sequence {
    kind: SequenceKind,
    steps: VecDeque<Step>,
    current: Option<Step>,
    elapsed: f64,
}

impl Sequence {
    pub fn new(kind: SequenceKind, steps: impl IntoIterator<Item = Step>) -> Self {
        Sequence {
            kind,
            steps: steps.into_iter().collect(),
            current: None,
            elapsed: 0.0,
        }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn current(&self) -> Option<&Step> {
        self.current.as_ref()
    }

    /// Fraction of the current step already elapsed, in `[0, 1]`.
    pub fn step_fraction(&self) -> f64 {
        match self.current {
            Some(step) if step.duration > 0.0 => (self.elapsed / step.duration).clamp(0.0, 1.0),
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none() && self.steps.is_empty()
    }

    pub fn remaining_steps(&self) -> usize {
        self.steps.len() + usize::from(self.current.is_some())
    }

    /// Runs the clock forward by `dt` seconds. A `dt` that is negative or not
    /// finite counts as zero; an infinite one drains the sequence.
    pub fn advance(&mut self, dt: f64, driver: &mut impl StepDriver) {
        let mut budget = if dt.is_nan() { 0.0 } else { dt.max(0.0) };

        loop {
            let step = match self.current {
                Some(step) => step,
                None => {
                    let Some(step) = self.steps.pop_front() else {
                        return;
                    };
                    self.elapsed = 0.0;
                    self.current = Some(step);
                    driver.begin(&step.action);
                    step
                }
            };

            let remaining = (step.duration - self.elapsed).max(0.0);
            if budget < remaining {
                self.elapsed += budget;
                return;
            }

            budget -= remaining;
            self.elapsed = step.duration;
            self.current = None;
            driver.finish(&step.action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use itertools::assert_equal;

    #[derive(Default)]
    struct Recorder {
        log: Vec<(&'static str, Action)>,
    }

    impl StepDriver for Recorder {
        fn begin(&mut self, action: &Action) {
            self.log.push(("begin", *action));
        }

        fn finish(&mut self, action: &Action) {
            self.log.push(("finish", *action));
        }
    }

    fn two_step() -> Sequence {
        Sequence::new(
            SequenceKind::Firing,
            [
                Step::timed(Action::Ramp { target: 40.0 }, 0.2),
                Step::instant(Action::EndFiring),
            ],
        )
    }

    #[test]
    fn zero_advance_begins_first_step() {
        let mut sut = two_step();
        let mut rec = Recorder::default();
        sut.advance(0.0, &mut rec);
        assert_equal(rec.log, [("begin", Action::Ramp { target: 40.0 })]);
        assert_approx_eq!(f64, sut.step_fraction(), 0.0);
        assert!(!sut.is_finished());
    }

    #[test]
    fn partial_advance_tracks_fraction() {
        let mut sut = two_step();
        let mut rec = Recorder::default();
        sut.advance(0.05, &mut rec);
        assert_approx_eq!(f64, sut.step_fraction(), 0.25, epsilon = 1e-12);
        sut.advance(0.05, &mut rec);
        assert_approx_eq!(f64, sut.step_fraction(), 0.5, epsilon = 1e-12);
        assert_eq!(rec.log.len(), 1);
    }

    #[test]
    fn crossing_a_boundary_runs_following_instant_steps() {
        let mut sut = two_step();
        let mut rec = Recorder::default();
        sut.advance(0.3, &mut rec);
        assert_equal(
            rec.log,
            [
                ("begin", Action::Ramp { target: 40.0 }),
                ("finish", Action::Ramp { target: 40.0 }),
                ("begin", Action::EndFiring),
                ("finish", Action::EndFiring),
            ],
        );
        assert!(sut.is_finished());
    }

    #[test]
    fn infinite_advance_drains() {
        let mut sut = Sequence::new(
            SequenceKind::Subthreshold { baseline: -70.0 },
            [
                Step::timed(Action::Hold, 1.0),
                Step::timed(Action::Hold, 2.0),
                Step::timed(Action::Hold, 3.0),
            ],
        );
        let mut rec = Recorder::default();
        sut.advance(f64::INFINITY, &mut rec);
        assert!(sut.is_finished());
        assert_eq!(rec.log.len(), 6);
    }

    #[test]
    fn invalid_dt_counts_as_zero() {
        let mut sut = two_step();
        let mut rec = Recorder::default();
        sut.advance(f64::NAN, &mut rec);
        sut.advance(-1.0, &mut rec);
        assert_eq!(rec.log.len(), 1);
        assert_eq!(sut.remaining_steps(), 2);
        assert_approx_eq!(f64, sut.step_fraction(), 0.0);
    }

    #[test]
    fn negative_durations_are_instant() {
        let step = Step::timed(Action::Hold, -3.0);
        assert_approx_eq!(f64, step.duration, 0.0);
    }
}
