use serde::{Deserialize, Serialize};

use crate::neuro::{
    neuron::{NeuronConfig, Phase},
    sequence::{Action, Sequence, SequenceKind, Step},
    synapse::SynapticRelease,
};

/// What happened to a stimulus handed to the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum StimulusOutcome {
    Fired,
    Subthreshold { potential: f64 },
    /// Arrived while an action potential was in progress.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GateDecision {
    Fire,
    Subthreshold { potential: f64 },
}

/// All-or-none gate: a stimulus either produces the full action potential or
/// a transient that decays back without firing.
#[derive(Clone, Copy, Debug)]
pub struct StimulusGate {
    config: NeuronConfig,
}

impl StimulusGate {
    pub fn new(config: NeuronConfig) -> Self {
        Self { config }
    }

    pub fn decide(&self, strength: f64) -> GateDecision {
        let potential = self.config.v_rest + strength;

        if potential >= self.config.theta {
            GateDecision::Fire
        } else {
            GateDecision::Subthreshold { potential }
        }
    }

    pub fn plan(&self, decision: GateDecision, baseline: f64) -> Sequence {
        match decision {
            GateDecision::Fire => self.firing_sequence(),
            GateDecision::Subthreshold { potential } => {
                self.subthreshold_sequence(potential, baseline)
            }
        }
    }

    pub fn firing_sequence(&self) -> Sequence {
        let cfg = &self.config;
        let timing = &cfg.timing;

        let mut steps = vec![
            Step::instant(Action::EnterPhase(Phase::Depolarizing)),
            Step::timed(Action::Ramp { target: cfg.v_peak }, timing.rise),
            Step::timed(Action::Propagate, timing.propagation),
        ];
        steps.extend(SynapticRelease::steps(timing));
        steps.extend([
            Step::instant(Action::ResetPropagation),
            Step::instant(Action::EnterPhase(Phase::Repolarizing)),
            Step::timed(Action::Ramp { target: cfg.v_trough() }, timing.fall),
            Step::instant(Action::EnterPhase(Phase::Hyperpolarizing)),
            Step::timed(Action::Ramp { target: cfg.v_rest }, timing.recovery),
            Step::instant(Action::EnterPhase(Phase::Resting)),
            Step::instant(Action::EndFiring),
        ]);

        Sequence::new(SequenceKind::Firing, steps)
    }

    pub fn subthreshold_sequence(&self, potential: f64, baseline: f64) -> Sequence {
        let timing = &self.config.timing;

        Sequence::new(
            SequenceKind::Subthreshold { baseline },
            [
                Step::instant(Action::EnterPhase(Phase::Depolarizing)),
                Step::timed(Action::Ramp { target: potential }, timing.sub_rise),
                Step::timed(Action::Hold, timing.sub_hold),
                Step::timed(Action::Ramp { target: baseline }, timing.sub_decay),
                Step::instant(Action::EnterPhase(Phase::Resting)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> StimulusGate {
        StimulusGate::new(NeuronConfig::default())
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(gate().decide(15.0), GateDecision::Fire);
    }

    #[test]
    fn just_below_threshold() {
        match gate().decide(14.9) {
            GateDecision::Subthreshold { potential } => assert!(potential < -55.0),
            other => panic!("expected subthreshold, got {other:?}"),
        }
    }

    #[test]
    fn zero_strength_stays_at_rest() {
        assert_eq!(
            gate().decide(0.0),
            GateDecision::Subthreshold { potential: -70.0 }
        );
    }

    #[test]
    fn strong_stimulus_fires() {
        assert_eq!(gate().decide(100.0), GateDecision::Fire);
        assert_eq!(gate().decide(20.0), GateDecision::Fire);
    }

    #[test]
    fn firing_sequence_shape() {
        let seq = gate().firing_sequence();
        assert_eq!(seq.kind(), SequenceKind::Firing);
        // 3 lead-in, 4 release, 7 recovery
        assert_eq!(seq.remaining_steps(), 14);
    }

    #[test]
    fn subthreshold_returns_to_baseline() {
        let seq = gate().plan(GateDecision::Subthreshold { potential: -60.0 }, -70.0);
        assert_eq!(seq.kind(), SequenceKind::Subthreshold { baseline: -70.0 });
        assert_eq!(seq.remaining_steps(), 5);
    }
}
