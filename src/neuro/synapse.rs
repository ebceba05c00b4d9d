use serde::{Deserialize, Serialize};

use crate::neuro::{
    neuron::{PostsynapticEffect, Timing},
    sequence::{Action, Step},
};

/// One released neurotransmitter particle. Identity only, no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transmitter {
    pub id: u64,
}

/// Presynaptic release state and the postsynaptic response it drives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SynapticRelease {
    batch: Vec<Transmitter>,
    effect: PostsynapticEffect,
    next_id: u64,
}

impl SynapticRelease {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps of one release: diffusion, excitatory response, dwell, clear.
    pub fn steps(timing: &Timing) -> [Step; 4] {
        [
            Step::timed(Action::ReleaseTransmitter, timing.diffusion),
            Step::timed(Action::SetEffect(PostsynapticEffect::Excitatory), timing.effect_in),
            Step::timed(Action::Hold, timing.effect_dwell),
            Step::timed(Action::ClearRelease, timing.effect_out),
        ]
    }

    /// Replaces the current batch with `size` fresh tokens.
    pub fn release(&mut self, size: usize) {
        let first = self.next_id;
        self.next_id += size as u64;
        self.batch = (first..self.next_id).map(|id| Transmitter { id }).collect();
    }

    pub fn set_effect(&mut self, effect: PostsynapticEffect) {
        self.effect = effect;
    }

    /// Ends the release: the effect and the batch go together.
    pub fn clear(&mut self) {
        self.effect = PostsynapticEffect::None;
        self.batch.clear();
    }

    pub fn batch(&self) -> &[Transmitter] {
        &self.batch
    }

    pub fn effect(&self) -> PostsynapticEffect {
        self.effect
    }

    pub fn is_active(&self) -> bool {
        !self.batch.is_empty() || self.effect != PostsynapticEffect::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn release_creates_a_full_batch() {
        let mut sut = SynapticRelease::new();
        sut.release(10);
        assert_eq!(sut.batch().len(), 10);
        assert!(sut.is_active());
    }

    #[test]
    fn release_replaces_rather_than_accumulates() {
        let mut sut = SynapticRelease::new();
        sut.release(10);
        let first = sut.batch().to_vec();
        sut.release(10);
        assert_eq!(sut.batch().len(), 10);
        assert!(sut.batch().iter().all(|token| !first.contains(token)));
    }

    #[test]
    fn clear_resets_effect_and_batch_together() {
        let mut sut = SynapticRelease::new();
        sut.release(10);
        sut.set_effect(PostsynapticEffect::Excitatory);
        sut.clear();
        assert!(sut.batch().is_empty());
        assert_eq!(sut.effect(), PostsynapticEffect::None);
        assert!(!sut.is_active());
    }

    #[test]
    fn release_steps_follow_timing() {
        let timing = Timing::default();
        let steps = SynapticRelease::steps(&timing);
        assert_eq!(steps[0].action, Action::ReleaseTransmitter);
        assert_eq!(
            steps[1].action,
            Action::SetEffect(PostsynapticEffect::Excitatory)
        );
        assert_eq!(steps[3].action, Action::ClearRelease);
        let total: f64 = steps.iter().map(|s| s.duration).sum();
        assert_approx_eq!(f64, total, timing.release_total(), epsilon = 1e-12);
    }
}
