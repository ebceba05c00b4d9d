use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Resting,
    Depolarizing,
    Repolarizing,
    Hyperpolarizing,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Resting,
        Phase::Depolarizing,
        Phase::Repolarizing,
        Phase::Hyperpolarizing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Resting => "Resting",
            Phase::Depolarizing => "Depolarizing",
            Phase::Repolarizing => "Repolarizing",
            Phase::Hyperpolarizing => "Hyperpolarizing",
        }
    }
}

/// Response of the receiving cell. Only `None` and `Excitatory` are produced
/// by the release sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostsynapticEffect {
    #[default]
    None,
    Excitatory,
    Inhibitory,
}

impl PostsynapticEffect {
    pub fn label(self) -> &'static str {
        match self {
            PostsynapticEffect::None => "None",
            PostsynapticEffect::Excitatory => "Excitatory (EPSP)",
            PostsynapticEffect::Inhibitory => "Inhibitory (IPSP)",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeuronConfig {
    pub v_rest: f64,
    pub theta: f64,
    pub v_peak: f64,
    pub undershoot: f64,
    pub history_len: usize,
    pub batch_size: usize,
    pub timing: Timing,
}

impl NeuronConfig {
    /// Bottom of the after-hyperpolarization.
    pub fn v_trough(&self) -> f64 {
        self.v_rest - self.undershoot
    }
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self {
            v_rest: -70.0,     // Resting membrane potential (mV)
            theta: -55.0,      // Firing threshold, inclusive (mV)
            v_peak: 40.0,      // Action potential overshoot (mV)
            undershoot: 10.0,  // Hyperpolarization below rest (mV)
            history_len: 200,  // Voltage samples kept for plotting
            batch_size: 10,    // Transmitter tokens per release
            timing: Timing::default(),
        }
    }
}

/// Step durations, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub rise: f64,
    pub propagation: f64,
    pub fall: f64,
    pub recovery: f64,
    pub sub_rise: f64,
    pub sub_hold: f64,
    pub sub_decay: f64,
    pub diffusion: f64,
    pub effect_in: f64,
    pub effect_dwell: f64,
    pub effect_out: f64,
}

impl Timing {
    pub fn release_total(&self) -> f64 {
        self.diffusion + self.effect_in + self.effect_dwell + self.effect_out
    }

    /// Wall time of a complete action potential, release included.
    pub fn firing_total(&self) -> f64 {
        self.rise + self.propagation + self.release_total() + self.fall + self.recovery
    }

    pub fn subthreshold_total(&self) -> f64 {
        self.sub_rise + self.sub_hold + self.sub_decay
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            rise: 0.2,
            propagation: 0.5,
            fall: 0.3,
            recovery: 0.4,
            sub_rise: 0.1,
            sub_hold: 0.2,
            sub_decay: 0.2,
            diffusion: 0.05,
            effect_in: 0.6,
            effect_dwell: 0.8,
            effect_out: 0.5,
        }
    }
}
