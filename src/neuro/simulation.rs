use std::fmt;

use serde::Serialize;

use crate::neuro::{
    neuron::{NeuronConfig, Phase, PostsynapticEffect},
    sequence::{Action, Sequence, SequenceKind, StepDriver},
    stimuli::{GateDecision, StimulusGate, StimulusOutcome},
    synapse::{SynapticRelease, Transmitter},
    trace::VoltageTrace,
};

/// A single observable mutation, pushed to every listener.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Change {
    Phase(Phase),
    Voltage(f64),
    Firing(bool),
    Propagation(f64),
    Transmitters(usize),
    Effect(PostsynapticEffect),
    Reset,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Phase(phase) => write!(f, "phase -> {}", phase.label()),
            Change::Voltage(v) => write!(f, "voltage -> {v:.1} mV"),
            Change::Firing(true) => write!(f, "firing started"),
            Change::Firing(false) => write!(f, "firing finished"),
            Change::Propagation(p) => write!(f, "propagation {:.0}%", p * 100.0),
            Change::Transmitters(n) => write!(f, "{n} transmitter particles"),
            Change::Effect(effect) => write!(f, "postsynaptic -> {}", effect.label()),
            Change::Reset => write!(f, "reset"),
        }
    }
}

pub type Listener = Box<dyn FnMut(&Change)>;

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub time: f64,
    pub phase: Phase,
    pub voltage: f64,
    pub displayed_voltage: f64,
    pub firing: bool,
    pub propagation: f64,
    pub transmitters: Vec<Transmitter>,
    pub effect: PostsynapticEffect,
    pub history: Vec<f64>,
}

struct Membrane {
    config: NeuronConfig,
    phase: Phase,
    voltage: f64,
    ramp_from: f64,
    trace: VoltageTrace,
    firing: bool,
    propagation: f64,
    synapse: SynapticRelease,
    listeners: Vec<Listener>,
}

impl Membrane {
    fn new(config: NeuronConfig) -> Self {
        Membrane {
            config,
            phase: Phase::Resting,
            voltage: config.v_rest,
            ramp_from: config.v_rest,
            trace: VoltageTrace::filled(config.history_len, config.v_rest),
            firing: false,
            propagation: 0.0,
            synapse: SynapticRelease::new(),
            listeners: Vec::new(),
        }
    }

    fn emit(&mut self, change: Change) {
        for listener in &mut self.listeners {
            listener(&change);
        }
    }

    fn set_firing(&mut self, firing: bool) {
        self.firing = firing;
        self.emit(Change::Firing(firing));
    }

    fn set_propagation(&mut self, progress: f64) {
        let progress = progress.clamp(0.0, 1.0);
        if progress != self.propagation {
            self.propagation = progress;
            self.emit(Change::Propagation(progress));
        }
    }

    fn clear(&mut self) {
        let v_rest = self.config.v_rest;
        self.phase = Phase::Resting;
        self.voltage = v_rest;
        self.ramp_from = v_rest;
        self.trace.fill(v_rest);
        self.firing = false;
        self.propagation = 0.0;
        self.synapse.clear();
        self.emit(Change::Reset);
    }
}

impl StepDriver for Membrane {
    fn begin(&mut self, action: &Action) {
        match *action {
            Action::EnterPhase(phase) => {
                log::debug!("{} -> {}", self.phase.label(), phase.label());
                self.phase = phase;
                self.emit(Change::Phase(phase));
            }
            Action::Ramp { .. } => {
                self.ramp_from = self.voltage;
            }
            Action::Propagate | Action::ResetPropagation => self.set_propagation(0.0),
            Action::Hold => {}
            Action::ReleaseTransmitter => {
                self.synapse.release(self.config.batch_size);
                log::debug!("released {} transmitter particles", self.synapse.batch().len());
                self.emit(Change::Transmitters(self.synapse.batch().len()));
            }
            Action::SetEffect(effect) => {
                self.synapse.set_effect(effect);
                self.emit(Change::Effect(effect));
            }
            Action::ClearRelease => {
                self.synapse.clear();
                self.emit(Change::Effect(PostsynapticEffect::None));
                self.emit(Change::Transmitters(0));
            }
            Action::EndFiring => self.set_firing(false),
        }
    }

    fn finish(&mut self, action: &Action) {
        match *action {
            Action::Ramp { target } => {
                self.voltage = target;
                self.ramp_from = target;
                self.trace.push(target);
                self.emit(Change::Voltage(target));
            }
            Action::Propagate => self.set_propagation(1.0),
            _ => {}
        }
    }
}

/// The neuron model: sole owner of all mutable state, driven by stimuli and
/// a cooperative clock.
pub struct Simulation {
    gate: StimulusGate,
    membrane: Membrane,
    sequence: Option<Sequence>,
    time: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(NeuronConfig::default())
    }
}

impl Simulation {
    pub fn new(config: NeuronConfig) -> Self {
        Simulation {
            gate: StimulusGate::new(config),
            membrane: Membrane::new(config),
            sequence: None,
            time: 0.0,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Change) + 'static) {
        self.membrane.listeners.push(Box::new(listener));
    }

    pub fn apply_stimulus(&mut self, strength: f64) -> StimulusOutcome {
        if self.membrane.firing {
            log::debug!("stimulus {strength:.1} ignored, action potential in progress");
            return StimulusOutcome::Ignored;
        }

        let decision = self.gate.decide(strength);
        let baseline = match self.sequence.as_ref().map(Sequence::kind) {
            Some(SequenceKind::Subthreshold { baseline }) => baseline,
            _ => self.membrane.voltage,
        };

        let outcome = match decision {
            GateDecision::Fire => {
                log::info!("stimulus {strength:.1} crossed threshold, firing");
                self.membrane.set_firing(true);
                StimulusOutcome::Fired
            }
            GateDecision::Subthreshold { potential } => {
                log::info!("stimulus {strength:.1} below threshold ({potential:.1} mV)");
                StimulusOutcome::Subthreshold { potential }
            }
        };

        self.sequence = Some(self.gate.plan(decision, baseline));
        self.advance(0.0);

        outcome
    }

    /// Returns every component to its initial state and cancels any running
    /// sequence.
    pub fn reset(&mut self) {
        if self.sequence.take().is_some() {
            log::info!("reset cancelled the running sequence");
        }
        self.membrane.clear();
    }

    /// Advances the clock by `dt` seconds. Negative or non-finite steps
    /// count as zero.
    pub fn tick(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.time += dt;
        self.advance(dt);
    }

    /// Runs the current sequence to completion without waiting.
    pub fn settle(&mut self) {
        self.advance(f64::INFINITY);
    }

    fn advance(&mut self, dt: f64) {
        let Some(sequence) = self.sequence.as_mut() else {
            return;
        };

        sequence.advance(dt, &mut self.membrane);

        if let Some(step) = sequence.current() {
            if step.action == Action::Propagate {
                let progress = sequence.step_fraction();
                self.membrane.set_propagation(progress);
            }
        }

        if sequence.is_finished() {
            self.sequence = None;
        }
    }

    pub fn config(&self) -> &NeuronConfig {
        &self.membrane.config
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn phase(&self) -> Phase {
        self.membrane.phase
    }

    pub fn voltage(&self) -> f64 {
        self.membrane.voltage
    }

    /// Voltage interpolated across the ramp in progress, for drawing.
    pub fn displayed_voltage(&self) -> f64 {
        let Some(sequence) = self.sequence.as_ref() else {
            return self.membrane.voltage;
        };

        match sequence.current().map(|step| step.action) {
            Some(Action::Ramp { target }) => {
                let from = self.membrane.ramp_from;
                from + (target - from) * sequence.step_fraction()
            }
            _ => self.membrane.voltage,
        }
    }

    pub fn history(&self) -> &VoltageTrace {
        &self.membrane.trace
    }

    pub fn is_firing(&self) -> bool {
        self.membrane.firing
    }

    /// True while any sequence, firing or sub-threshold, is still running.
    pub fn is_busy(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn propagation(&self) -> f64 {
        self.membrane.propagation
    }

    pub fn transmitters(&self) -> &[Transmitter] {
        self.membrane.synapse.batch()
    }

    pub fn effect(&self) -> PostsynapticEffect {
        self.membrane.synapse.effect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.time,
            phase: self.phase(),
            voltage: self.voltage(),
            displayed_voltage: self.displayed_voltage(),
            firing: self.is_firing(),
            propagation: self.propagation(),
            transmitters: self.transmitters().to_vec(),
            effect: self.effect(),
            history: self.membrane.trace.to_vec(),
        }
    }
}
