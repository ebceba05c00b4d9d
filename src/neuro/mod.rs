pub mod neuron;
pub mod sequence;
pub mod simulation;
pub mod stimuli;
pub mod synapse;
pub mod trace;
