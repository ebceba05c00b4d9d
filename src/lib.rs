//! Action potential and synaptic transmission model behind the NeuroPulse
//! viewer.

pub mod neuro;
