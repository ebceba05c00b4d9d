use std::{path::Path, sync::mpsc};

use anyhow::Context;
use plotly::{Plot, Scatter, common::Mode};
use serde::Serialize;

use crate::cli::RunArgs;
use neuropulse::neuro::{
    simulation::{Change, Simulation, Snapshot},
    stimuli::StimulusOutcome,
};

#[derive(Serialize)]
struct TimelineEntry {
    time: f64,
    change: Change,
}

struct Recording {
    outcome: StimulusOutcome,
    timeline: Vec<TimelineEntry>,
    samples: Vec<(f64, f64)>,
    last: Snapshot,
}

pub fn run(args: &RunArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=100.0).contains(&args.strength),
        "stimulus strength must be within 0..=100, got {}",
        args.strength
    );
    anyhow::ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "dt must be a positive number of seconds, got {}",
        args.dt
    );

    let recording = record(args.strength, args.dt);

    if args.json {
        for entry in &recording.timeline {
            println!("{}", serde_json::to_string(entry)?);
        }
        println!("{}", serde_json::to_string(&recording.last)?);
    } else {
        println!("stimulus {:.1}: {:?}", args.strength, recording.outcome);
        for entry in &recording.timeline {
            if matches!(entry.change, Change::Propagation(_)) {
                continue;
            }
            println!("{:>7.3}s  {}", entry.time, entry.change);
        }
    }

    if let Some(path) = &args.plot {
        write_plot(path, args.strength, &recording.samples)?;
        log::info!("wrote voltage chart to {}", path.display());
    }

    Ok(())
}

fn record(strength: f64, dt: f64) -> Recording {
    let mut sim = Simulation::default();

    let (tx, rx) = mpsc::channel();
    sim.subscribe(move |change| {
        let _ = tx.send(change.clone());
    });

    let outcome = sim.apply_stimulus(strength);

    let mut timeline = Vec::new();
    let mut samples = Vec::new();

    loop {
        timeline.extend(rx.try_iter().map(|change| TimelineEntry {
            time: sim.time(),
            change,
        }));
        samples.push((sim.time(), sim.displayed_voltage()));

        if !sim.is_busy() {
            break;
        }
        sim.tick(dt);
    }

    Recording {
        outcome,
        timeline,
        samples,
        last: sim.snapshot(),
    }
}

fn write_plot(path: &Path, strength: f64, samples: &[(f64, f64)]) -> anyhow::Result<()> {
    let (times, volts): (Vec<f64>, Vec<f64>) = samples.iter().copied().unzip();
    let threshold = Simulation::default().config().theta;

    let label = format!("Vm, stimulus {strength:.0}");

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(times.clone(), volts)
            .mode(Mode::Lines)
            .name(label.as_str()),
    );
    plot.add_trace(
        Scatter::new(times, vec![threshold; samples.len()])
            .mode(Mode::Lines)
            .name("threshold"),
    );

    std::fs::write(path, plot.to_html())
        .with_context(|| format!("failed to write chart to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use neuropulse::neuro::neuron::Phase;

    #[test]
    fn firing_recording_ends_at_rest() {
        let recording = record(100.0, 0.01);
        assert_eq!(recording.outcome, StimulusOutcome::Fired);
        assert_eq!(recording.last.phase, Phase::Resting);
        assert!(!recording.last.firing);
        assert!(
            recording
                .timeline
                .iter()
                .any(|entry| entry.change == Change::Voltage(40.0))
        );
        let peak = recording
            .samples
            .iter()
            .map(|&(_, v)| v)
            .fold(f64::MIN, f64::max);
        assert_approx_eq!(f64, peak, 40.0);
    }

    #[test]
    fn subthreshold_recording_is_short() {
        let recording = record(0.0, 0.01);
        assert!(matches!(
            recording.outcome,
            StimulusOutcome::Subthreshold { .. }
        ));
        let end = recording.samples.last().map(|s| s.0).unwrap_or_default();
        assert!(end < 1.0);
    }

    #[test]
    fn rejects_out_of_range_strength() {
        let args = RunArgs {
            strength: 150.0,
            dt: 0.01,
            json: false,
            plot: None,
        };
        assert!(run(&args).is_err());
    }

    #[test]
    fn rejects_non_positive_dt() {
        let args = RunArgs {
            strength: 20.0,
            dt: 0.0,
            json: false,
            plot: None,
        };
        assert!(run(&args).is_err());
    }
}
