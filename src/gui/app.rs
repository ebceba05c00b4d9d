use std::sync::mpsc::{self, Receiver};

use egui_plot::{Line, Plot, PlotPoints};

use crate::gui::layout::{Particle, draw_axon, draw_synapse, phase_color, sync_particles};
use neuropulse::neuro::{
    simulation::{Change, Simulation},
    stimuli::StimulusOutcome,
};

const MAX_LOG_LINES: usize = 200;

pub struct App {
    sim: Simulation,
    changes: Receiver<Change>,
    strength: f64,

    log_messages: Vec<String>,
    follow_logs: bool,

    particles: Vec<Particle>,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut sim = Simulation::default();

        let (tx, rx) = mpsc::channel();
        sim.subscribe(move |change| {
            let _ = tx.send(change.clone());
        });

        Self {
            sim,
            changes: rx,
            strength: 20.0,

            log_messages: vec![],
            follow_logs: true,

            particles: vec![],
        }
    }

    fn push_log(&mut self, message: String) {
        self.log_messages.push(message);
        if self.log_messages.len() > MAX_LOG_LINES {
            let overflow = self.log_messages.len() - MAX_LOG_LINES;
            self.log_messages.drain(..overflow);
        }
    }

    fn drain_changes(&mut self) {
        let time = self.sim.time();
        let pending: Vec<Change> = self.changes.try_iter().collect();
        for change in pending {
            if matches!(change, Change::Propagation(_)) {
                continue;
            }
            self.push_log(format!("{time:>7.2}s  {change}"));
        }
    }

    fn stimulate(&mut self) {
        let outcome = self.sim.apply_stimulus(self.strength);
        if let StimulusOutcome::Subthreshold { potential } = outcome {
            self.push_log(format!(
                "below threshold: {potential:.1} mV < {:.1} mV",
                self.sim.config().theta
            ));
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt) as f64;
        self.sim.tick(dt);
        self.drain_changes();
        sync_particles(&mut self.particles, self.sim.transmitters(), self.sim.time());

        if self.sim.is_busy() {
            ctx.request_repaint();
        }

        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Stimulus");
            ui.add(egui::Slider::new(&mut self.strength, 0.0..=100.0).text("strength"));

            let potential = self.sim.config().v_rest + self.strength;
            ui.label(format!("Expected depolarization: {potential:.1} mV"));

            ui.horizontal(|ui| {
                let idle = !self.sim.is_firing();
                if ui.add_enabled(idle, egui::Button::new("Stimulate")).clicked() {
                    self.stimulate();
                }
                if ui.button("Reset").clicked() {
                    self.sim.reset();
                    self.particles.clear();
                }
            });
            ui.separator();

            let phase = self.sim.phase();
            ui.colored_label(phase_color(phase), format!("Phase: {}", phase.label()));
            ui.label(format!("Membrane: {:.1} mV", self.sim.displayed_voltage()));
            ui.label(format!("Postsynaptic: {}", self.sim.effect().label()));
            ui.separator();

            ui.horizontal(|ui| {
                ui.heading("Events");
                ui.checkbox(&mut self.follow_logs, "Follow");
                if ui.button("Clear").clicked() {
                    self.log_messages.clear();
                }
            });
            egui::ScrollArea::vertical()
                .id_salt("event_log")
                .stick_to_bottom(self.follow_logs)
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for message in &self.log_messages {
                        ui.monospace(message);
                    }
                });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Membrane Potential");

            let total = ui.available_size();
            let plot_height = (total.y * 0.5).max(120.0);
            let history_len = self.sim.history().len();
            let theta = self.sim.config().theta;

            let plot = Plot::new("voltage_plot")
                .height(plot_height)
                .include_y(-90.0)
                .include_y(50.0)
                .include_x(0.0)
                .include_x(history_len as f64);

            plot.show(ui, |plot_ui| {
                let points: PlotPoints = self
                    .sim
                    .history()
                    .iter()
                    .enumerate()
                    .map(|(t, v)| [t as f64, v])
                    .collect();
                plot_ui.line(Line::new("Vm", points).color(phase_color(self.sim.phase())));

                let threshold: PlotPoints = [[0.0, theta], [history_len as f64, theta]]
                    .into_iter()
                    .collect();
                plot_ui.line(
                    Line::new("threshold", threshold)
                        .color(egui::Color32::from_rgba_unmultiplied(255, 0, 0, 120)),
                );
            });

            ui.separator();
            ui.heading("Axon");
            draw_axon(ui, self.sim.propagation(), self.sim.phase());

            ui.separator();
            ui.heading("Synapse");
            draw_synapse(ui, &self.particles, self.sim.effect(), self.sim.time());
        });
    }
}
