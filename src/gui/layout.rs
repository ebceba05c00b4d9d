use egui::{Color32, Pos2, Vec2};
use rand::Rng;

use neuropulse::neuro::{
    neuron::{Phase, PostsynapticEffect},
    synapse::Transmitter,
};

/// Seconds a particle takes to cross the cleft.
const CLEFT_CROSSING: f64 = 0.6;

/// On-screen state of one transmitter token. The jitter is cosmetic and never
/// flows back into the model.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub token: Transmitter,
    pub jitter: Vec2,
    pub born: f64,
}

pub fn phase_color(phase: Phase) -> Color32 {
    match phase {
        Phase::Resting => Color32::from_rgb(100, 149, 237),
        Phase::Depolarizing => Color32::from_rgb(255, 165, 0),
        Phase::Repolarizing => Color32::from_rgb(50, 205, 50),
        Phase::Hyperpolarizing => Color32::from_rgb(147, 112, 219),
    }
}

fn effect_color(effect: PostsynapticEffect) -> Color32 {
    match effect {
        PostsynapticEffect::None => Color32::from_gray(110),
        PostsynapticEffect::Excitatory => Color32::from_rgb(80, 180, 120),
        PostsynapticEffect::Inhibitory => Color32::from_rgb(220, 100, 100),
    }
}

/// Keeps one particle per live transmitter, jittering newly released ones.
pub fn sync_particles(particles: &mut Vec<Particle>, batch: &[Transmitter], now: f64) {
    particles.retain(|p| batch.contains(&p.token));

    let mut rng = rand::rng();
    for token in batch {
        if particles.iter().any(|p| p.token == *token) {
            continue;
        }
        particles.push(Particle {
            token: *token,
            jitter: Vec2::new(
                rng.random_range(-6.0..6.0),
                rng.random_range(-18.0..18.0),
            ),
            born: now,
        });
    }
}

pub fn draw_axon(ui: &mut egui::Ui, progress: f64, phase: Phase) {
    let desired = egui::vec2(ui.available_width(), 60.0);
    let (response, painter) = ui.allocate_painter(desired, egui::Sense::hover());
    let rect = response.rect.shrink(12.0);

    let soma = Pos2::new(rect.left() + 20.0, rect.center().y);
    let terminal = Pos2::new(rect.right() - 12.0, rect.center().y);

    painter.line_segment(
        [soma, terminal],
        egui::Stroke::new(6.0, Color32::from_gray(90)),
    );
    painter.circle_filled(soma, 20.0, phase_color(phase));
    painter.circle_stroke(soma, 20.0, egui::Stroke::new(2.0, Color32::WHITE));
    painter.circle_filled(terminal, 10.0, Color32::from_gray(140));

    if progress > 0.0 {
        let t = progress.clamp(0.0, 1.0) as f32;
        let pulse = Pos2::new(soma.x + (terminal.x - soma.x) * t, soma.y);
        painter.line_segment(
            [soma, pulse],
            egui::Stroke::new(6.0, Color32::from_rgb(255, 215, 0).linear_multiply(0.5)),
        );
        painter.circle_filled(pulse, 9.0, Color32::from_rgb(255, 215, 0));
    }
}

pub fn draw_synapse(
    ui: &mut egui::Ui,
    particles: &[Particle],
    effect: PostsynapticEffect,
    now: f64,
) {
    let desired = egui::vec2(ui.available_width(), ui.available_height().max(140.0));
    let (response, painter) = ui.allocate_painter(desired, egui::Sense::hover());
    let rect = response.rect.shrink(12.0);

    let cleft_left = rect.center().x - 40.0;
    let cleft_right = rect.center().x + 40.0;
    let mid_y = rect.center().y;

    let pre = egui::Rect::from_min_max(
        Pos2::new(cleft_left - 120.0, mid_y - 50.0),
        Pos2::new(cleft_left, mid_y + 50.0),
    );
    let post = egui::Rect::from_min_max(
        Pos2::new(cleft_right, mid_y - 50.0),
        Pos2::new(cleft_right + 120.0, mid_y + 50.0),
    );

    painter.rect_filled(pre, 12.0, Color32::from_gray(140));
    painter.rect_filled(post, 12.0, effect_color(effect));

    let font = egui::FontId::proportional(14.0);
    painter.text(
        pre.center(),
        egui::Align2::CENTER_CENTER,
        "Presynaptic",
        font.clone(),
        Color32::BLACK,
    );
    painter.text(
        post.center(),
        egui::Align2::CENTER_CENTER,
        effect.label(),
        font,
        Color32::WHITE,
    );

    for particle in particles {
        let travelled = ((now - particle.born) / CLEFT_CROSSING).clamp(0.0, 1.0) as f32;
        let x = cleft_left + (cleft_right - cleft_left) * travelled;
        let pos = Pos2::new(x, mid_y) + particle.jitter;
        painter.circle_filled(pos, 4.0, Color32::from_rgb(255, 105, 180));
    }
}
