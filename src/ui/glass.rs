//! Frosted panel and shimmering heading used by both pages

use eframe::egui::{self, text::LayoutJob, Color32, FontId, Stroke, TextFormat};

/// Resting colour of [`ShinyText`] glyphs
const SHINY_BASE: Color32 = Color32::from_rgb(0xB5, 0xB5, 0xB5);
/// Half-width of the highlight band, in characters
const SHINE_BAND: f32 = 3.0;

/// Width rule for a glass panel: a fraction of the available width, clamped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelWidth {
    pub fraction: f32,
    pub min: f32,
    pub max: f32,
}

impl PanelWidth {
    pub fn resolve(&self, available: f32) -> f32 {
        (available * self.fraction).clamp(self.min, self.max)
    }
}

/// Translucent rounded panel
pub struct GlassSurface {
    width: PanelWidth,
    corner_radius: u8,
}

impl GlassSurface {
    pub fn new(width: PanelWidth) -> Self {
        Self {
            width,
            corner_radius: 24,
        }
    }

    pub fn show<R>(
        self,
        ui: &mut egui::Ui,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> egui::InnerResponse<R> {
        let margin = 28;
        let width = self.width.resolve(ui.available_width());

        egui::Frame::new()
            .fill(Color32::from_rgba_unmultiplied(255, 255, 255, 18))
            .stroke(Stroke::new(1.0, Color32::from_rgba_unmultiplied(255, 255, 255, 48)))
            .corner_radius(egui::CornerRadius::same(self.corner_radius))
            .inner_margin(egui::Margin::same(margin))
            .show(ui, |ui| {
                ui.set_width(width - 2.0 * margin as f32);
                add_contents(ui)
            })
    }
}

/// Heading with a highlight band sweeping across it
pub struct ShinyText<'a> {
    text: &'a str,
    /// Seconds per sweep
    speed: f32,
    size: f32,
}

impl<'a> ShinyText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            speed: 4.0,
            size: 28.0,
        }
    }

    pub fn speed(mut self, seconds: f32) -> Self {
        self.speed = seconds.max(0.1);
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let time = ui.input(|i| i.time);
        let phase = ((time / self.speed as f64) % 1.0) as f32;
        let len = self.text.chars().count();

        let mut job = LayoutJob::default();
        for (i, ch) in self.text.chars().enumerate() {
            let weight = shine_weight(i, len, phase);
            job.append(
                ch.encode_utf8(&mut [0; 4]),
                0.0,
                TextFormat {
                    font_id: FontId::proportional(self.size),
                    color: lerp_color(SHINY_BASE, Color32::WHITE, weight),
                    ..Default::default()
                },
            );
        }

        ui.ctx().request_repaint();
        ui.label(job)
    }
}

/// Highlight strength for the glyph at `index`, in `0.0..=1.0`.
///
/// The band enters left of the text at phase 0 and leaves right of it at 1.
pub fn shine_weight(index: usize, len: usize, phase: f32) -> f32 {
    let travel = len as f32 + 2.0 * SHINE_BAND;
    let center = phase * travel - SHINE_BAND;
    (1.0 - (index as f32 - center).abs() / SHINE_BAND).max(0.0)
}

fn lerp_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color32::from_rgb(mix(from.r(), to.r()), mix(from.g(), to.g()), mix(from.b(), to.b()))
}
