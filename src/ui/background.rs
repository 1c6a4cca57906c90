//! Animated "silk" backdrop painted behind every page

use eframe::egui::{self, Color32, Mesh, Pos2, Rect};

use crate::core::config::BackgroundConfig;

/// Vertex grid resolution; colours are interpolated between vertices
const GRID_COLS: u32 = 64;
const GRID_ROWS: u32 = 40;

/// Fallback tint when the configured colour can't be parsed
const DEFAULT_TINT: Color32 = Color32::from_rgb(0x2C, 0x2C, 0x3E);

/// Pattern parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilkParams {
    pub speed: f32,
    pub scale: f32,
    pub color: Color32,
    pub noise_intensity: f32,
}

/// Background painter
#[derive(Debug, Clone)]
pub struct SilkBackground {
    params: SilkParams,
    enabled: bool,
}

impl SilkBackground {
    pub fn from_config(config: &BackgroundConfig) -> Self {
        let color = parse_hex_color(&config.color).unwrap_or_else(|| {
            tracing::warn!("Invalid background color {:?}, using default", config.color);
            DEFAULT_TINT
        });

        Self {
            params: SilkParams {
                speed: config.speed,
                scale: config.scale,
                color,
                noise_intensity: config.noise_intensity,
            },
            enabled: config.enabled,
        }
    }

    /// Paint the backdrop over `rect`. Animated backdrops keep requesting frames.
    pub fn paint(&self, ui: &egui::Ui, rect: Rect) {
        let painter = ui.painter();
        if !self.enabled {
            painter.rect_filled(rect, 0.0, self.params.color);
            return;
        }

        let time = ui.input(|i| i.time) as f32;
        painter.add(egui::Shape::mesh(self.build_mesh(rect, time)));
        ui.ctx().request_repaint();
    }

    fn build_mesh(&self, rect: Rect, time: f32) -> Mesh {
        let mut mesh = Mesh::default();

        for row in 0..=GRID_ROWS {
            for col in 0..=GRID_COLS {
                let u = col as f32 / GRID_COLS as f32;
                let v = row as f32 / GRID_ROWS as f32;
                let pos = Pos2::new(rect.left() + u * rect.width(), rect.top() + v * rect.height());
                let shade = silk_shade(u, v, time, col, row, &self.params);
                mesh.colored_vertex(pos, scale_color(self.params.color, shade));
            }
        }

        let stride = GRID_COLS + 1;
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let top_left = row * stride + col;
                let bottom_left = top_left + stride;
                mesh.add_triangle(top_left, top_left + 1, bottom_left);
                mesh.add_triangle(top_left + 1, bottom_left + 1, bottom_left);
            }
        }

        mesh
    }
}

/// Wave pattern at normalized coordinates, in `0.2..=1.0`.
///
/// `time` is in seconds.
pub fn silk_pattern(u: f32, v: f32, time: f32, params: &SilkParams) -> f32 {
    let t = params.speed * time * 0.1;
    let x = u * params.scale;
    let y = v * params.scale + 0.03 * (8.0 * x - t).sin();

    let fold = (3.0 * x + 5.0 * y).cos();
    let ripple = (20.0 * (x + y - 0.1 * t)).sin();
    0.6 + 0.4 * (5.0 * (x + y + fold + 0.02 * t) + ripple).sin()
}

/// Pattern with grain applied, clamped to `0.0..=1.0`
fn silk_shade(u: f32, v: f32, time: f32, col: u32, row: u32, params: &SilkParams) -> f32 {
    let grain = grain(col, row) / 15.0 * params.noise_intensity;
    (silk_pattern(u, v, time, params) - grain).clamp(0.0, 1.0)
}

/// Deterministic per-vertex noise in `0.0..1.0`
fn grain(col: u32, row: u32) -> f32 {
    let mut h = col.wrapping_mul(0x9E37_79B1) ^ row.wrapping_mul(0x85EB_CA77);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFFFF) as f32 / 65536.0
}

fn scale_color(color: Color32, factor: f32) -> Color32 {
    let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(scale(color.r()), scale(color.g()), scale(color.b()))
}

/// Parse `#RRGGBB` (leading `#` optional)
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}
