//! Bar Renderer for Spiral Studio RS
//! Classic spectrum bars with a Gaussian loudness envelope

use egui::Color32;

use crate::surface::Surface;

pub struct BarsScene {
    palette: Vec<Color32>,
}

impl BarsScene {
    pub fn new() -> Self {
        Self {
            palette: vec![Color32::WHITE],
        }
    }

    pub fn update_palette(&mut self, colors: &[[u8; 3]]) {
        self.palette = colors
            .iter()
            .map(|c| Color32::from_rgb(c[0], c[1], c[2]))
            .collect();
        if self.palette.is_empty() {
            self.palette.push(Color32::WHITE);
        }
    }

    /// Opaque clear, then one bar per frequency bin. Bars near the ends
    /// of the band are damped by a Gaussian envelope so the display
    /// tapers instead of slamming into the screen edges.
    pub fn step(&mut self, surface: &mut Surface, bins: &[u8]) {
        surface.fill(Color32::BLACK);
        if bins.is_empty() {
            return;
        }

        let w = surface.width() as f32;
        let h = surface.height() as f32;
        let len = bins.len();
        let bar_w = w / len as f32;
        let step = bar_w + 1.0;
        let mid = len as f32 * 0.5;
        let inv_sigma = 6.0 / len as f32;

        let mut x = 0.0;
        for (i, &v) in bins.iter().enumerate() {
            let d = (i as f32 - mid) * inv_sigma;
            let envelope = (-0.5 * d * d).exp();
            let value = v as f32 / 255.0;
            let height = value * envelope * h;
            if height > 0.0 {
                let color = self.palette[i % self.palette.len()];
                surface.fill_rect(x, h - height, bar_w, height, color);
            }
            x += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_frame_leaves_a_black_surface() {
        let mut scene = BarsScene::new();
        let mut surface = Surface::new(64, 64);
        scene.step(&mut surface, &[0u8; 32]);
        let image = surface.to_color_image();
        assert!(image.pixels.iter().all(|p| p.r() == 0 && p.g() == 0 && p.b() == 0));
    }

    #[test]
    fn loud_frame_paints_bars() {
        let mut scene = BarsScene::new();
        let mut surface = Surface::new(64, 64);
        scene.step(&mut surface, &[255u8; 32]);
        let image = surface.to_color_image();
        assert!(image.pixels.iter().any(|p| p.r() > 200));
    }

    #[test]
    fn empty_frame_is_a_no_op_after_clear() {
        let mut scene = BarsScene::new();
        let mut surface = Surface::new(16, 16);
        scene.step(&mut surface, &[]);
    }
}
