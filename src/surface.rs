//! Raster Surface for Spiral Studio RS
//! Persistent CPU framebuffer with alpha-composited drawing primitives
//!
//! Unlike an immediate-mode painter, the buffer survives between ticks, so
//! the per-frame black wash produces real motion trails instead of a hard
//! clear. Pixels live in 0..255 float RGB space and are quantized on
//! presentation.

use egui::{Color32, ColorImage};

pub struct Surface {
    width: usize,
    height: usize,
    /// RGB in 0..255 float space
    rgb: Vec<f32>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            rgb: vec![0.0; width * height * 3],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 * 0.5, self.height as f32 * 0.5)
    }

    /// Reallocate for new dimensions. Contents start black; callers
    /// recompute derived bounds themselves.
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(1);
        let height = height.max(1);
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.rgb = vec![0.0; width * height * 3];
        }
    }

    /// Reset every pixel to black
    pub fn clear(&mut self) {
        self.rgb.fill(0.0);
    }

    /// Opaque fill with a single color
    pub fn fill(&mut self, color: Color32) {
        let (r, g, b) = (color.r() as f32, color.g() as f32, color.b() as f32);
        for px in self.rgb.chunks_exact_mut(3) {
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }

    /// Wash the whole frame with low-opacity black: the trailing-blur
    /// step that replaces a hard clear.
    pub fn fade(&mut self, alpha: f32) {
        let keep = 1.0 - alpha.clamp(0.0, 1.0);
        for v in &mut self.rgb {
            *v *= keep;
        }
    }

    /// Axis-aligned filled rectangle, clipped to the surface
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color32) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x0 = x.floor().max(0.0) as usize;
        let y0 = y.floor().max(0.0) as usize;
        let x1 = ((x + w).ceil() as usize).min(self.width);
        let y1 = ((y + h).ceil() as usize).min(self.height);
        let (r, g, b) = (color.r() as f32, color.g() as f32, color.b() as f32);

        for py in y0..y1 {
            let row = py * self.width;
            for px in x0..x1 {
                let base = (row + px) * 3;
                self.rgb[base] = r;
                self.rgb[base + 1] = g;
                self.rgb[base + 2] = b;
            }
        }
    }

    /// Filled circle with a one-pixel antialiased rim, blended OVER at
    /// the given opacity.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color32, alpha: f32) {
        if radius <= 0.1 || alpha <= 0.0 {
            return;
        }
        let min_x = (cx - radius - 1.0).floor().max(0.0) as i32;
        let max_x = (cx + radius + 1.0).ceil().min(self.width as f32 - 1.0) as i32;
        let min_y = (cy - radius - 1.0).floor().max(0.0) as i32;
        let max_y = (cy + radius + 1.0).ceil().min(self.height as f32 - 1.0) as i32;
        if min_x > max_x || min_y > max_y {
            return;
        }

        let (r, g, b) = (color.r() as f32, color.g() as f32, color.b() as f32);
        let alpha = alpha.clamp(0.0, 1.0);

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let dx = px as f32 - cx;
                let dy = py as f32 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                // Edge coverage: 1 inside, ramping to 0 across the rim
                let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let a = alpha * coverage;
                let base = (py as usize * self.width + px as usize) * 3;
                self.rgb[base] = self.rgb[base] * (1.0 - a) + r * a;
                self.rgb[base + 1] = self.rgb[base + 1] * (1.0 - a) + g * a;
                self.rgb[base + 2] = self.rgb[base + 2] * (1.0 - a) + b * a;
            }
        }
    }

    /// Radial void overlay: opaque black at the center fading linearly to
    /// transparent at `radius`, the rasterized form of the original's
    /// radial-gradient black hole.
    pub fn radial_void(&mut self, cx: f32, cy: f32, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        let min_x = (cx - radius).floor().max(0.0) as i32;
        let max_x = (cx + radius).ceil().min(self.width as f32 - 1.0) as i32;
        let min_y = (cy - radius).floor().max(0.0) as i32;
        let max_y = (cy + radius).ceil().min(self.height as f32 - 1.0) as i32;
        if min_x > max_x || min_y > max_y {
            return;
        }

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let dx = px as f32 - cx;
                let dy = py as f32 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= radius {
                    continue;
                }
                // Black OVER with alpha 1 - dist/radius
                let keep = dist / radius;
                let base = (py as usize * self.width + px as usize) * 3;
                self.rgb[base] *= keep;
                self.rgb[base + 1] *= keep;
                self.rgb[base + 2] *= keep;
            }
        }
    }

    /// Quantize to an egui image for presentation
    pub fn to_color_image(&self) -> ColorImage {
        let mut bytes = Vec::with_capacity(self.width * self.height * 3);
        for v in &self.rgb {
            bytes.push(v.clamp(0.0, 255.0) as u8);
        }
        ColorImage::from_rgb([self.width, self.height], &bytes)
    }

    #[cfg(test)]
    fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let base = (y * self.width + x) * 3;
        [self.rgb[base], self.rgb[base + 1], self.rgb[base + 2]]
    }
}
