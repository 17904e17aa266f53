//! Galaxy Renderer for Spiral Studio RS
//! Rotating 3D particle cloud projected onto the 2D surface

use egui::Color32;
use rand::Rng;

use crate::surface::Surface;
use crate::theme;

pub const GALAXY_PARTICLE_COUNT: usize = 2000;

/// Half-extent of the particle cube
const CLOUD_EXTENT: f32 = 1000.0;
/// Camera distance from the origin along +Z
const CAMERA_Z: f32 = 1000.0;
/// Vertical field of view (degrees)
const FOV_Y: f32 = 75.0;
const POINT_ALPHA: f32 = 0.8;

pub struct GalaxyScene {
    points: Vec<[f32; 3]>,
    pub rotation_y: f32,
    palette: Vec<Color32>,
}

impl GalaxyScene {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let points = (0..GALAXY_PARTICLE_COUNT)
            .map(|_| {
                [
                    rng.gen_range(-CLOUD_EXTENT..CLOUD_EXTENT),
                    rng.gen_range(-CLOUD_EXTENT..CLOUD_EXTENT),
                    rng.gen_range(-CLOUD_EXTENT..CLOUD_EXTENT),
                ]
            })
            .collect();

        Self {
            points,
            rotation_y: 0.0,
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

    /// The whole cloud is tinted with a single palette entry, cycled
    /// once per second.
    fn cycle_color(&self, clock_ms: f64) -> Color32 {
        let idx =
            ((clock_ms / theme::GALAXY_COLOR_CYCLE_MS).floor() as u64 % self.palette.len() as u64)
                as usize;
        self.palette[idx]
    }

    pub fn step(&mut self, surface: &mut Surface, clock_ms: f64, intensity: f32) {
        surface.fill(Color32::BLACK);

        self.rotation_y += 0.001 + 0.01 * intensity;
        let (sin_r, cos_r) = self.rotation_y.sin_cos();
        let color = self.cycle_color(clock_ms);

        let (cx, cy) = surface.center();
        // Pinhole projection: focal length from the vertical fov
        let focal = surface.height() as f32 * 0.5 / (FOV_Y.to_radians() * 0.5).tan();

        for p in &self.points {
            let x = p[0] * cos_r + p[2] * sin_r;
            let z = -p[0] * sin_r + p[2] * cos_r;
            let y = p[1];

            let depth = CAMERA_Z - z;
            if depth <= 1.0 {
                continue; // behind the camera
            }
            let scale = focal / depth;
            let sx = cx + x * scale;
            let sy = cy - y * scale;
            let size = (2.0 * CAMERA_Z / depth).clamp(0.4, 5.0);
            surface.fill_circle(sx, sy, size, color, POINT_ALPHA);
        }
    }
}
