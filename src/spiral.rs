//! Spiral Engine for Spiral Studio RS
//! Logarithmic-spiral particle field with a periodic black-hole collapse

use egui::Color32;
use rand::Rng;
use std::f32::consts::TAU;

use crate::surface::Surface;
use crate::theme;

pub const PARTICLE_COUNT: usize = 1200;

pub const BLACK_HOLE_MAX: f32 = 160.0;
pub const BLACK_HOLE_GROW_SPEED: f32 = 2.5;
pub const BLACK_HOLE_INTERVAL_MS: f64 = 18_000.0;

/// Background wash opacity producing the motion-trail effect
const TRAIL_FADE: f32 = 0.06;
/// Radius below which a drained particle is recycled to the rim
const RECYCLE_FLOOR: f32 = 2.0;

/// Polar particle. Position only; identity is the array index.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    /// Radians, unbounded; wraps implicitly through the trig projection
    pub angle: f32,
    pub radius: f32,
    /// Reserved for per-particle speed control
    #[allow(dead_code)]
    pub speed: f32,
}

/// Spiral tightness, drifting in [1.0, 2.0]
pub fn evolving_a(t_ms: f64) -> f32 {
    (1.5 + (t_ms * 0.0001).sin() * 0.5) as f32
}

/// Spiral growth rate, drifting in [0.10, 0.20]
pub fn evolving_b(t_ms: f64) -> f32 {
    (0.15 + (t_ms * 0.00007).sin() * 0.05) as f32
}

/// Outer particle bound derived from the surface dimensions
pub fn max_radius_for(width: f32, height: f32) -> f32 {
    width.min(height) * 0.6
}

/// Timed disruption state machine: `Idle` until the interval elapses,
/// then `Growing` until the void reaches its maximum radius. At most one
/// disruption is ever in flight.
pub struct BlackHole {
    pub active: bool,
    pub radius: f32,
    last_trigger_ms: f64,
}

impl Default for BlackHole {
    fn default() -> Self {
        Self::new()
    }
}

impl BlackHole {
    pub fn new() -> Self {
        Self {
            active: false,
            radius: 0.0,
            last_trigger_ms: 0.0,
        }
    }

    /// Advance one tick of simulation time. Growth is a fixed per-tick
    /// increment, not scaled by elapsed time.
    pub fn advance(&mut self, now_ms: f64) {
        if !self.active && now_ms - self.last_trigger_ms > BLACK_HOLE_INTERVAL_MS {
            self.active = true;
            self.radius = 0.0;
            self.last_trigger_ms = now_ms;
        }
        if self.active {
            self.radius += BLACK_HOLE_GROW_SPEED;
            if self.radius >= BLACK_HOLE_MAX {
                self.active = false;
                self.radius = 0.0;
            }
        }
    }
}

/// The spiral scene: a fixed-size particle field plus the disruption
/// scheduler. Particles are recycled, never destroyed.
pub struct SpiralScene {
    pub particles: Vec<Particle>,
    pub black_hole: BlackHole,
    pub max_radius: f32,
    palette: Vec<Color32>,
}

impl SpiralScene {
    pub fn new(width: f32, height: f32) -> Self {
        let max_radius = max_radius_for(width, height);
        let mut rng = rand::thread_rng();
        let particles = (0..PARTICLE_COUNT)
            .map(|_| Particle {
                angle: rng.gen_range(0.0..TAU),
                radius: rng.gen_range(0.0..max_radius),
                speed: 0.0,
            })
            .collect();

        Self {
            particles,
            black_hole: BlackHole::new(),
            max_radius,
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

    /// Recompute the outer bound for new surface dimensions. Particle
    /// angles and radii are left as they are; only the modulus bound
    /// changes on the next update.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.max_radius = max_radius_for(width, height);
    }

    /// One tick: background wash, disruption advance, per-particle
    /// update + draw, void overlay.
    pub fn step(&mut self, surface: &mut Surface, clock_ms: f64, intensity: f32) {
        surface.fade(TRAIL_FADE);
        self.black_hole.advance(clock_ms);

        let a = evolving_a(clock_ms);
        let b = evolving_b(clock_ms);
        let color_offset = theme::color_offset(clock_ms, self.palette.len());
        let drain = 3.0 * intensity + 0.8;
        let size = 1.2 + 2.5 * intensity;
        let (cx, cy) = surface.center();

        let mut rng = rand::thread_rng();
        for (i, p) in self.particles.iter_mut().enumerate() {
            if self.black_hole.active {
                p.radius -= drain;
                if p.radius < RECYCLE_FLOOR {
                    p.radius = self.max_radius;
                    p.angle = rng.gen_range(0.0..TAU);
                }
            } else {
                p.angle += 0.0015 + 0.009 * intensity + (i % 7) as f32 * 0.000_15;
                // Log-spiral radius law, wrapped into the surface bound.
                // Computed in f64: the exponential outgrows f32 range well
                // before the angle stops being meaningful.
                let radius =
                    (a as f64 * (b as f64 * p.angle as f64).exp()) % self.max_radius as f64;
                if radius.is_finite() {
                    p.radius = radius as f32;
                } else {
                    // exp overflow after very long sessions: re-seed the particle
                    p.radius = self.max_radius;
                    p.angle = rng.gen_range(0.0..TAU);
                }
            }

            let x = cx + p.radius * p.angle.cos();
            let y = cy + p.radius * p.angle.sin();
            let color = self.palette[(i + color_offset) % self.palette.len()];
            surface.fill_circle(x, y, size, color, 1.0);
        }

        if self.black_hole.active {
            surface.radial_void(cx, cy, self.black_hole.radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_MS: f64 = 16.0;

    fn run_ticks(scene: &mut SpiralScene, surface: &mut Surface, ticks: usize, intensity: f32) {
        let mut clock = 0.0;
        for _ in 0..ticks {
            clock += TICK_MS;
            scene.step(surface, clock, intensity);
        }
    }

    #[test]
    fn evolving_params_stay_bounded() {
        let mut t = 0.0f64;
        while t < 2_000_000.0 {
            let a = evolving_a(t);
            let b = evolving_b(t);
            assert!((1.0..=2.0).contains(&a), "a({t}) = {a}");
            assert!((0.10..=0.20).contains(&b), "b({t}) = {b}");
            t += 997.0;
        }
    }

    #[test]
    fn evolving_params_are_deterministic_in_t() {
        assert_eq!(evolving_a(123_456.0), evolving_a(123_456.0));
        assert_eq!(evolving_b(123_456.0), evolving_b(123_456.0));
        assert_eq!(evolving_a(0.0), 1.5);
        assert_eq!(evolving_b(0.0), 0.15);
    }

    #[test]
    fn black_hole_waits_out_the_full_interval() {
        let mut bh = BlackHole::new();
        let mut clock = 0.0;
        while clock <= BLACK_HOLE_INTERVAL_MS {
            bh.advance(clock);
            assert!(!bh.active, "triggered early at {clock} ms");
            clock += TICK_MS;
        }
        bh.advance(clock);
        assert!(bh.active);
    }

    #[test]
    fn black_hole_growth_is_per_tick_not_time_scaled() {
        let mut bh = BlackHole::new();
        // Wildly irregular frame times; growth must only count ticks
        bh.advance(BLACK_HOLE_INTERVAL_MS + 1.0);
        assert!(bh.active);
        assert_eq!(bh.radius, BLACK_HOLE_GROW_SPEED);
        bh.advance(BLACK_HOLE_INTERVAL_MS + 500.0);
        assert_eq!(bh.radius, BLACK_HOLE_GROW_SPEED * 2.0);
        bh.advance(BLACK_HOLE_INTERVAL_MS + 501.0);
        assert_eq!(bh.radius, BLACK_HOLE_GROW_SPEED * 3.0);
    }

    #[test]
    fn black_hole_deactivates_at_max_radius() {
        let mut bh = BlackHole::new();
        let mut clock = BLACK_HOLE_INTERVAL_MS + 1.0;
        bh.advance(clock);
        assert!(bh.active);

        let mut ticks = 1;
        while bh.active {
            clock += TICK_MS;
            bh.advance(clock);
            ticks += 1;
            assert!(ticks < 1000, "disruption never ended");
        }
        assert_eq!(bh.radius, 0.0);
        // 160 / 2.5 = 64 growth ticks
        assert_eq!(ticks, 64);
    }

    #[test]
    fn consecutive_triggers_are_at_least_one_interval_apart() {
        let mut bh = BlackHole::new();
        let mut clock = 0.0;
        let mut triggers: Vec<f64> = Vec::new();
        let mut was_active = false;
        for _ in 0..20_000 {
            clock += TICK_MS;
            bh.advance(clock);
            if bh.active && !was_active {
                triggers.push(clock);
            }
            was_active = bh.active;
        }
        assert!(triggers.len() >= 2, "expected multiple disruptions");
        for pair in triggers.windows(2) {
            assert!(pair[1] - pair[0] >= BLACK_HOLE_INTERVAL_MS);
        }
    }

    #[test]
    fn particle_radii_stay_within_bounds() {
        let mut scene = SpiralScene::new(200.0, 200.0);
        let mut surface = Surface::new(200, 200);
        run_ticks(&mut scene, &mut surface, 300, 0.7);
        for p in &scene.particles {
            assert!(p.radius.is_finite());
            assert!(p.angle.is_finite());
            assert!(p.radius >= 0.0 && p.radius <= scene.max_radius);
        }
    }

    #[test]
    fn drained_particles_recycle_to_the_rim() {
        let mut scene = SpiralScene::new(200.0, 200.0);
        let mut surface = Surface::new(200, 200);
        scene.black_hole.active = true;
        scene.black_hole.radius = 10.0;
        scene.particles[0].radius = 2.5;
        let old_angle = scene.particles[0].angle;

        // drain = 3*1 + 0.8 = 3.8, so 2.5 drops below the floor
        scene.step(&mut surface, 100.0, 1.0);
        let p = scene.particles[0];
        assert_eq!(p.radius, scene.max_radius);
        assert_ne!(p.angle, old_angle);
    }

    #[test]
    fn drain_leaves_large_radii_untouched_by_recycling() {
        let mut scene = SpiralScene::new(200.0, 200.0);
        let mut surface = Surface::new(200, 200);
        scene.black_hole.active = true;
        scene.black_hole.radius = 10.0;
        scene.particles[0].radius = 100.0;
        scene.step(&mut surface, 100.0, 0.0);
        // drain = 0.8 at zero intensity
        assert!((scene.particles[0].radius - 99.2).abs() < 1e-4);
    }

    #[test]
    fn resize_changes_bound_without_touching_particles() {
        let mut scene = SpiralScene::new(200.0, 200.0);
        let before: Vec<(f32, f32)> = scene.particles.iter().map(|p| (p.angle, p.radius)).collect();
        scene.resize(400.0, 600.0);
        assert_eq!(scene.max_radius, 240.0);
        let after: Vec<(f32, f32)> = scene.particles.iter().map(|p| (p.angle, p.radius)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn palette_swap_keeps_particle_positions() {
        let mut scene = SpiralScene::new(200.0, 200.0);
        let before: Vec<(f32, f32)> = scene.particles.iter().map(|p| (p.angle, p.radius)).collect();
        scene.update_palette(&[[255, 0, 127], [0, 255, 255]]);
        let after: Vec<(f32, f32)> = scene.particles.iter().map(|p| (p.angle, p.radius)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_palette_falls_back_to_white() {
        let mut scene = SpiralScene::new(200.0, 200.0);
        scene.update_palette(&[]);
        let mut surface = Surface::new(200, 200);
        // Must not panic on the modulo index
        scene.step(&mut surface, 16.0, 0.5);
    }
}
