//! Visualization Session for Spiral Studio RS
//! Owns the frequency source, the active scene, the surface and the clock

use anyhow::Result;

use crate::audio::{self, FrequencySource, MicSource};
use crate::bars::BarsScene;
use crate::config::{AppConfig, VisMode};
use crate::galaxy::GalaxyScene;
use crate::spiral::SpiralScene;
use crate::surface::Surface;
use crate::theme::Theme;

pub enum Scene {
    Bars(BarsScene),
    Spiral(SpiralScene),
    Galaxy(GalaxyScene),
}

/// One running visualization: everything mutable lives here, so
/// independent sessions never share state. Dropping the session releases
/// the audio input device.
pub struct Session {
    source: Box<dyn FrequencySource>,
    scene: Scene,
    surface: Surface,
    bins: Vec<u8>,
    sensitivity: f32,
    /// Simulation clock: accumulated elapsed milliseconds since start
    clock_ms: f64,
    stopped: bool,
}

impl Session {
    /// Start a live session. Audio is acquired first: if that fails, no
    /// session exists, the surface was never created and nothing else
    /// changed.
    pub fn start(config: &AppConfig, theme: &Theme, width: usize, height: usize) -> Result<Self> {
        // The original amplified the input by sensitivity * user gain on
        // top of using sensitivity in the intensity formula; reproduced.
        let gain = config.mode.sensitivity() * config.gain;
        let source = MicSource::open(config.mode.fft_size(), gain)?;
        log::info!("starting {} mode session", config.mode.label());
        Ok(Self::with_source(
            Box::new(source),
            config.mode,
            theme,
            width,
            height,
        ))
    }

    /// Assemble a session around an arbitrary frequency source. Used by
    /// `start` and by headless tests.
    pub fn with_source(
        source: Box<dyn FrequencySource>,
        mode: VisMode,
        theme: &Theme,
        width: usize,
        height: usize,
    ) -> Self {
        let scene = match mode {
            VisMode::Bars => Scene::Bars(BarsScene::new()),
            VisMode::Spiral => Scene::Spiral(SpiralScene::new(width as f32, height as f32)),
            VisMode::Galaxy => Scene::Galaxy(GalaxyScene::new()),
        };
        let bins = vec![0u8; source.bin_count()];
        let mut session = Self {
            source,
            scene,
            surface: Surface::new(width, height),
            bins,
            sensitivity: mode.sensitivity(),
            clock_ms: 0.0,
            stopped: false,
        };
        session.set_theme(theme);
        session
    }

    /// Swap the palette mid-session; particle positions are untouched.
    pub fn set_theme(&mut self, theme: &Theme) {
        match &mut self.scene {
            Scene::Bars(s) => s.update_palette(&theme.colors),
            Scene::Spiral(s) => s.update_palette(&theme.colors),
            Scene::Galaxy(s) => s.update_palette(&theme.colors),
        }
    }

    /// Surface dimensions changed. Derived bounds recompute; in-flight
    /// particle state stays valid.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.surface.width() && height == self.surface.height() {
            return;
        }
        self.surface.resize(width, height);
        if let Scene::Spiral(s) = &mut self.scene {
            s.resize(width as f32, height as f32);
        }
    }

    /// One frame: read the sample frame, update state, render. Runs to
    /// completion; after `stop` it is a no-op, so a stray scheduled
    /// frame draws nothing.
    pub fn tick(&mut self, dt_ms: f64) {
        if self.stopped {
            return;
        }
        self.clock_ms += dt_ms.max(0.0);
        self.source.fill_bins(&mut self.bins);
        let level = audio::intensity(&self.bins, self.sensitivity);

        match &mut self.scene {
            Scene::Bars(s) => s.step(&mut self.surface, &self.bins),
            Scene::Spiral(s) => s.step(&mut self.surface, self.clock_ms, level),
            Scene::Galaxy(s) => s.step(&mut self.surface, self.clock_ms, level),
        }
    }

    /// Idempotent: clears the surface and freezes the session. The
    /// audio device itself is released when the session is dropped.
    pub fn stop(&mut self) {
        self.surface.clear();
        self.stopped = true;
    }

    #[allow(dead_code)]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[allow(dead_code)]
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Current frame for presentation
    pub fn frame_image(&self) -> egui::ColorImage {
        self.surface.to_color_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeId;

    /// Frequency source that always reports the same magnitude
    struct ConstSource {
        bins: usize,
        value: u8,
    }

    impl FrequencySource for ConstSource {
        fn bin_count(&self) -> usize {
            self.bins
        }

        fn fill_bins(&mut self, out: &mut [u8]) {
            out.fill(self.value);
        }
    }

    fn spiral_session(value: u8) -> Session {
        Session::with_source(
            Box::new(ConstSource { bins: 256, value }),
            VisMode::Spiral,
            &Theme::from_id(ThemeId::Neon),
            200,
            200,
        )
    }

    fn spiral_scene(session: &Session) -> &SpiralScene {
        match &session.scene {
            Scene::Spiral(s) => s,
            _ => panic!("expected spiral scene"),
        }
    }

    #[test]
    fn bin_frame_length_is_fixed_at_start() {
        let session = spiral_session(0);
        assert_eq!(session.bins.len(), 256);
    }

    #[test]
    fn hundred_silent_ticks_advance_every_particle() {
        let mut session = spiral_session(0);
        let initial: Vec<f32> = spiral_scene(&session)
            .particles
            .iter()
            .map(|p| p.angle)
            .collect();

        for _ in 0..100 {
            session.tick(16.0);
            // 1.6 s of simulated time: far short of the disruption interval
            assert!(!spiral_scene(&session).black_hole.active);
        }

        let scene = spiral_scene(&session);
        for (p, &angle0) in scene.particles.iter().zip(&initial) {
            assert!(p.radius.is_finite(), "NaN/inf radius");
            assert!(p.angle > angle0, "particle did not advance");
        }
    }

    #[test]
    fn simulation_clock_accumulates_frame_deltas() {
        let mut session = spiral_session(0);
        session.tick(16.0);
        session.tick(33.0);
        assert_eq!(session.clock_ms(), 49.0);
    }

    #[test]
    fn stop_twice_matches_stop_once() {
        let mut session = spiral_session(128);
        for _ in 0..10 {
            session.tick(16.0);
        }

        session.stop();
        assert!(session.is_stopped());
        let once = session.frame_image();
        assert!(once.pixels.iter().all(|p| p.r() == 0 && p.g() == 0 && p.b() == 0));

        session.stop();
        assert!(session.is_stopped());
        let twice = session.frame_image();
        assert_eq!(once.pixels, twice.pixels);
    }

    #[test]
    fn ticks_after_stop_draw_nothing() {
        let mut session = spiral_session(200);
        session.tick(16.0);
        session.stop();
        let clock = session.clock_ms();
        session.tick(16.0);
        assert_eq!(session.clock_ms(), clock);
        let image = session.frame_image();
        assert!(image.pixels.iter().all(|p| p.r() == 0 && p.g() == 0 && p.b() == 0));
    }

    #[test]
    fn theme_swap_mid_session_keeps_positions() {
        let mut session = spiral_session(100);
        for _ in 0..5 {
            session.tick(16.0);
        }
        let before: Vec<(f32, f32)> = spiral_scene(&session)
            .particles
            .iter()
            .map(|p| (p.angle, p.radius))
            .collect();
        session.set_theme(&Theme::from_id(ThemeId::Cyberpunk));
        let after: Vec<(f32, f32)> = spiral_scene(&session)
            .particles
            .iter()
            .map(|p| (p.angle, p.radius))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn resize_mid_session_keeps_particles_valid() {
        let mut session = spiral_session(100);
        for _ in 0..5 {
            session.tick(16.0);
        }
        session.resize(640, 480);
        session.tick(16.0);
        let scene = spiral_scene(&session);
        assert_eq!(scene.max_radius, 288.0);
        for p in &scene.particles {
            assert!(p.radius.is_finite());
            assert!(p.radius >= 0.0 && p.radius <= scene.max_radius);
        }
    }

    #[test]
    fn bars_session_runs_with_loud_input() {
        let mut session = Session::with_source(
            Box::new(ConstSource { bins: 1024, value: 255 }),
            VisMode::Bars,
            &Theme::from_id(ThemeId::Default),
            128,
            128,
        );
        session.tick(16.0);
        let image = session.frame_image();
        assert!(image.pixels.iter().any(|p| p.r() > 200));
    }
}
