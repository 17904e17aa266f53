//! Spiral Studio RS - Main Application
//! Audio-reactive microphone visualizer with egui GUI

mod audio;
mod bars;
mod config;
mod galaxy;
mod session;
mod spiral;
mod surface;
mod theme;

use eframe::egui;
use std::time::Instant;

use config::{AppConfig, VisMode, GAIN_MAX, GAIN_MIN};
use session::Session;
use theme::{Theme, ThemeId};

/// Main application state
struct SpiralStudioApp {
    config: AppConfig,
    theme: Theme,
    session: Option<Session>,
    texture: Option<egui::TextureHandle>,
    last_update: Instant,
    last_error: Option<String>,
}

impl SpiralStudioApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Setup dark theme
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_unmultiplied(15, 15, 25, 245);
        visuals.panel_fill = egui::Color32::from_rgba_unmultiplied(20, 20, 35, 240);
        cc.egui_ctx.set_visuals(visuals);

        let config = AppConfig::default();
        let theme = Theme::from_id(config.theme);

        Self {
            config,
            theme,
            session: None,
            texture: None,
            last_update: Instant::now(),
            last_error: None,
        }
    }

    fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Start the selected mode. On audio acquisition failure nothing is
    /// started and the error is shown and logged.
    fn start(&mut self, canvas_size: egui::Vec2) {
        let width = canvas_size.x.max(1.0) as usize;
        let height = canvas_size.y.max(1.0) as usize;
        match Session::start(&self.config, &self.theme, width, height) {
            Ok(session) => {
                self.session = Some(session);
                self.last_error = None;
                self.last_update = Instant::now();
            }
            Err(e) => {
                log::error!("failed to start visualization: {e:#}");
                self.last_error = Some(format!("{e:#}"));
            }
        }
    }

    /// Safe to call when not started, and to call repeatedly.
    fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
            // Present the cleared surface before the stream is released
            if let Some(texture) = &mut self.texture {
                texture.set(session.frame_image(), egui::TextureOptions::LINEAR);
            }
            log::info!("visualization stopped");
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🌀 Spiral Studio RS");
                ui.separator();

                let running = self.is_running();

                egui::ComboBox::from_id_source("mode_selector")
                    .selected_text(self.config.mode.label())
                    .show_ui(ui, |ui| {
                        for mode in VisMode::all() {
                            ui.selectable_value(&mut self.config.mode, mode, mode.label());
                        }
                    });

                let mut theme_changed = false;
                egui::ComboBox::from_id_source("theme_selector")
                    .selected_text(self.config.theme.label())
                    .show_ui(ui, |ui| {
                        for id in ThemeId::all() {
                            if ui
                                .selectable_value(&mut self.config.theme, id, id.label())
                                .changed()
                            {
                                theme_changed = true;
                            }
                        }
                    });
                if theme_changed {
                    self.theme = Theme::from_id(self.config.theme);
                    log::info!("theme switched to {}", self.theme.name);
                    // Palette swaps apply mid-session without a restart
                    if let Some(session) = &mut self.session {
                        session.set_theme(&self.theme);
                    }
                }

                ui.add(
                    egui::Slider::new(&mut self.config.gain, GAIN_MIN..=GAIN_MAX)
                        .text("Gain")
                        .fixed_decimals(2),
                )
                .on_hover_text("Input gain, applied on the next start");

                ui.separator();

                if ui.add_enabled(!running, egui::Button::new("▶ Start")).clicked() {
                    let size = ctx.available_rect().size();
                    self.start(size);
                }
                if ui.add_enabled(running, egui::Button::new("⏹ Stop")).clicked() {
                    self.stop();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
                    let label = if fullscreen { "Exit Fullscreen" } else { "Fullscreen" };
                    if ui.button(label).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
                    }
                });
            });
        });
    }

    fn render_canvas(&mut self, ctx: &egui::Context, dt_ms: f64) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let painter = ui.painter_at(rect);

                if let Some(session) = &mut self.session {
                    let width = rect.width().max(1.0) as usize;
                    let height = rect.height().max(1.0) as usize;
                    session.resize(width, height);
                    session.tick(dt_ms);

                    let image = session.frame_image();
                    match &mut self.texture {
                        Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                        None => {
                            self.texture = Some(ctx.load_texture(
                                "canvas",
                                image,
                                egui::TextureOptions::LINEAR,
                            ));
                        }
                    }
                }

                if let Some(texture) = &self.texture {
                    painter.image(
                        texture.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }

                if let Some(error) = &self.last_error {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("⚠ {error}"),
                        egui::FontId::proportional(16.0),
                        egui::Color32::from_rgb(255, 100, 100),
                    );
                }
            });
    }
}

impl eframe::App for SpiralStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt_ms = now.duration_since(self.last_update).as_secs_f64() * 1000.0;
        self.last_update = now;

        self.render_top_bar(ctx);
        self.render_canvas(ctx, dt_ms);

        // Keep the frame loop scheduled only while a session runs;
        // stopping simply stops re-enqueueing.
        if self.is_running() {
            ctx.request_repaint();
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Spiral Studio RS")
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Spiral Studio RS",
        options,
        Box::new(|cc| Box::new(SpiralStudioApp::new(cc))),
    )
}
