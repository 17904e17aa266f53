//! Configuration System for Spiral Studio RS
//! Visualization modes and their per-mode analysis constants

use serde::{Deserialize, Serialize};

use crate::theme::ThemeId;

// ============================================================================
// Modes
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum VisMode {
    Bars,
    Spiral,
    Galaxy,
}

impl VisMode {
    pub fn all() -> [VisMode; 3] {
        [VisMode::Bars, VisMode::Spiral, VisMode::Galaxy]
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisMode::Bars => "Bars",
            VisMode::Spiral => "Spiral",
            VisMode::Galaxy => "Galaxy",
        }
    }

    /// Sensitivity multiplier applied when reducing a bin frame to intensity
    pub fn sensitivity(&self) -> f32 {
        match self {
            VisMode::Bars => 2.0,
            VisMode::Spiral => 2.5,
            VisMode::Galaxy => 3.0,
        }
    }

    /// FFT size chosen at mode start; the frequency frame holds half as
    /// many magnitude bins for the whole session.
    pub fn fft_size(&self) -> usize {
        match self {
            VisMode::Bars => 2048,
            VisMode::Spiral => 512,
            VisMode::Galaxy => 1024,
        }
    }
}

// ============================================================================
// App configuration
// ============================================================================

pub const GAIN_MIN: f32 = 0.1;
pub const GAIN_MAX: f32 = 4.0;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AppConfig {
    pub mode: VisMode,
    pub theme: ThemeId,
    /// Input gain multiplier applied to captured samples before analysis
    pub gain: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: VisMode::Spiral,
            theme: ThemeId::Default,
            gain: 1.0,
        }
    }
}
