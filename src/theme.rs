//! Theme Palettes for Spiral Studio RS
//! Named color palettes and time-driven palette rotation

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Palette rotation interval for the spiral mode (ms)
pub const COLOR_CYCLE_MS: f64 = 4000.0;
/// Color cycling interval for the galaxy mode (ms)
pub const GALAXY_COLOR_CYCLE_MS: f64 = 1000.0;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum ThemeId {
    Default,
    Neon,
    Sunset,
    Cyberpunk,
    Galaxy,
}

impl ThemeId {
    pub fn all() -> [ThemeId; 5] {
        [
            ThemeId::Default,
            ThemeId::Neon,
            ThemeId::Sunset,
            ThemeId::Cyberpunk,
            ThemeId::Galaxy,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThemeId::Default => "Default",
            ThemeId::Neon => "Neon",
            ThemeId::Sunset => "Sunset",
            ThemeId::Cyberpunk => "Cyberpunk",
            ThemeId::Galaxy => "Galaxy",
        }
    }
}

/// An ordered, non-empty sequence of palette colors
#[derive(Clone, Debug)]
pub struct Theme {
    pub name: String,
    pub colors: Vec<[u8; 3]>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_id(ThemeId::Default)
    }
}

impl Theme {
    pub fn from_id(id: ThemeId) -> Self {
        match id {
            ThemeId::Default => Self {
                name: "Default".to_string(),
                colors: vec![[255, 255, 255]],
            },
            ThemeId::Neon => Self {
                name: "Neon".to_string(),
                colors: vec![[255, 0, 127], [0, 255, 255], [127, 255, 0]],
            },
            ThemeId::Sunset => Self {
                name: "Sunset".to_string(),
                colors: vec![[255, 94, 94], [255, 202, 94], [94, 94, 255]],
            },
            ThemeId::Cyberpunk => Self {
                name: "Cyberpunk".to_string(),
                colors: vec![[242, 9, 164], [5, 242, 198], [22, 20, 109], [242, 250, 5]],
            },
            ThemeId::Galaxy => Self {
                name: "Galaxy".to_string(),
                colors: vec![[249, 248, 113], [249, 132, 229], [123, 224, 249], [160, 249, 119]],
            },
        }
    }

    /// Palette as egui colors, guaranteed non-empty
    pub fn palette(&self) -> Vec<Color32> {
        let mut palette: Vec<Color32> = self
            .colors
            .iter()
            .map(|c| Color32::from_rgb(c[0], c[1], c[2]))
            .collect();
        if palette.is_empty() {
            palette.push(Color32::WHITE);
        }
        palette
    }
}

/// Index shift applied to the particle-to-color mapping, stepping once
/// every `COLOR_CYCLE_MS` of simulation time.
pub fn color_offset(clock_ms: f64, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    ((clock_ms / COLOR_CYCLE_MS).floor() as u64 % palette_len as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_palettes_are_non_empty() {
        for id in ThemeId::all() {
            let theme = Theme::from_id(id);
            assert!(!theme.colors.is_empty(), "{} palette empty", theme.name);
            assert!(!theme.palette().is_empty());
        }
    }

    #[test]
    fn color_offset_steps_every_four_seconds() {
        let len = Theme::from_id(ThemeId::Galaxy).colors.len();
        assert_eq!(color_offset(0.0, len), 0);
        assert_eq!(color_offset(3999.0, len), 0);
        assert_eq!(color_offset(4000.0, len), 1);
        assert_eq!(color_offset(8000.0, len), 2);
    }

    #[test]
    fn color_offset_wraps_at_palette_length() {
        // 3-color palette: 12s is a full cycle
        assert_eq!(color_offset(12_000.0, 3), 0);
        assert_eq!(color_offset(16_000.0, 3), 1);
    }

    #[test]
    fn color_offset_tolerates_empty_palette() {
        assert_eq!(color_offset(99_999.0, 0), 0);
    }
}
