//! Shared configuration for Slate
//!
//! This crate is the single source of truth for the tunable parameters of the
//! input-to-ink pipeline: pen appearance, input smoothing, pressure
//! calibration and the tiled backing store. Every struct deserializes with
//! `#[serde(default)]`, so a collaborator can persist only the fields a user
//! actually changed.

use serde::{Deserialize, Serialize};

/// Default pen color (opaque black, ARGB)
pub const DEFAULT_PEN_COLOR: u32 = 0xFF00_0000;

/// Default smallest stroke radius in canvas units
pub const DEFAULT_RADIUS_MIN: f32 = 1.0;

/// Default largest stroke radius in canvas units
pub const DEFAULT_RADIUS_MAX: f32 = 20.0;

/// Default exponent applied to normalized pressure before the radius lerp
pub const DEFAULT_PRESSURE_EXPONENT: f32 = 2.0;

/// Default number of raw samples retained per pointer by the smoothing filter
pub const DEFAULT_FILTER_WINDOW: usize = 6;

/// Default position/time decay of the smoothing filter
pub const DEFAULT_POSITION_DECAY: f32 = 0.5;

/// Default pressure/size decay of the smoothing filter
pub const DEFAULT_PRESSURE_DECAY: f32 = 0.8;

/// Default blend factor applied when a calibration window closes
pub const DEFAULT_CALIBRATION_DECAY: f32 = 0.1;

/// Calibration window on a fresh device (quick training)
pub const DEFAULT_FIRST_RUN_WINDOW: u32 = 100;

/// Calibration window in normal use
pub const DEFAULT_STEADY_WINDOW: u32 = 1000;

/// Growth factor of the calibration window after each closed window
pub const DEFAULT_WINDOW_GROWTH: f32 = 1.5;

/// Default tile edge length in pixels
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default number of versions retained per tile
pub const DEFAULT_MAX_VERSIONS: usize = 10;

/// Pen styles, each selecting a stamp shape, ink density and blend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum PenStyle {
    /// Opaque filled circles
    #[default]
    Whiteboard = 0,
    /// Low-density circles that build up like marker bleed
    FeltTip = 1,
    /// Soft-edged sprite at half density
    Airbrush = 2,
    /// Oblique nib sprite at full density
    FountainPen = 3,
}

impl PenStyle {
    /// All styles in toolbar order
    pub const ALL: [PenStyle; 4] = [
        PenStyle::Whiteboard,
        PenStyle::FeltTip,
        PenStyle::Airbrush,
        PenStyle::FountainPen,
    ];
}

/// Which raw channel drives stroke width for non-stylus input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PressureSource {
    /// The reported pressure value
    #[default]
    Pressure,
    /// The reported contact size, for panels that report constant pressure
    Size,
}

/// Pen appearance, owned and persisted by the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenConfig {
    /// ARGB color; an alpha of zero selects the eraser
    pub color: u32,
    pub style: PenStyle,
    pub radius_min: f32,
    pub radius_max: f32,
    pub pressure_exponent: f32,
}

impl Default for PenConfig {
    fn default() -> Self {
        Self {
            color: DEFAULT_PEN_COLOR,
            style: PenStyle::default(),
            radius_min: DEFAULT_RADIUS_MIN,
            radius_max: DEFAULT_RADIUS_MAX,
            pressure_exponent: DEFAULT_PRESSURE_EXPONENT,
        }
    }
}

impl PenConfig {
    /// Radius range with min/max ordered and clamped to be non-negative
    pub fn radius_range(&self) -> (f32, f32) {
        let a = self.radius_min.max(0.0);
        let b = self.radius_max.max(0.0);
        if a <= b { (a, b) } else { (b, a) }
    }
}

/// Per-pointer smoothing filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Number of raw samples retained per pointer
    pub window: usize,
    pub position_decay: f32,
    pub pressure_decay: f32,
    /// Skip smoothing for stylus samples
    pub precise_stylus: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_FILTER_WINDOW,
            position_decay: DEFAULT_POSITION_DECAY,
            pressure_decay: DEFAULT_PRESSURE_DECAY,
            precise_stylus: true,
        }
    }
}

/// Online pressure calibration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// When false, raw pressure is treated as already normalized
    pub enabled: bool,
    pub decay: f32,
    pub first_run_window: u32,
    pub steady_window: u32,
    pub window_growth: f32,
    pub pressure_source: PressureSource,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            decay: DEFAULT_CALIBRATION_DECAY,
            first_run_window: DEFAULT_FIRST_RUN_WINDOW,
            steady_window: DEFAULT_STEADY_WINDOW,
            window_growth: DEFAULT_WINDOW_GROWTH,
            pressure_source: PressureSource::default(),
        }
    }
}

/// Tiled backing store parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub tile_size: u32,
    /// Versions retained per tile, including the current one
    pub max_versions: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            max_versions: DEFAULT_MAX_VERSIONS,
        }
    }
}

/// Complete configuration for a drawing session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlateConfig {
    pub pen: PenConfig,
    pub filter: FilterConfig,
    pub calibration: CalibrationConfig,
    pub surface: SurfaceConfig,
}

impl SlateConfig {
    /// Defaults with environment overrides applied
    ///
    /// `SLATE_PRECISE_STYLUS` accepts `0`/`1`/`true`/`false`,
    /// `SLATE_TILE_SIZE` accepts a positive integer.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(precise) = var("SLATE_PRECISE_STYLUS").and_then(|v| parse_flag(&v)) {
            config.filter.precise_stylus = precise;
        }
        if let Some(size) = var("SLATE_TILE_SIZE")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&v| v > 0)
        {
            config.surface.tile_size = size;
        }
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SlateConfig::default();
        assert_eq!(config.pen.style, PenStyle::Whiteboard);
        assert_eq!(config.filter.window, DEFAULT_FILTER_WINDOW);
        assert_eq!(config.surface.tile_size, DEFAULT_TILE_SIZE);
        assert!(config.calibration.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let config = SlateConfig::from_vars(|name| match name {
            "SLATE_PRECISE_STYLUS" => Some("off".into()),
            "SLATE_TILE_SIZE" => Some(" 128 ".into()),
            _ => None,
        });
        assert!(!config.filter.precise_stylus);
        assert_eq!(config.surface.tile_size, 128);
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let config = SlateConfig::from_vars(|name| match name {
            "SLATE_PRECISE_STYLUS" => Some("maybe".into()),
            "SLATE_TILE_SIZE" => Some("0".into()),
            _ => None,
        });
        assert!(config.filter.precise_stylus);
        assert_eq!(config.surface.tile_size, DEFAULT_TILE_SIZE);
    }

    #[test]
    fn test_radius_range_ordered() {
        let pen = PenConfig {
            radius_min: 30.0,
            radius_max: 2.0,
            ..Default::default()
        };
        assert_eq!(pen.radius_range(), (2.0, 30.0));
    }

    #[test]
    fn test_partial_json() {
        let config: SlateConfig =
            serde_json::from_str(r#"{ "pen": { "style": "Airbrush" }, "surface": { "tile_size": 64 } }"#)
                .unwrap();
        assert_eq!(config.pen.style, PenStyle::Airbrush);
        assert_eq!(config.pen.radius_max, DEFAULT_RADIUS_MAX);
        assert_eq!(config.surface.tile_size, 64);
        assert_eq!(config.surface.max_versions, DEFAULT_MAX_VERSIONS);
    }
}
