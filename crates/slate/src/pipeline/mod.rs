//! Complete input-to-ink pipeline
//!
//! This module connects:
//! - Touch events from the host (per-pointer samples with history)
//! - Per-pointer smoothing filters
//! - Pressure calibration and the radius curve
//! - Per-pointer stroke renderers
//! - The tiled surface (drawing, undo, dirty tracking, export)
//!
//! Everything runs synchronously on the caller's thread; a sample is fully
//! inked before the next one is looked at.

mod input;
mod stroke;
mod surface_ops;
mod undo;

use std::sync::Arc;

use slate_config::{FilterConfig, PenConfig, PenStyle, PressureSource, SlateConfig};
use tracing::debug;

use crate::brush::{SpriteSet, StrokeRenderer};
use crate::calibration::{CalibrationState, PressureCalibrator};
use crate::constants::MAX_POINTERS;
use crate::error::SurfaceError;
use crate::filter::SpotFilter;
use crate::tiles::TiledSurface;

pub use input::{PointerSample, TouchAction, TouchEvent};

/// Smoothing and rendering state for one active pointer
#[derive(Debug, Clone)]
pub struct PointerStroke {
    pub filter: SpotFilter,
    pub renderer: StrokeRenderer,
}

/// Drawing session over one canvas
///
/// Owns the surface, the pressure calibrator and one optional stroke per
/// pointer slot.
#[derive(Debug)]
pub struct StrokeSession {
    pub(crate) surface: TiledSurface,
    pub(crate) calibrator: PressureCalibrator,
    pub(crate) pointers: [Option<PointerStroke>; MAX_POINTERS],
    pub(crate) pen: PenConfig,
    pub(crate) filter_config: FilterConfig,
    pub(crate) pressure_source: PressureSource,
    pub(crate) sprites: Arc<SpriteSet>,
}

impl StrokeSession {
    /// Create a session with a transparent `width × height` canvas
    pub fn new(
        width: u32,
        height: u32,
        config: &SlateConfig,
        calibrator: PressureCalibrator,
    ) -> Result<Self, SurfaceError> {
        let surface = TiledSurface::new(width, height, &config.surface)?;
        debug!(
            "StrokeSession::new: {}x{}, pen={:?}, calibration enabled={}",
            width,
            height,
            config.pen,
            calibrator.is_enabled()
        );
        Ok(Self {
            surface,
            calibrator,
            pointers: std::array::from_fn(|_| None),
            pen: config.pen.clone(),
            filter_config: config.filter.clone(),
            pressure_source: config.calibration.pressure_source,
            sprites: Arc::new(SpriteSet::new()),
        })
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn pen(&self) -> &PenConfig {
        &self.pen
    }

    /// Set the pen color (ARGB); zero alpha selects the eraser
    pub fn set_pen_color(&mut self, argb: u32) {
        self.pen.color = argb;
        for stroke in self.pointers.iter_mut().flatten() {
            stroke.renderer.set_color(argb);
        }
    }

    pub fn set_pen_style(&mut self, style: PenStyle) {
        self.pen.style = style;
        for stroke in self.pointers.iter_mut().flatten() {
            stroke.renderer.set_style(style);
        }
    }

    /// Radii at zero and full pressure
    pub fn set_radius_range(&mut self, radius_min: f32, radius_max: f32) {
        self.pen.radius_min = radius_min;
        self.pen.radius_max = radius_max;
    }

    /// Exponent applied to normalized pressure before the radius lerp
    pub fn set_pressure_exponent(&mut self, exponent: f32) {
        self.pen.pressure_exponent = if exponent.is_finite() { exponent.max(0.0) } else { 1.0 };
    }

    /// Number of pointers with a stroke in progress
    pub fn active_pointers(&self) -> usize {
        self.pointers.iter().flatten().count()
    }

    pub fn is_drawing(&self) -> bool {
        self.active_pointers() > 0
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibrator.state()
    }

    pub fn calibrator(&self) -> &PressureCalibrator {
        &self.calibrator
    }

    pub fn surface(&self) -> &TiledSurface {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use slate_config::SurfaceConfig;

    use super::*;
    use crate::types::{Spot, ToolKind};

    fn session() -> StrokeSession {
        let config = SlateConfig {
            surface: SurfaceConfig {
                tile_size: 64,
                ..Default::default()
            },
            ..Default::default()
        };
        StrokeSession::new(256, 256, &config, PressureCalibrator::default()).unwrap()
    }

    fn spot(x: f32, y: f32) -> Spot {
        Spot::new(x, y, 0.2, 0.5, 0, ToolKind::Finger)
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert_eq!(session.width(), 256);
        assert_eq!(session.height(), 256);
        assert!(!session.is_drawing());
        assert_eq!(session.surface().tile_size(), 64);
    }

    #[test]
    fn test_invalid_size() {
        let result = StrokeSession::new(0, 10, &SlateConfig::default(), PressureCalibrator::default());
        assert!(matches!(result, Err(SurfaceError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_pen_settings_reach_active_pointers() {
        let mut session = session();
        session.handle_event(&TouchEvent::single(TouchAction::Down, 0, spot(10.0, 10.0)));

        session.set_pen_color(0xFF12_3456);
        session.set_pen_style(PenStyle::Airbrush);

        let stroke = session.pointers[0].as_ref().unwrap();
        assert_eq!(stroke.renderer.color(), 0xFF12_3456);
        assert_eq!(stroke.renderer.style(), PenStyle::Airbrush);
        assert_eq!(session.pen().style, PenStyle::Airbrush);
    }

    #[test]
    fn test_radius_range_sets_dot_size() {
        let mut session = session();
        session.set_radius_range(5.0, 5.0);
        session.handle_event(&TouchEvent::single(TouchAction::Down, 0, spot(100.0, 100.0)));

        assert_eq!(session.surface().get_pixel(100, 104), Some([0, 0, 0, 255]));
        assert_eq!(session.surface().get_pixel(100, 106), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_calibration_state_reports_learned_range() {
        let calibrator = PressureCalibrator::new(Default::default(), Some(CalibrationState::new(0.2, 0.9)));
        let session = StrokeSession::new(64, 64, &SlateConfig::default(), calibrator).unwrap();
        assert_eq!(session.calibration_state(), CalibrationState::new(0.2, 0.9));
    }

    #[test]
    fn test_pressure_exponent_sanitized() {
        let mut session = session();
        session.set_pressure_exponent(-2.0);
        assert_eq!(session.pen().pressure_exponent, 0.0);
        session.set_pressure_exponent(f32::NAN);
        assert_eq!(session.pen().pressure_exponent, 1.0);
    }
}
