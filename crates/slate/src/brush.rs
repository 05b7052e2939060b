//! Stroke rendering: adaptive stamping between filtered points
//!
//! A stroke is rendered as a sequence of stamps along the straight segment
//! between consecutive points, with position and radius interpolated by
//! arc length. Thin strokes are stamped every pixel so they stay solid; wide
//! strokes space their stamps proportionally to the radius since large stamps
//! overlap anyway.

use std::sync::Arc;

use glam::{DVec2, Vec2};
use slate_config::PenStyle;
use tracing::{debug, trace};

use crate::constants::*;
use crate::sprite::Sprite;
use crate::tiles::TiledSurface;
use crate::types::{BlendMode, DirtyRect, Paint, ToolKind, argb_to_rgba};

/// Arc-length distance to the next stamp for a stamp of radius `r`
#[inline]
pub fn step_size(r: f32) -> f32 {
    if r <= STEP_RADIUS_THRESHOLD {
        STEP_MIN
    } else {
        let over = r - STEP_RADIUS_THRESHOLD;
        (STEP_SLOPE * over * over + STEP_MIN).sqrt()
    }
}

/// Parametric range `[t0, t1]` within `[0, 1]` of the segment
/// `start + delta * t` that lies inside the box `min..max`
fn clip_segment(start: DVec2, delta: DVec2, min: DVec2, max: DVec2) -> Option<(f64, f64)> {
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, d, lo, hi) in [(start.x, delta.x, min.x, max.x), (start.y, delta.y, min.y, max.y)] {
        if d == 0.0 {
            if p < lo || p > hi {
                return None;
            }
            continue;
        }
        let (a, b) = ((lo - p) / d, (hi - p) / d);
        t0 = t0.max(a.min(b));
        t1 = t1.min(a.max(b));
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Shape painted by one stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampShape {
    Circle,
    Airbrush,
    FountainPen,
}

/// Per-style stamp table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampParams {
    pub shape: StampShape,
    /// Ink density (0..=255), applied as paint opacity
    pub density: u8,
    pub blend_mode: BlendMode,
}

impl StampParams {
    pub fn for_style(style: PenStyle) -> Self {
        let (shape, density) = match style {
            PenStyle::Whiteboard => (StampShape::Circle, DENSITY_WHITEBOARD),
            PenStyle::FeltTip => (StampShape::Circle, DENSITY_FELT_TIP),
            PenStyle::Airbrush => (StampShape::Airbrush, DENSITY_AIRBRUSH),
            PenStyle::FountainPen => (StampShape::FountainPen, DENSITY_FOUNTAIN_PEN),
        };
        Self {
            shape,
            density,
            blend_mode: BlendMode::Normal,
        }
    }

    /// Fully opaque hard destination-out circle, whatever the style
    pub fn eraser() -> Self {
        Self {
            shape: StampShape::Circle,
            density: 0xff,
            blend_mode: BlendMode::Erase,
        }
    }

    /// Paint for a straight-alpha color under these parameters
    pub fn paint(&self, color: [f32; 4]) -> Paint {
        match self.blend_mode {
            BlendMode::Erase => Paint::eraser(),
            mode => Paint::new(color, self.density as f32 / 255.0, mode),
        }
    }
}

/// Brush sprites, generated once and shared by every pointer
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSet {
    pub airbrush: Sprite,
    pub fountain_pen: Sprite,
}

impl SpriteSet {
    pub fn new() -> Self {
        Self {
            airbrush: Sprite::airbrush(),
            fountain_pen: Sprite::fountain_pen(),
        }
    }
}

impl Default for SpriteSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Paint one stamp centered at `(x, y)`; returns the stamp's bounds, or empty
/// if it fell entirely outside the surface
pub fn stamp(
    surface: &mut TiledSurface,
    sprites: &SpriteSet,
    params: &StampParams,
    paint: &Paint,
    x: f32,
    y: f32,
    r: f32,
) -> DirtyRect {
    let bounds = DirtyRect::around(x, y, r);
    let drawn = match params.shape {
        StampShape::Circle => surface.fill_circle(x, y, r, paint),
        StampShape::Airbrush => surface.draw_sprite(&sprites.airbrush, bounds, paint),
        StampShape::FountainPen => surface.draw_sprite(&sprites.fountain_pen, bounds, paint),
    };
    if drawn.is_some() { bounds } else { DirtyRect::EMPTY }
}

/// Per-pointer stroke renderer
#[derive(Debug, Clone)]
pub struct StrokeRenderer {
    /// Last stamped point and radius; `None` until the stroke's first point
    last: Option<(Vec2, f32)>,
    color: u32,
    style: PenStyle,
    /// Set when the current sample came from the stylus eraser tip
    tool_erases: bool,
    sprites: Arc<SpriteSet>,
}

impl StrokeRenderer {
    pub fn new(color: u32, style: PenStyle, sprites: Arc<SpriteSet>) -> Self {
        Self {
            last: None,
            color,
            style,
            tool_erases: false,
            sprites,
        }
    }

    /// Forget the last point; the next `stroke_to` starts with a dot
    pub fn reset(&mut self) {
        self.last = None;
        self.tool_erases = false;
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.last.is_some()
    }

    pub fn set_color(&mut self, argb: u32) {
        self.color = argb;
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn set_style(&mut self, style: PenStyle) {
        self.style = style;
    }

    pub fn style(&self) -> PenStyle {
        self.style
    }

    /// Record which tool produced the next sample
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool_erases = tool == ToolKind::Eraser;
    }

    /// True when the pen color is the eraser sentinel (zero alpha)
    #[inline]
    pub fn is_eraser(&self) -> bool {
        self.color >> 24 == 0
    }

    fn stamp_params(&self) -> StampParams {
        if self.is_eraser() || self.tool_erases {
            StampParams::eraser()
        } else {
            StampParams::for_style(self.style)
        }
    }

    /// Extend the stroke to `(x, y)` with the given radius
    ///
    /// Returns the union of the stamped bounds.
    pub fn stroke_to(&mut self, surface: &mut TiledSurface, x: f32, y: f32, radius: f32) -> DirtyRect {
        let end = Vec2::new(x, y);
        if !end.is_finite() || !radius.is_finite() {
            trace!("StrokeRenderer::stroke_to: skipping non-finite point ({}, {}, {})", x, y, radius);
            return DirtyRect::EMPTY;
        }
        let radius = radius.max(0.0);
        let params = self.stamp_params();
        let paint = params.paint(argb_to_rgba(self.color));

        let Some((start, start_radius)) = self.last else {
            self.last = Some((end, radius));
            debug!(
                "StrokeRenderer: first stamp at ({:.1}, {:.1}), r={:.2}, shape={:?}",
                x, y, radius, params.shape
            );
            return stamp(surface, &self.sprites, &params, &paint, x, y, radius);
        };

        // f64 keeps positions exact when one endpoint is far off the canvas
        let (from, to) = (start.as_dvec2(), end.as_dvec2());
        let delta = to - from;
        let length = delta.length();
        let mut dirty = DirtyRect::EMPTY;
        let mut stamps = 0u32;
        if length > 0.0 {
            let pad = (start_radius.max(radius) + STAMP_PADDING) as f64;
            let visible = clip_segment(
                from,
                delta,
                DVec2::splat(-pad),
                DVec2::new(surface.width() as f64 + pad, surface.height() as f64 + pad),
            );
            if let Some((t_enter, t_exit)) = visible {
                let (d_enter, d_exit) = (t_enter * length, t_exit * length);
                // every step is at least STEP_MIN, which bounds the walk
                let max_stamps = ((d_exit - d_enter) / STEP_MIN as f64).ceil() as u64 + 1;
                let mut d = d_enter;
                for _ in 0..max_stamps {
                    let t = d / length;
                    let p = from + delta * t;
                    let r = start_radius + (radius - start_radius) * t as f32;
                    dirty.union(&stamp(surface, &self.sprites, &params, &paint, p.x as f32, p.y as f32, r));
                    stamps += 1;

                    d += step_size(r) as f64;
                    if d > d_exit {
                        break;
                    }
                }
            }
        } else {
            dirty = stamp(surface, &self.sprites, &params, &paint, x, y, radius);
            stamps = 1;
        }

        trace!(
            "StrokeRenderer: {} stamps over {:.1} units to ({:.1}, {:.1})",
            stamps, length, x, y
        );
        self.last = Some((end, radius));
        dirty
    }
}
