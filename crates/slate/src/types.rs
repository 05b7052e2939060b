use serde::{Deserialize, Serialize};

/// Kind of tool that produced a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ToolKind {
    Finger = 0,
    Stylus = 1,
    Eraser = 2,
    #[default]
    Unknown = 3,
}

impl ToolKind {
    /// Pen hardware (either tip), whose pressure is reported pre-calibrated
    #[inline]
    pub fn is_stylus(self) -> bool {
        matches!(self, ToolKind::Stylus | ToolKind::Eraser)
    }
}

/// One input sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Spot {
    pub x: f32,
    pub y: f32,
    /// Contact-area proxy, device units
    pub size: f32,
    /// Raw sensor pressure, device units
    pub pressure: f32,
    /// Milliseconds, caller's clock
    pub timestamp: i64,
    pub tool: ToolKind,
}

impl Spot {
    pub fn new(x: f32, y: f32, size: f32, pressure: f32, timestamp: i64, tool: ToolKind) -> Self {
        Self {
            x,
            y,
            size,
            pressure,
            timestamp,
            tool,
        }
    }
}

/// Blend modes for painting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BlendMode {
    /// Source-over
    #[default]
    Normal = 0,
    /// Destination-out: punch transparency into existing ink
    Erase = 1,
    /// Replace destination pixels
    Source = 2,
}

/// Color and compositing for one drawing operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Straight-alpha RGBA in 0..1
    pub color: [f32; 4],
    /// Multiplied into the color's alpha
    pub opacity: f32,
    pub blend_mode: BlendMode,
}

impl Paint {
    pub fn new(color: [f32; 4], opacity: f32, blend_mode: BlendMode) -> Self {
        Self {
            color,
            opacity: opacity.clamp(0.0, 1.0),
            blend_mode,
        }
    }

    /// Opaque destination-out paint
    pub fn eraser() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0], 1.0, BlendMode::Erase)
    }

    /// Effective source alpha for full coverage
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.color[3] * self.opacity
    }
}

/// Convert a packed ARGB color to straight-alpha RGBA floats
pub fn argb_to_rgba(argb: u32) -> [f32; 4] {
    let channel = |shift: u32| ((argb >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), channel(24)]
}

/// Float rectangle in canvas coordinates; the empty rect has `left >= right`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirtyRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for DirtyRect {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl DirtyRect {
    pub const EMPTY: DirtyRect = DirtyRect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Bounding box of a circle
    pub fn around(x: f32, y: f32, r: f32) -> Self {
        Self::new(x - r, y - r, x + r, y + r)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.left < self.right && self.top < self.bottom)
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Grow to include `other`; empty rects are ignored on both sides
    pub fn union(&mut self, other: &DirtyRect) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
    }

    /// Pixel bounds `(x, y, w, h)` after padding, clipped to `width × height`
    pub fn to_pixel_bounds(&self, padding: f32, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        if self.is_empty() {
            return None;
        }
        let x_min = ((self.left - padding).floor().max(0.0) as u32).min(width);
        let y_min = ((self.top - padding).floor().max(0.0) as u32).min(height);
        let x_max = ((self.right + padding).ceil().max(0.0) as u32).min(width);
        let y_max = ((self.bottom + padding).ceil().max(0.0) as u32).min(height);
        if x_min >= x_max || y_min >= y_max {
            return None;
        }
        Some((x_min, y_min, x_max - x_min, y_max - y_min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_to_rgba() {
        let rgba = argb_to_rgba(0x80FF_0000);
        assert!((rgba[0] - 1.0).abs() < 1e-6);
        assert_eq!(rgba[1], 0.0);
        assert!((rgba[3] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_dirty_rect_union() {
        let mut rect = DirtyRect::EMPTY;
        assert!(rect.is_empty());

        rect.union(&DirtyRect::around(10.0, 10.0, 2.0));
        assert_eq!(rect, DirtyRect::new(8.0, 8.0, 12.0, 12.0));

        rect.union(&DirtyRect::around(20.0, 5.0, 1.0));
        assert_eq!(rect, DirtyRect::new(8.0, 4.0, 21.0, 12.0));

        rect.union(&DirtyRect::EMPTY);
        assert_eq!(rect, DirtyRect::new(8.0, 4.0, 21.0, 12.0));
    }

    #[test]
    fn test_pixel_bounds_clipped() {
        let rect = DirtyRect::around(2.0, 2.0, 5.0);
        assert_eq!(rect.to_pixel_bounds(1.0, 100, 100), Some((0, 0, 8, 8)));
        assert_eq!(DirtyRect::around(-50.0, -50.0, 5.0).to_pixel_bounds(1.0, 100, 100), None);
    }

    #[test]
    fn test_stylus_tools() {
        assert!(ToolKind::Stylus.is_stylus());
        assert!(ToolKind::Eraser.is_stylus());
        assert!(!ToolKind::Finger.is_stylus());
        assert!(!ToolKind::Unknown.is_stylus());
    }
}
