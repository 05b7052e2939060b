/// Maximum number of simultaneously tracked pointers.
pub const MAX_POINTERS: usize = 10;

/// Pressure returned when the calibrated range collapses to a point.
pub const NEUTRAL_PRESSURE: f32 = 0.5;

/// Stamps at or below this radius are spaced `STEP_MIN` apart.
pub const STEP_RADIUS_THRESHOLD: f32 = 16.0;

/// Minimum arc-length step between stamps.
pub const STEP_MIN: f32 = 1.0;

/// Growth of the stamp step above the threshold radius.
pub const STEP_SLOPE: f32 = 0.1;

/// Padding (pixels) added around a drawing operation's bounds before tile fan-out.
pub const STAMP_PADDING: f32 = 1.0;

/// Edge length of the procedurally generated brush sprites.
pub const SPRITE_SIZE: u32 = 64;

/// Ink densities per pen style (0..=255).
pub const DENSITY_WHITEBOARD: u8 = 0xff;
pub const DENSITY_FELT_TIP: u8 = 0x10;
pub const DENSITY_AIRBRUSH: u8 = 0x80;
pub const DENSITY_FOUNTAIN_PEN: u8 = 0xff;
