//! Slate drawing core - turning raw touch input into ink
//!
//! This crate provides the input-to-ink pipeline:
//! - [`filter`] - Per-pointer exponential smoothing of raw samples
//! - [`calibration`] - Online pressure range calibration with persistence
//! - [`brush`] - Adaptive stamping between filtered points
//! - [`sprite`] - Procedural brush sprites
//! - [`tiles`] - Tiled raster store with versioned undo and dirty tracking
//! - [`raster`] - Premultiplied RGBA8 buffers and image interop
//! - [`pipeline`] - Complete session from touch events to surface

pub mod brush;
pub mod calibration;
pub mod constants;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod raster;
pub mod sprite;
pub mod tiles;
pub mod types;

pub use brush::*;
pub use calibration::*;
pub use constants::*;
pub use error::*;
pub use filter::*;
pub use pipeline::*;
pub use raster::*;
pub use sprite::*;
pub use tiles::*;
pub use types::*;

pub use slate_config::{PenStyle, PressureSource, SlateConfig};
