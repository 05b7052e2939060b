//! Error types for surface allocation and calibration persistence.

/// Errors raised while creating or growing raster storage.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Failed to allocate a {width}x{height} raster")]
    Allocation { width: u32, height: u32 },

    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid tile size: {0}")]
    InvalidTileSize(u32),
}

/// Errors raised by calibration stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Calibration store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid calibration data: {0}")]
    Json(#[from] serde_json::Error),
}
