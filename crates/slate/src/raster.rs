//! Owned RGBA8 raster buffers
//!
//! Pixels are stored premultiplied, row-major, one `[r, g, b, a]` per pixel.
//! Conversion to and from `image::RgbaImage` (straight alpha) happens only at
//! the import/export boundary.

use image::RgbaImage;

use crate::error::SurfaceError;
use crate::types::{BlendMode, Paint};

/// Fully transparent pixel
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A premultiplied RGBA8 pixel buffer
#[derive(Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Raster {
    /// Allocate a transparent raster, reporting allocation failure instead of aborting
    pub fn try_new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixels = alloc_pixels(width, height)?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Fallible deep copy
    pub fn try_clone(&self) -> Result<Self, SurfaceError> {
        let mut pixels = alloc_pixels(self.width, self.height)?;
        pixels.copy_from_slice(&self.pixels);
        Ok(Self {
            width: self.width,
            height: self.height,
            pixels,
        })
    }

    /// Fill with a premultiplied pixel value
    pub fn clear(&mut self, pixel: [u8; 4]) {
        self.pixels.fill(pixel);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Get a pixel; `None` when out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Composite `paint` onto one pixel with the given coverage (0..1)
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, paint: &Paint, coverage: f32) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let a = (paint.alpha() * coverage).clamp(0.0, 1.0);
        if a <= 0.0 && paint.blend_mode != BlendMode::Source {
            return;
        }
        let dst = unpack(self.pixels[i]);
        let out = match paint.blend_mode {
            BlendMode::Normal => {
                let inv = 1.0 - a;
                [
                    paint.color[0] * a + dst[0] * inv,
                    paint.color[1] * a + dst[1] * inv,
                    paint.color[2] * a + dst[2] * inv,
                    a + dst[3] * inv,
                ]
            }
            BlendMode::Erase => {
                let remaining = 1.0 - a;
                [
                    dst[0] * remaining,
                    dst[1] * remaining,
                    dst[2] * remaining,
                    dst[3] * remaining,
                ]
            }
            BlendMode::Source => {
                let src_a = paint.alpha();
                let cov = coverage.clamp(0.0, 1.0);
                let inv = 1.0 - cov;
                [
                    paint.color[0] * src_a * cov + dst[0] * inv,
                    paint.color[1] * src_a * cov + dst[1] * inv,
                    paint.color[2] * src_a * cov + dst[2] * inv,
                    src_a * cov + dst[3] * inv,
                ]
            }
        };
        self.pixels[i] = pack(out);
    }

    /// Source-over a premultiplied pixel
    #[inline]
    pub fn blend_premultiplied(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if src[3] == 255 {
            self.pixels[i] = src;
            return;
        }
        let s = unpack(src);
        let d = unpack(self.pixels[i]);
        let inv = 1.0 - s[3];
        self.pixels[i] = pack([
            s[0] + d[0] * inv,
            s[1] + d[1] * inv,
            s[2] + d[2] * inv,
            s[3] + d[3] * inv,
        ]);
    }

    /// Copy a `w × h` block from `src` at `(src_x, src_y)` to `(dst_x, dst_y)`,
    /// clipped to both rasters
    pub fn copy_region_from(
        &mut self,
        src: &Raster,
        src_x: u32,
        src_y: u32,
        w: u32,
        h: u32,
        dst_x: u32,
        dst_y: u32,
    ) {
        let w = w
            .min(src.width.saturating_sub(src_x))
            .min(self.width.saturating_sub(dst_x)) as usize;
        let h = h
            .min(src.height.saturating_sub(src_y))
            .min(self.height.saturating_sub(dst_y));
        if w == 0 {
            return;
        }
        for row in 0..h {
            let s = ((src_y + row) as usize) * (src.width as usize) + src_x as usize;
            let d = ((dst_y + row) as usize) * (self.width as usize) + dst_x as usize;
            self.pixels[d..d + w].copy_from_slice(&src.pixels[s..s + w]);
        }
    }

    /// Raw bytes (premultiplied RGBA8) for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Straight-alpha export
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b, a] = self.pixels[(y as usize) * (self.width as usize) + x as usize];
            if a == 0 {
                return image::Rgba([0, 0, 0, 0]);
            }
            let un = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
            image::Rgba([un(r), un(g), un(b), a])
        })
    }

    /// Premultiplying import
    pub fn from_image(image: &RgbaImage) -> Result<Self, SurfaceError> {
        let mut raster = Self::try_new(image.width(), image.height())?;
        for (dst, px) in raster.pixels.iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = px.0;
            let pre = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
            *dst = [pre(r), pre(g), pre(b), a];
        }
        Ok(raster)
    }
}

fn alloc_pixels(width: u32, height: u32) -> Result<Vec<[u8; 4]>, SurfaceError> {
    let count = (width as usize)
        .checked_mul(height as usize)
        .ok_or(SurfaceError::Allocation { width, height })?;
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(count)
        .map_err(|_| SurfaceError::Allocation { width, height })?;
    pixels.resize(count, TRANSPARENT);
    Ok(pixels)
}

#[inline]
fn unpack(p: [u8; 4]) -> [f32; 4] {
    [
        p[0] as f32 / 255.0,
        p[1] as f32 / 255.0,
        p[2] as f32 / 255.0,
        p[3] as f32 / 255.0,
    ]
}

#[inline]
fn pack(c: [f32; 4]) -> [u8; 4] {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    [q(c[0]), q(c[1]), q(c[2]), q(c[3])]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red(opacity: f32) -> Paint {
        Paint::new([1.0, 0.0, 0.0, 1.0], opacity, BlendMode::Normal)
    }

    #[test]
    fn test_new_raster() {
        let raster = Raster::try_new(100, 100).unwrap();
        assert_eq!(raster.width, 100);
        assert_eq!(raster.pixels.len(), 10000);
        assert_eq!(raster.get_pixel(0, 0), Some(TRANSPARENT));
        assert_eq!(raster.get_pixel(100, 0), None);
    }

    #[test]
    fn test_blend_pixel_opaque() {
        let mut raster = Raster::try_new(10, 10).unwrap();
        raster.blend_pixel(5, 5, &red(1.0), 1.0);
        assert_eq!(raster.get_pixel(5, 5), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_blend_pixel_half() {
        let mut raster = Raster::try_new(10, 10).unwrap();
        raster.clear([255, 255, 255, 255]);
        raster.blend_pixel(5, 5, &red(0.5), 1.0);

        let [r, g, _, a] = raster.get_pixel(5, 5).unwrap();
        assert_eq!(r, 255);
        assert!((g as i32 - 128).abs() <= 1);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_erase_pixel() {
        let mut raster = Raster::try_new(10, 10).unwrap();
        raster.clear([255, 0, 0, 255]);
        raster.blend_pixel(1, 1, &Paint::eraser(), 1.0);
        assert_eq!(raster.get_pixel(1, 1), Some(TRANSPARENT));
        assert_eq!(raster.get_pixel(2, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_copy_region_clipped() {
        let mut src = Raster::try_new(4, 4).unwrap();
        src.clear([1, 2, 3, 4]);
        let mut dst = Raster::try_new(3, 3).unwrap();
        dst.copy_region_from(&src, 0, 0, 4, 4, 1, 1);

        assert_eq!(dst.get_pixel(0, 0), Some(TRANSPARENT));
        assert_eq!(dst.get_pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(dst.get_pixel(2, 2), Some([1, 2, 3, 4]));
    }

    #[test]
    fn test_image_round_trip_opaque() {
        let mut raster = Raster::try_new(2, 2).unwrap();
        raster.pixels[0] = [10, 20, 30, 255];
        let image = raster.to_image();
        assert_eq!(image.get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert_eq!(Raster::from_image(&image).unwrap(), raster);
    }

    #[test]
    fn test_as_bytes() {
        let raster = Raster::try_new(2, 2).unwrap();
        assert_eq!(raster.as_bytes().len(), 16);
    }
}
