//! Raster surface the compositor draws into, plus its PNG export

use crate::rendering::paint::{Color, PaintCommand};
use crate::{Error, Result};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, ImageEncoder, Rgba, RgbaImage};

/// Resampling filter used for every image draw; fixed so output is reproducible.
const RESAMPLE: FilterType = FilterType::Lanczos3;

/// Resample `image` to exactly `width x height`.
pub fn resample(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.width() == width && image.height() == height {
        return image.clone();
    }
    imageops::resize(image, width, height, RESAMPLE)
}

/// An owned RGBA drawing surface with sheet-pixel coordinates.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(Color::WHITE.0)),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Overwrite every pixel (no blending).
    pub fn clear(&mut self, color: Color) {
        for p in self.pixels.pixels_mut() {
            *p = Rgba(color.0);
        }
    }

    /// Fill a rectangle, clipped to the surface. Replaces pixels.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        let x0 = (x.max(0) as u32).min(self.width());
        let y0 = (y.max(0) as u32).min(self.height());
        let x1 = (x as i64 + width as i64).clamp(0, self.width() as i64) as u32;
        let y1 = (y as i64 + height as i64).clamp(0, self.height() as i64) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels.put_pixel(px, py, Rgba(color.0));
            }
        }
    }

    pub fn paint(&mut self, commands: &[PaintCommand]) {
        for cmd in commands {
            match *cmd {
                PaintCommand::SolidRect { x, y, width, height, color } => {
                    self.fill_rect(x, y, width, height, color)
                }
            }
        }
    }

    /// Alpha-blend `image` at `(x, y)` without resampling.
    pub fn blit(&mut self, image: &RgbaImage, x: u32, y: u32) {
        imageops::overlay(&mut self.pixels, image, x as i64, y as i64);
    }

    /// Encode the surface as an opaque RGB PNG with a fixed encoder profile.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let rgb = DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8();
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, CompressionType::Default, PngFilter::Adaptive)
            .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|e| Error::RenderError(format!("PNG encode failed: {}", e)))?;
        Ok(out)
    }
}
