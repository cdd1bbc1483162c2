//! Logo decoding and sizing.

use std::path::Path;

use image::GenericImageView;

use crate::error::ReportError;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// Width of the logo in the page header.
pub const LOGO_WIDTH_MM: f64 = 40.0;

/// Loads an image from in-memory bytes using the [`image`] crate with descriptive errors.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<image::DynamicImage, ReportError> {
    image::load_from_memory(bytes.as_ref())
        .map_err(|err| ReportError::Image(format!("failed to decode image bytes: {}", err)))
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, ReportError> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .map_err(|err| ReportError::Image(format!("failed to open {}: {}", path.display(), err)))?;
    reader
        .with_guessed_format()
        .map_err(|err| ReportError::Image(format!("unable to determine format: {}", err)))?
        .decode()
        .map_err(|err| ReportError::Image(format!("failed to decode {}: {}", path.display(), err)))
}

/// A decoded logo together with the scale that renders it at the requested width.
pub struct Logo {
    image: image::DynamicImage,
    width_mm: f64,
}

impl Logo {
    /// Wraps `image`, scaled to `width_mm` while keeping the aspect ratio.
    pub fn new(image: image::DynamicImage, width_mm: f64) -> Self {
        Self { image, width_mm }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        Ok(Self::new(decode_image_from_path(path)?, LOGO_WIDTH_MM))
    }

    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, ReportError> {
        Ok(Self::new(decode_image_from_bytes(bytes)?, LOGO_WIDTH_MM))
    }

    pub fn image(&self) -> &image::DynamicImage {
        &self.image
    }

    /// DPI used to convert pixels into millimetres before scaling.
    pub fn dpi(&self) -> f64 {
        DEFAULT_IMAGE_DPI
    }

    /// Size in millimetres at [`dpi`](Self::dpi) without scaling.
    pub fn natural_size(&self) -> (f64, f64) {
        let (px_width, px_height) = self.image.dimensions();
        (
            MM_PER_INCH * f64::from(px_width) / DEFAULT_IMAGE_DPI,
            MM_PER_INCH * f64::from(px_height) / DEFAULT_IMAGE_DPI,
        )
    }

    /// Uniform scale factor that yields the requested width.
    pub fn scale(&self) -> f64 {
        let (natural_width, _) = self.natural_size();
        if natural_width > f64::EPSILON {
            self.width_mm / natural_width
        } else {
            1.0
        }
    }

    /// Rendered size in millimetres.
    pub fn rendered_size(&self) -> (f64, f64) {
        let (width, height) = self.natural_size();
        let scale = self.scale();
        (width * scale, height * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn sample(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([10, 20, 30])))
    }

    #[test]
    fn keeps_aspect_ratio_at_requested_width() {
        let logo = Logo::new(sample(400, 100), LOGO_WIDTH_MM);
        let (width, height) = logo.rendered_size();
        assert!((width - LOGO_WIDTH_MM).abs() < 1e-9);
        assert!((height - 10.0).abs() < 1e-9);
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        assert!(matches!(
            Logo::from_bytes([0u8, 1, 2, 3]),
            Err(ReportError::Image(_))
        ));
    }
}
