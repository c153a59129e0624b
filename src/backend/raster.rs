//! Buffer-level raster backend
//!
//! Operates on a flat RGBA buffer through procedural `imageops` calls, the
//! way a classic raster graphics library exposes them. Decoding is
//! per-format (the detected format is handed to the decoder explicitly),
//! resampling uses the bilinear filter, and rotation goes through a
//! counter-clockwise primitive: a positive (clockwise) request is
//! complemented to `360 - angle` first, a negative one is rotated by its
//! absolute value. That sign handling matches the toolkit backend's
//! clockwise convention and must not be simplified away.

use super::{right_angle, rotate_expanded, tint, BackendKind, ImageBackend};
use crate::error::{ImageMillError, Result};
use crate::format::ImageKind;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbaImage};
use std::path::Path;

/// Raster backend owning a single RGBA pixel buffer
pub struct RasterBackend {
    image: Option<RgbaImage>,
}

impl RasterBackend {
    pub fn new() -> Self {
        Self { image: None }
    }

    fn require(&self, operation: &str) -> Result<&RgbaImage> {
        self.image
            .as_ref()
            .ok_or_else(|| ImageMillError::not_loaded(operation))
    }

    /// CCW-oriented rotation primitive, the library's native direction.
    fn rotate_counter_clockwise(image: &RgbaImage, degrees: f32) -> RgbaImage {
        match right_angle(degrees) {
            Some(0) => image.clone(),
            Some(90) => imageops::rotate270(image),
            Some(180) => imageops::rotate180(image),
            Some(270) => imageops::rotate90(image),
            _ => rotate_expanded(image, 360.0 - degrees.rem_euclid(360.0)),
        }
    }

    /// Orientation correction needs the source file; without compiled-in
    /// EXIF support the raster path fails hard rather than skipping.
    #[cfg(feature = "exif")]
    fn apply_file_orientation(&mut self, source: Option<&Path>) -> Result<()> {
        let path = source.ok_or_else(|| {
            ImageMillError::processing(
                "autorotate requires the original file to read orientation metadata",
            )
        })?;
        let orientation = match crate::orientation::read_from_path(path)? {
            Some(orientation) if !orientation.is_upright() => orientation,
            _ => return Ok(()),
        };

        let (degrees, mirror) = orientation.transforms();
        if degrees != 0 {
            self.rotate(f32::from(degrees))?;
        }
        if mirror {
            self.flip_horizontal()?;
        }
        Ok(())
    }

    #[cfg(not(feature = "exif"))]
    fn apply_file_orientation(&mut self, _source: Option<&Path>) -> Result<()> {
        Err(ImageMillError::processing(
            "orientation metadata support not compiled in (enable the `exif` feature)",
        ))
    }
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RasterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn load(&mut self, path: &Path, format: ImageKind) -> Result<()> {
        let mut reader = ImageReader::open(path)
            .map_err(|e| ImageMillError::file_io_error("open image file", path, e))?;
        // explicit per-format decode, no second guess at the content
        reader.set_format(format.to_image_format());
        let decoded = reader
            .decode()
            .map_err(|e| ImageMillError::processing(format!("failed to decode {format} image: {e}")))?;
        self.image = Some(decoded.to_rgba8());
        Ok(())
    }

    fn load_bytes(&mut self, bytes: &[u8], format: ImageKind) -> Result<()> {
        let decoded = image::load_from_memory_with_format(bytes, format.to_image_format())
            .map_err(|e| ImageMillError::processing(format!("failed to decode {format} image: {e}")))?;
        self.image = Some(decoded.to_rgba8());
        Ok(())
    }

    fn release(&mut self) {
        self.image = None;
    }

    fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    fn dimensions(&self) -> Result<(u32, u32)> {
        let image = self.require("dimensions")?;
        Ok(image.dimensions())
    }

    fn snapshot(&self) -> Result<DynamicImage> {
        let image = self.require("snapshot")?;
        Ok(DynamicImage::ImageRgba8(image.clone()))
    }

    fn resize(
        &mut self,
        width: u32,
        height: u32,
        preserve_aspect: bool,
        allow_enlarge: bool,
    ) -> Result<()> {
        let image = self.require("resize")?;
        let (current_width, current_height) = image.dimensions();

        // One deterministic pass: the width-driven branch wins when it
        // applies, the height-driven branch only otherwise.
        let (new_width, new_height) = if !preserve_aspect {
            if width == 0 || height == 0 {
                return Ok(());
            }
            (width, height)
        } else if width > 0 && (allow_enlarge || width < current_width) {
            let derived =
                (f64::from(width) * f64::from(current_height) / f64::from(current_width)).round();
            (width, (derived as u32).max(1))
        } else if height > 0 && (allow_enlarge || height < current_height) {
            let derived =
                (f64::from(current_width) * f64::from(height) / f64::from(current_height)).round();
            ((derived as u32).max(1), height)
        } else {
            return Ok(());
        };

        self.image = Some(imageops::resize(
            image,
            new_width,
            new_height,
            FilterType::Triangle,
        ));
        Ok(())
    }

    fn crop(&mut self, width: u32, height: u32, left: u32, top: u32) -> Result<()> {
        let image = self.require("crop")?;
        let (current_width, current_height) = image.dimensions();

        let out_of_bounds = width == 0
            || height == 0
            || left.checked_add(width).map_or(true, |edge| edge > current_width)
            || top.checked_add(height).map_or(true, |edge| edge > current_height);
        if out_of_bounds {
            return Err(ImageMillError::processing(format!(
                "crop rectangle {width}x{height}+{left}+{top} exceeds image bounds {current_width}x{current_height}"
            )));
        }

        self.image = Some(imageops::crop_imm(image, left, top, width, height).to_image());
        Ok(())
    }

    fn brightness(&mut self, delta: i32) -> Result<()> {
        let image = self.require("brightness")?;
        self.image = Some(imageops::brighten(image, delta));
        Ok(())
    }

    fn contrast(&mut self, delta: i32) -> Result<()> {
        let image = self.require("contrast")?;
        self.image = Some(imageops::contrast(image, delta as f32));
        Ok(())
    }

    fn colorize(&mut self, red: i32, green: i32, blue: i32) -> Result<()> {
        let image = self.require("colorize")?;
        self.image = Some(tint(image, red, green, blue));
        Ok(())
    }

    fn negative(&mut self) -> Result<()> {
        let image = self
            .image
            .as_mut()
            .ok_or_else(|| ImageMillError::not_loaded("negative"))?;
        imageops::invert(image);
        Ok(())
    }

    fn grayscale(&mut self) -> Result<()> {
        let image = self.require("grayscale")?;
        // keep the truecolor layout (and alpha) with equalized channels
        let gray = imageops::grayscale_alpha(image);
        self.image = Some(DynamicImage::ImageLumaA8(gray).to_rgba8());
        Ok(())
    }

    fn sepia(&mut self) -> Result<()> {
        self.grayscale()?;
        self.colorize(90, 60, 40)
    }

    fn flip_horizontal(&mut self) -> Result<()> {
        let image = self.require("flip_horizontal")?;
        self.image = Some(imageops::flip_horizontal(image));
        Ok(())
    }

    fn flip_vertical(&mut self) -> Result<()> {
        let image = self.require("flip_vertical")?;
        self.image = Some(imageops::flip_vertical(image));
        Ok(())
    }

    fn rotate(&mut self, angle: f32) -> Result<()> {
        let image = self.require("rotate")?;
        // complement positive (clockwise) requests for the CCW primitive
        let ccw = if angle > 0.0 { 360.0 - angle } else { -angle };
        self.image = Some(Self::rotate_counter_clockwise(image, ccw));
        Ok(())
    }

    fn auto_orient(&mut self, source: Option<&Path>) -> Result<()> {
        self.require("autorotate")?;
        self.apply_file_orientation(source)
    }

    fn encode(&self, format: ImageKind, quality: u8) -> Result<Vec<u8>> {
        let image = self.require("encode")?;
        let (width, height) = image.dimensions();
        let mut bytes = Vec::new();

        match format {
            ImageKind::Jpeg => {
                // JPEG carries no alpha
                let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
                JpegEncoder::new_with_quality(&mut bytes, quality)
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| ImageMillError::processing(format!("JPEG encode failed: {e}")))?;
            },
            ImageKind::Png => {
                PngEncoder::new(&mut bytes)
                    .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| ImageMillError::processing(format!("PNG encode failed: {e}")))?;
            },
            ImageKind::Gif => {
                DynamicImage::ImageRgba8(image.clone())
                    .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Gif)
                    .map_err(|e| ImageMillError::processing(format!("GIF encode failed: {e}")))?;
            },
        }

        Ok(bytes)
    }

    fn save(&self, path: &Path, format: ImageKind, quality: u8) -> Result<()> {
        let bytes = self.encode(format, quality)?;
        std::fs::write(path, bytes)
            .map_err(|e| ImageMillError::file_io_error("write image file", path, e))
    }
}
