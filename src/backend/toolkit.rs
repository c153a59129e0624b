//! High-level toolkit backend
//!
//! Wraps a `DynamicImage` and drives it through its own method surface: a
//! generic guessed-format read, aspect-aware `resize`/`resize_exact`, and
//! clockwise-native rotation. The EXIF orientation tag is captured once at
//! load time and kept as backend state, so `auto_orient` never has to go
//! back to the source file.

use super::{right_angle, rotate_expanded, tint, BackendKind, ImageBackend};
use crate::error::{ImageMillError, Result};
use crate::format::ImageKind;
use crate::orientation::Orientation;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::path::Path;

/// Toolkit backend owning a `DynamicImage` plus its orientation tag
pub struct ToolkitBackend {
    image: Option<DynamicImage>,
    orientation: Orientation,
}

impl ToolkitBackend {
    pub fn new() -> Self {
        Self {
            image: None,
            orientation: Orientation::TopLeft,
        }
    }

    fn require(&self, operation: &str) -> Result<&DynamicImage> {
        self.image
            .as_ref()
            .ok_or_else(|| ImageMillError::not_loaded(operation))
    }
}

impl Default for ToolkitBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for ToolkitBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Toolkit
    }

    fn load(&mut self, path: &Path, _format: ImageKind) -> Result<()> {
        // generic read, format re-derived from content
        let decoded = ImageReader::open(path)
            .map_err(|e| ImageMillError::file_io_error("open image file", path, e))?
            .with_guessed_format()
            .map_err(|e| ImageMillError::file_io_error("probe image file", path, e))?
            .decode()
            .map_err(|e| ImageMillError::processing(format!("failed to read image: {e}")))?;

        #[cfg(feature = "exif")]
        {
            self.orientation = crate::orientation::read_from_path(path)
                .ok()
                .flatten()
                .unwrap_or_default();
        }
        #[cfg(not(feature = "exif"))]
        {
            self.orientation = Orientation::TopLeft;
        }

        self.image = Some(decoded);
        Ok(())
    }

    fn load_bytes(&mut self, bytes: &[u8], _format: ImageKind) -> Result<()> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ImageMillError::processing(format!("failed to read image: {e}")))?;

        #[cfg(feature = "exif")]
        {
            self.orientation = crate::orientation::read_from_bytes(bytes).unwrap_or_default();
        }
        #[cfg(not(feature = "exif"))]
        {
            self.orientation = Orientation::TopLeft;
        }

        self.image = Some(decoded);
        Ok(())
    }

    fn release(&mut self) {
        self.image = None;
        self.orientation = Orientation::TopLeft;
    }

    fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    fn dimensions(&self) -> Result<(u32, u32)> {
        let image = self.require("dimensions")?;
        Ok((image.width(), image.height()))
    }

    fn snapshot(&self) -> Result<DynamicImage> {
        let image = self.require("snapshot")?;
        Ok(image.clone())
    }

    fn resize(
        &mut self,
        width: u32,
        height: u32,
        preserve_aspect: bool,
        allow_enlarge: bool,
    ) -> Result<()> {
        let image = self.require("resize")?;
        let (current_width, current_height) = (image.width(), image.height());

        let resized = if preserve_aspect {
            // zero means unconstrained on that axis
            let target_width = if width > 0 { width } else { current_width };
            let target_height = if height > 0 { height } else { current_height };
            if !allow_enlarge && target_width >= current_width && target_height >= current_height {
                return Ok(());
            }
            image.resize(target_width, target_height, FilterType::Lanczos3)
        } else {
            if width == 0 || height == 0 {
                return Ok(());
            }
            image.resize_exact(width, height, FilterType::Lanczos3)
        };

        self.image = Some(resized);
        Ok(())
    }

    fn crop(&mut self, width: u32, height: u32, left: u32, top: u32) -> Result<()> {
        let image = self.require("crop")?;
        let (current_width, current_height) = (image.width(), image.height());

        let out_of_bounds = width == 0
            || height == 0
            || left.checked_add(width).map_or(true, |edge| edge > current_width)
            || top.checked_add(height).map_or(true, |edge| edge > current_height);
        if out_of_bounds {
            return Err(ImageMillError::processing(format!(
                "crop rectangle {width}x{height}+{left}+{top} exceeds image bounds {current_width}x{current_height}"
            )));
        }

        self.image = Some(image.crop_imm(left, top, width, height));
        Ok(())
    }

    fn brightness(&mut self, delta: i32) -> Result<()> {
        let image = self.require("brightness")?;
        self.image = Some(image.brighten(delta));
        Ok(())
    }

    fn contrast(&mut self, delta: i32) -> Result<()> {
        let image = self.require("contrast")?;
        self.image = Some(image.adjust_contrast(delta as f32));
        Ok(())
    }

    fn colorize(&mut self, red: i32, green: i32, blue: i32) -> Result<()> {
        let image = self.require("colorize")?;
        let tinted = tint(&image.to_rgba8(), red, green, blue);
        self.image = Some(DynamicImage::ImageRgba8(tinted));
        Ok(())
    }

    fn negative(&mut self) -> Result<()> {
        let image = self
            .image
            .as_mut()
            .ok_or_else(|| ImageMillError::not_loaded("negative"))?;
        image.invert();
        Ok(())
    }

    fn grayscale(&mut self) -> Result<()> {
        let image = self.require("grayscale")?;
        self.image = Some(image.grayscale());
        Ok(())
    }

    fn sepia(&mut self) -> Result<()> {
        self.grayscale()?;
        self.colorize(90, 60, 40)
    }

    fn flip_horizontal(&mut self) -> Result<()> {
        let image = self.require("flip_horizontal")?;
        self.image = Some(image.fliph());
        Ok(())
    }

    fn flip_vertical(&mut self) -> Result<()> {
        let image = self.require("flip_vertical")?;
        self.image = Some(image.flipv());
        Ok(())
    }

    fn rotate(&mut self, angle: f32) -> Result<()> {
        let image = self.require("rotate")?;
        // clockwise-native
        let rotated = match right_angle(angle) {
            Some(0) => return Ok(()),
            Some(90) => image.rotate90(),
            Some(180) => image.rotate180(),
            Some(270) => image.rotate270(),
            _ => DynamicImage::ImageRgba8(rotate_expanded(
                &image.to_rgba8(),
                angle.rem_euclid(360.0),
            )),
        };
        self.image = Some(rotated);
        Ok(())
    }

    fn auto_orient(&mut self, _source: Option<&Path>) -> Result<()> {
        self.require("autorotate")?;

        let orientation = self.orientation;
        if orientation.is_upright() {
            return Ok(());
        }

        let (degrees, mirror) = orientation.transforms();
        if degrees != 0 {
            self.rotate(f32::from(degrees))?;
        }
        if mirror {
            self.flip_horizontal()?;
        }

        // normalized now; a later save must not re-apply the tag
        self.orientation = Orientation::TopLeft;
        Ok(())
    }

    fn encode(&self, format: ImageKind, quality: u8) -> Result<Vec<u8>> {
        let image = self.require("encode")?;
        let mut bytes = Vec::new();

        match format {
            ImageKind::Jpeg => {
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut bytes, quality)
                    .write_image(
                        rgb.as_raw(),
                        rgb.width(),
                        rgb.height(),
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| ImageMillError::processing(format!("JPEG encode failed: {e}")))?;
            },
            ImageKind::Png => {
                image
                    .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
                    .map_err(|e| ImageMillError::processing(format!("PNG encode failed: {e}")))?;
            },
            ImageKind::Gif => {
                image
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
