//! Backend implementations for the image editing facade
//!
//! This module provides the two interchangeable backends:
//! - Raster backend (buffer-level operations, GD-style procedural calls)
//! - Toolkit backend (high-level `DynamicImage` object operations)
//!
//! Both satisfy one capability contract so the facade never branches per
//! operation.

use crate::error::Result;
use crate::format::ImageKind;
use image::DynamicImage;
use std::path::Path;

#[cfg(feature = "raster")]
pub mod raster;

#[cfg(feature = "toolkit")]
pub mod toolkit;

// Test utilities for facade testing
#[cfg(test)]
pub mod test_utils;

// Re-export backends based on enabled features
#[cfg(feature = "raster")]
pub use self::raster::RasterBackend;

#[cfg(feature = "toolkit")]
pub use self::toolkit::ToolkitBackend;

/// Backend selector, fixed at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Buffer-level backend (procedural pixel operations)
    #[default]
    Raster,
    /// High-level image toolkit backend
    Toolkit,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raster => write!(f, "raster"),
            Self::Toolkit => write!(f, "toolkit"),
        }
    }
}

/// Capability contract every backend must satisfy.
///
/// Each backend exclusively owns at most one decoded image at a time; a
/// mutating operation either edits it in place or replaces it, releasing
/// the previous buffer. Angle convention at this seam: positive degrees
/// rotate clockwise.
pub trait ImageBackend: Send {
    /// The selector this backend answers to
    fn kind(&self) -> BackendKind;

    /// Decode an image file into the backend-native representation
    ///
    /// # Errors
    /// - Decode failures (truncated or corrupt data)
    fn load(&mut self, path: &Path, format: ImageKind) -> Result<()>;

    /// Decode in-memory image data into the backend-native representation
    fn load_bytes(&mut self, bytes: &[u8], format: ImageKind) -> Result<()>;

    /// Release the decoded image, returning to the empty state
    fn release(&mut self);

    /// Whether a decoded image is present
    fn is_loaded(&self) -> bool;

    /// Current pixel dimensions
    ///
    /// # Errors
    /// - `NotLoaded` when no image is present
    fn dimensions(&self) -> Result<(u32, u32)>;

    /// A detached duplicate of the current pixel content
    fn snapshot(&self) -> Result<DynamicImage>;

    /// Scale the image. A zero target dimension means "unconstrained" in
    /// aspect-preserving mode; when `preserve_aspect` is false both targets
    /// must be positive for anything to happen.
    fn resize(
        &mut self,
        width: u32,
        height: u32,
        preserve_aspect: bool,
        allow_enlarge: bool,
    ) -> Result<()>;

    /// Extract a sub-rectangle, which replaces the current image.
    /// Out-of-bounds rectangles fail.
    fn crop(&mut self, width: u32, height: u32, left: u32, top: u32) -> Result<()>;

    /// Adjust brightness; `delta` is pre-clamped to [-255, 255]
    fn brightness(&mut self, delta: i32) -> Result<()>;

    /// Adjust contrast; `delta` is pre-clamped to [-100, 100]
    fn contrast(&mut self, delta: i32) -> Result<()>;

    /// Blend a fill color into every pixel; channels pre-clamped to [-255, 255]
    fn colorize(&mut self, red: i32, green: i32, blue: i32) -> Result<()>;

    /// Invert all color channels
    fn negative(&mut self) -> Result<()>;

    /// Desaturate to monochrome
    fn grayscale(&mut self) -> Result<()>;

    /// Apply a sepia tone
    fn sepia(&mut self) -> Result<()>;

    /// Left-right mirror
    fn flip_horizontal(&mut self) -> Result<()>;

    /// Top-bottom mirror
    fn flip_vertical(&mut self) -> Result<()>;

    /// Rotate by the given angle in degrees; positive rotates clockwise,
    /// exposed corners are filled with a transparent sentinel
    fn rotate(&mut self, angle: f32) -> Result<()>;

    /// Normalize orientation using embedded metadata, then reset the tag so
    /// a later save cannot re-apply it. `source` is the file the image was
    /// decoded from, when known.
    fn auto_orient(&mut self, source: Option<&Path>) -> Result<()>;

    /// Encode the current image; `quality` is pre-clamped to [0, 100] and
    /// applies to JPEG only
    fn encode(&self, format: ImageKind, quality: u8) -> Result<Vec<u8>>;

    /// Encode and write the current image to a file
    fn save(&self, path: &Path, format: ImageKind, quality: u8) -> Result<()>;
}

/// Factory trait for creating image backends
pub trait BackendFactory: Send + Sync {
    /// Create a backend instance of the given kind
    ///
    /// # Errors
    /// - `InvalidConfig` when the requested backend is not compiled in
    fn create_backend(&self, kind: BackendKind) -> Result<Box<dyn ImageBackend>>;

    /// List available backend kinds
    fn available_backends(&self) -> Vec<BackendKind>;
}

/// Default backend factory covering the built-in backends
pub struct DefaultBackendFactory;

impl BackendFactory for DefaultBackendFactory {
    fn create_backend(&self, kind: BackendKind) -> Result<Box<dyn ImageBackend>> {
        match kind {
            BackendKind::Raster => {
                #[cfg(feature = "raster")]
                let backend: Result<Box<dyn ImageBackend>> = Ok(Box::new(RasterBackend::new()));
                #[cfg(not(feature = "raster"))]
                let backend: Result<Box<dyn ImageBackend>> =
                    Err(crate::error::ImageMillError::invalid_config(
                        "raster backend not compiled in (enable the `raster` feature)",
                    ));
                backend
            },
            BackendKind::Toolkit => {
                #[cfg(feature = "toolkit")]
                let backend: Result<Box<dyn ImageBackend>> = Ok(Box::new(ToolkitBackend::new()));
                #[cfg(not(feature = "toolkit"))]
                let backend: Result<Box<dyn ImageBackend>> =
                    Err(crate::error::ImageMillError::invalid_config(
                        "toolkit backend not compiled in (enable the `toolkit` feature)",
                    ));
                backend
            },
        }
    }

    fn available_backends(&self) -> Vec<BackendKind> {
        let mut kinds = Vec::new();
        #[cfg(feature = "raster")]
        kinds.push(BackendKind::Raster);
        #[cfg(feature = "toolkit")]
        kinds.push(BackendKind::Toolkit);
        kinds
    }
}

/// Snap an angle to a right-angle rotation when it is one, normalizing to
/// [0, 360). Right angles route through the exact quarter-turn primitives
/// so dimensions swap precisely.
#[cfg(any(feature = "raster", feature = "toolkit"))]
pub(crate) fn right_angle(degrees: f32) -> Option<u16> {
    let norm = degrees.rem_euclid(360.0);
    for candidate in [0u16, 90, 180, 270] {
        if (norm - f32::from(candidate)).abs() < 1e-3 {
            return Some(candidate);
        }
    }
    // 360 - epsilon lands here too
    if (norm - 360.0).abs() < 1e-3 {
        return Some(0);
    }
    None
}

/// Rotate clockwise by an arbitrary (non-right) angle on an expanded canvas
/// so no pixel content is clipped; exposed corners stay transparent.
#[cfg(any(feature = "raster", feature = "toolkit"))]
pub(crate) fn rotate_expanded(image: &image::RgbaImage, degrees_clockwise: f32) -> image::RgbaImage {
    use image::{imageops, Rgba, RgbaImage};
    use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

    let (width, height) = image.dimensions();
    let theta = degrees_clockwise.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let new_width = (width as f32 * cos + height as f32 * sin).ceil() as u32;
    let new_height = (width as f32 * sin + height as f32 * cos).ceil() as u32;

    let mut canvas = RgbaImage::from_pixel(new_width, new_height, Rgba([0, 0, 0, 0]));
    imageops::overlay(
        &mut canvas,
        image,
        i64::from((new_width - width) / 2),
        i64::from((new_height - height) / 2),
    );

    rotate_about_center(&canvas, theta, Interpolation::Bilinear, Rgba([0, 0, 0, 0]))
}

/// Blend fixed channel offsets into every pixel, leaving alpha untouched.
#[cfg(any(feature = "raster", feature = "toolkit"))]
pub(crate) fn tint(image: &image::RgbaImage, red: i32, green: i32, blue: i32) -> image::RgbaImage {
    use image::Rgba;
    use imageproc::map::map_colors;

    map_colors(image, |pixel| {
        Rgba([
            (i32::from(pixel[0]) + red).clamp(0, 255) as u8,
            (i32::from(pixel[1]) + green).clamp(0, 255) as u8,
            (i32::from(pixel[2]) + blue).clamp(0, 255) as u8,
            pixel[3],
        ])
    })
}
