//! Detected source format handling
//!
//! The editor accepts exactly three raster formats. Detection is
//! content-based (magic bytes), never extension-based, so a mislabelled
//! file is classified by what it actually contains.

use crate::error::{ImageMillError, Result};
use image::{ImageFormat, ImageReader};
use std::path::Path;

/// Source image format supported by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// JPEG (lossy, quality parameter applies)
    Jpeg,
    /// PNG (lossless, alpha channel)
    Png,
    /// GIF (palette-based, alpha channel)
    Gif,
}

impl ImageKind {
    /// Map from the codec-level format, rejecting everything outside the
    /// supported set.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }

    /// Map from a file extension (used by the bulk helpers, which write to
    /// whatever path they are given).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detect the format of a file from its content.
    ///
    /// # Errors
    /// - `UnsupportedFormat` for unrecognized or out-of-set image data
    ///   (including empty files)
    /// - `Io` when the file cannot be read
    pub fn detect_path(path: &Path) -> Result<Self> {
        let reader = ImageReader::open(path)
            .map_err(|e| ImageMillError::file_io_error("open image file", path, e))?
            .with_guessed_format()
            .map_err(|e| ImageMillError::file_io_error("probe image file", path, e))?;

        match reader.format() {
            Some(format) => Self::from_image_format(format).ok_or_else(|| {
                ImageMillError::unsupported_format(format!(
                    "{format:?} (only jpg/png/gif)"
                ))
            }),
            None => Err(ImageMillError::unsupported_format(
                "unrecognized image data (only jpg/png/gif)",
            )),
        }
    }

    /// Detect the format of in-memory image data from its magic bytes.
    pub fn detect_bytes(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes).map_err(|_| {
            ImageMillError::unsupported_format("unrecognized image data (only jpg/png/gif)")
        })?;
        Self::from_image_format(format).ok_or_else(|| {
            ImageMillError::unsupported_format(format!("{format:?} (only jpg/png/gif)"))
        })
    }

    /// The codec-level format for this kind
    pub fn to_image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
        }
    }

    /// Canonical file extension (without the dot)
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    /// MIME content type emitted alongside encoded bytes
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    /// Whether the format carries an alpha channel
    pub fn supports_transparency(self) -> bool {
        match self {
            Self::Png | Self::Gif => true,
            Self::Jpeg => false,
        }
    }

    /// Whether the encode quality parameter has any effect
    pub fn quality_applies(self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "jpeg"),
            Self::Png => write!(f, "png"),
            Self::Gif => write!(f, "gif"),
        }
    }
}
