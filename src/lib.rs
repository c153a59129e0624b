#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Imagemill
//!
//! A unified facade for loading, transforming and persisting raster images
//! (JPEG/PNG/GIF) over two interchangeable backends, plus free-function
//! wrappers around two external command-line resizers.
//!
//! The facade holds one decoded image through a backend chosen at
//! construction time and exposes a fluent set of mutating operations
//! (resize, crop, rotate, brightness/contrast/colorize, grayscale, sepia,
//! negative, mirror/flip, EXIF autorotate), each delegated to the backend
//! with parameter clamping and dimension caching handled in one place.
//!
//! ## Features
//!
//! - **Two Backends**: buffer-level raster operations and a high-level
//!   image toolkit, behind one capability contract
//! - **Format Support**: JPEG, PNG, GIF with content-based detection
//! - **EXIF Orientation**: autorotate from embedded metadata (feature `exif`)
//! - **Bulk Helpers**: in-process batch resize plus `convert`/`epeg`
//!   process wrappers with bounded timeouts
//! - **CLI Integration**: optional command-line interface (feature `cli`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imagemill::{BackendKind, ImageEditor};
//!
//! # fn example() -> imagemill::Result<()> {
//! let mut editor = ImageEditor::open(BackendKind::Raster, "photo.jpg")?;
//! editor
//!     .autorotate()?
//!     .resize(1024, 0, true, false)?
//!     .grayscale()?
//!     .save("photo_small.jpg", 85)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Backend Selection
//!
//! ```rust,no_run
//! use imagemill::{BackendKind, ImageEditor};
//!
//! // Buffer-level backend (default)
//! let raster = ImageEditor::new(BackendKind::Raster);
//!
//! // High-level toolkit backend
//! let toolkit = ImageEditor::new(BackendKind::Toolkit);
//! ```
//!
//! ## Concurrency
//!
//! Fully synchronous: each editor exclusively owns one decoded image and
//! must not be shared across threads without external serialization.
//! Independent editors are fully independent.

pub mod backend;
pub mod bulk;
#[cfg(feature = "cli")]
pub mod cli;
pub mod editor;
pub mod error;
pub mod format;
pub mod orientation;
#[cfg(feature = "cli")]
pub mod tracing_config;

// Public API exports
pub use backend::{BackendFactory, BackendKind, DefaultBackendFactory, ImageBackend};
pub use bulk::{
    epeg_resize, magick_thumbnail, resize_file, EpegOptions, ResizeFileOptions, ThumbnailOptions,
};
pub use editor::{EncodedImage, ImageEditor};
pub use error::{ImageMillError, Result};
pub use format::ImageKind;
pub use orientation::Orientation;

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

use std::path::Path;

/// Open an image file with the given backend.
///
/// Convenience wrapper over [`ImageEditor::open`].
///
/// # Errors
/// - `InputNotFound` when the path does not exist
/// - `UnsupportedFormat` for anything other than JPEG/PNG/GIF
pub fn open<P: AsRef<Path>>(backend: BackendKind, path: P) -> Result<ImageEditor> {
    ImageEditor::open(backend, path)
}

/// Build an editor from in-memory image bytes with the given backend.
///
/// Suitable for web servers and memory-based processing where no file is
/// available.
///
/// # Errors
/// - `UnsupportedFormat` for unrecognized or out-of-set image data
pub fn open_bytes(backend: BackendKind, bytes: &[u8]) -> Result<ImageEditor> {
    let mut editor = ImageEditor::new(backend)?;
    editor.load_bytes(bytes)?;
    Ok(editor)
}
