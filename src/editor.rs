//! Unified image editing facade
//!
//! This module provides the main [`ImageEditor`] that owns one decoded
//! image through a backend chosen at construction time and exposes the
//! fluent set of mutating operations. Parameter clamping and dimension
//! caching live here; pixel work is delegated to the backend.

use crate::backend::{BackendFactory, BackendKind, DefaultBackendFactory, ImageBackend};
use crate::error::{ImageMillError, Result};
use crate::format::ImageKind;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Encoded image bytes tagged with their MIME content type.
///
/// Produced by [`ImageEditor::display`]; actual transport (HTTP headers,
/// sockets) is the caller's concern.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// MIME type matching the encoded format (`image/jpeg`, `image/png`,
    /// `image/gif`)
    pub content_type: &'static str,
    /// The encoded byte stream
    pub bytes: Vec<u8>,
}

/// Image editing facade over one backend-owned decoded image.
///
/// Dimension policy: width/height are cached here and refreshed from the
/// backend after every mutating operation, for both backends alike;
/// accessors read the cache.
///
/// Error policy: a failed mutating operation may leave the handle in an
/// indeterminate state. Treat any reported failure as requiring
/// [`reset`](Self::reset) and a fresh load rather than continued use.
pub struct ImageEditor {
    factory: Box<dyn BackendFactory>,
    backend: Box<dyn ImageBackend>,
    source_path: Option<PathBuf>,
    width: u32,
    height: u32,
    format: Option<ImageKind>,
}

impl ImageEditor {
    /// Create an empty editor using the default backend factory.
    ///
    /// # Errors
    /// - `InvalidConfig` when the requested backend is not compiled in
    pub fn new(kind: BackendKind) -> Result<Self> {
        Self::with_factory(kind, Box::new(DefaultBackendFactory))
    }

    /// Create an empty editor with a custom backend factory.
    pub fn with_factory(kind: BackendKind, factory: Box<dyn BackendFactory>) -> Result<Self> {
        let backend = factory.create_backend(kind)?;
        Ok(Self {
            factory,
            backend,
            source_path: None,
            width: 0,
            height: 0,
            format: None,
        })
    }

    /// Create an editor and immediately load an image from a file.
    ///
    /// # Errors
    /// - `InputNotFound` when the path does not exist
    /// - `UnsupportedFormat` for anything other than JPEG/PNG/GIF
    pub fn open<P: AsRef<Path>>(kind: BackendKind, path: P) -> Result<Self> {
        let mut editor = Self::new(kind)?;
        editor.load(path)?;
        Ok(editor)
    }

    /// Load an image from a file, replacing any current content.
    ///
    /// The format is detected from content (never from the extension) and
    /// must be JPEG, PNG or GIF.
    #[instrument(skip(self, path), fields(backend = %self.backend.kind()))]
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImageMillError::input_not_found(path));
        }

        let kind = ImageKind::detect_path(path)?;
        self.backend.load(path, kind)?;
        self.format = Some(kind);
        self.source_path = Some(path.to_path_buf());
        self.sync_dimensions()?;

        // a decode that reports no pixels is a load failure
        if self.width == 0 || self.height == 0 {
            return Err(ImageMillError::processing(
                "image reports zero width or height",
            ));
        }

        debug!(
            format = %kind,
            width = self.width,
            height = self.height,
            "image loaded"
        );
        Ok(self)
    }

    /// Load an image from in-memory bytes, replacing any current content.
    ///
    /// The handle has no source path afterwards, so raster-backend
    /// `autorotate` is unavailable until a file-based load.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        let kind = ImageKind::detect_bytes(bytes)?;
        self.backend.load_bytes(bytes, kind)?;
        self.format = Some(kind);
        self.source_path = None;
        self.sync_dimensions()?;

        if self.width == 0 || self.height == 0 {
            return Err(ImageMillError::processing(
                "image reports zero width or height",
            ));
        }
        Ok(self)
    }

    /// Release the backend resource and return to the empty state,
    /// restoring the default backend kind. Always succeeds.
    pub fn reset(&mut self) {
        self.backend.release();
        if self.backend.kind() != BackendKind::default() {
            if let Ok(backend) = self.factory.create_backend(BackendKind::default()) {
                self.backend = backend;
            }
        }
        self.source_path = None;
        self.width = 0;
        self.height = 0;
        self.format = None;
    }

    /// Whether a decoded image is present
    pub fn is_loaded(&self) -> bool {
        self.backend.is_loaded()
    }

    /// The backend selector chosen at construction (available even when
    /// nothing is loaded)
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Backend kinds the underlying factory can produce
    pub fn available_backends(&self) -> Vec<BackendKind> {
        self.factory.available_backends()
    }

    /// Current image width in pixels
    pub fn width(&self) -> Result<u32> {
        self.require_loaded("width")?;
        Ok(self.width)
    }

    /// Current image height in pixels
    pub fn height(&self) -> Result<u32> {
        self.require_loaded("height")?;
        Ok(self.height)
    }

    /// Detected source format
    pub fn format(&self) -> Result<ImageKind> {
        self.format.ok_or_else(|| ImageMillError::not_loaded("format"))
    }

    /// Canonical output extension for the detected format
    pub fn extension(&self) -> Result<&'static str> {
        Ok(self.format()?.extension())
    }

    /// Path the image was loaded from (or last saved to)
    pub fn source_path(&self) -> Result<&Path> {
        self.require_loaded("source_path")?;
        self.source_path
            .as_deref()
            .ok_or_else(|| ImageMillError::not_loaded("source_path"))
    }

    /// A detached duplicate of the current pixel content at current
    /// dimensions. Does not mutate the handle.
    pub fn copy(&self) -> Result<DynamicImage> {
        self.backend.snapshot()
    }

    /// Scale the image.
    ///
    /// With `preserve_aspect`, a single deterministic pass applies: the
    /// width-driven branch (deriving height from the original ratio) when
    /// `width > 0` and shrinking (or `allow_enlarge`), otherwise the
    /// height-driven branch under the symmetric condition. Without
    /// `preserve_aspect` the output is exactly `width x height` when both
    /// are positive.
    #[instrument(skip(self), fields(backend = %self.backend.kind()))]
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        preserve_aspect: bool,
        allow_enlarge: bool,
    ) -> Result<&mut Self> {
        self.require_loaded("resize")?;
        self.backend
            .resize(width, height, preserve_aspect, allow_enlarge)?;
        self.sync_dimensions()?;
        Ok(self)
    }

    /// Extract a sub-rectangle with its top-left corner at `(left, top)`.
    /// Out-of-bounds rectangles fail; transparency is preserved for
    /// formats that carry it.
    pub fn crop(&mut self, width: u32, height: u32, left: u32, top: u32) -> Result<&mut Self> {
        self.require_loaded("crop")?;
        self.backend.crop(width, height, left, top)?;
        self.sync_dimensions()?;
        Ok(self)
    }

    /// Change brightness. `delta` is clamped to [-255, 255], never rejected.
    pub fn brightness(&mut self, delta: i32) -> Result<&mut Self> {
        self.require_loaded("brightness")?;
        self.backend.brightness(delta.clamp(-255, 255))?;
        Ok(self)
    }

    /// Change contrast. `delta` is clamped to [-100, 100], never rejected.
    pub fn contrast(&mut self, delta: i32) -> Result<&mut Self> {
        self.require_loaded("contrast")?;
        self.backend.contrast(delta.clamp(-100, 100))?;
        Ok(self)
    }

    /// Blend a fill color with the image. Each channel is clamped to
    /// [-255, 255], never rejected.
    pub fn colorize(&mut self, red: i32, green: i32, blue: i32) -> Result<&mut Self> {
        self.require_loaded("colorize")?;
        self.backend.colorize(
            red.clamp(-255, 255),
            green.clamp(-255, 255),
            blue.clamp(-255, 255),
        )?;
        Ok(self)
    }

    /// Invert all channel values
    pub fn negative(&mut self) -> Result<&mut Self> {
        self.require_loaded("negative")?;
        self.backend.negative()?;
        Ok(self)
    }

    /// Desaturate to monochrome
    pub fn grayscale(&mut self) -> Result<&mut Self> {
        self.require_loaded("grayscale")?;
        self.backend.grayscale()?;
        Ok(self)
    }

    /// Apply a sepia tone
    pub fn sepia(&mut self) -> Result<&mut Self> {
        self.require_loaded("sepia")?;
        self.backend.sepia()?;
        Ok(self)
    }

    /// Create a horizontal (left-right) mirror image
    pub fn mirror(&mut self) -> Result<&mut Self> {
        self.require_loaded("mirror")?;
        self.backend.flip_horizontal()?;
        Ok(self)
    }

    /// Create a horizontal mirror image (alias of [`mirror`](Self::mirror))
    pub fn flop(&mut self) -> Result<&mut Self> {
        self.require_loaded("flop")?;
        self.backend.flip_horizontal()?;
        Ok(self)
    }

    /// Create a vertical (top-bottom) mirror image
    pub fn flip(&mut self) -> Result<&mut Self> {
        self.require_loaded("flip")?;
        self.backend.flip_vertical()?;
        Ok(self)
    }

    /// Rotate by the given angle in degrees; positive rotates clockwise.
    /// Exposed corners are filled transparently and cached dimensions are
    /// recomputed (width/height may swap).
    #[instrument(skip(self), fields(backend = %self.backend.kind()))]
    pub fn rotate(&mut self, angle: f32) -> Result<&mut Self> {
        self.require_loaded("rotate")?;
        self.backend.rotate(angle)?;
        self.sync_dimensions()?;
        Ok(self)
    }

    /// Normalize orientation from embedded metadata, then clear the tag so
    /// a later save does not re-apply it. A no-op when no orientation
    /// metadata exists.
    pub fn autorotate(&mut self) -> Result<&mut Self> {
        self.require_loaded("autorotate")?;
        let source = self.source_path.clone();
        self.backend.auto_orient(source.as_deref())?;
        self.sync_dimensions()?;
        Ok(self)
    }

    /// Encode the image and tag it with its MIME content type.
    ///
    /// `quality` is clamped to [0, 100] and applies to JPEG only.
    pub fn display(&self, quality: i32) -> Result<EncodedImage> {
        let kind = self
            .format
            .ok_or_else(|| ImageMillError::not_loaded("display"))?;
        let bytes = self.backend.encode(kind, clamp_quality(quality))?;
        Ok(EncodedImage {
            content_type: kind.content_type(),
            bytes,
        })
    }

    /// Encode and write the image to `path`, keeping the currently
    /// detected format regardless of the target extension.
    ///
    /// `quality` is clamped to [0, 100] and applies to JPEG only. The
    /// cached source path is updated on success.
    #[instrument(skip(self, path), fields(backend = %self.backend.kind()))]
    pub fn save<P: AsRef<Path>>(&mut self, path: P, quality: i32) -> Result<&mut Self> {
        let path = path.as_ref();
        let kind = self
            .format
            .ok_or_else(|| ImageMillError::not_loaded("save"))?;
        self.backend.save(path, kind, clamp_quality(quality))?;
        self.source_path = Some(path.to_path_buf());
        debug!(path = %path.display(), format = %kind, "image saved");
        Ok(self)
    }

    fn require_loaded(&self, operation: &str) -> Result<()> {
        if self.backend.is_loaded() {
            Ok(())
        } else {
            Err(ImageMillError::not_loaded(operation))
        }
    }

    fn sync_dimensions(&mut self) -> Result<()> {
        let (width, height) = self.backend.dimensions()?;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

fn clamp_quality(quality: i32) -> u8 {
    quality.clamp(0, 100) as u8
}
