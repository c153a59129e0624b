//! Test utilities for backend and facade testing

use super::{BackendFactory, BackendKind, ImageBackend};
use crate::error::{ImageMillError, Result};
use crate::format::ImageKind;
use image::DynamicImage;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Operation recorded by [`MockBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    Load,
    LoadBytes,
    Release,
    Resize {
        width: u32,
        height: u32,
        preserve_aspect: bool,
        allow_enlarge: bool,
    },
    Crop {
        width: u32,
        height: u32,
        left: u32,
        top: u32,
    },
    Brightness(i32),
    Contrast(i32),
    Colorize(i32, i32, i32),
    Negative,
    Grayscale,
    Sepia,
    FlipHorizontal,
    FlipVertical,
    Rotate(f32),
    AutoOrient,
    Encode { format: ImageKind, quality: u8 },
    Save { format: ImageKind, quality: u8 },
}

/// Mock backend that records operations without touching any codec.
///
/// Dimensions start from a preset value on load and follow resize/crop/
/// rotate requests so facade-side dimension caching can be asserted.
pub struct MockBackend {
    kind: BackendKind,
    loaded: bool,
    width: u32,
    height: u32,
    initial: (u32, u32),
    operations: Arc<Mutex<Vec<RecordedOp>>>,
}

impl MockBackend {
    pub fn new(initial: (u32, u32)) -> Self {
        Self {
            kind: BackendKind::Raster,
            loaded: false,
            width: 0,
            height: 0,
            initial,
            operations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn operations_handle(&self) -> Arc<Mutex<Vec<RecordedOp>>> {
        Arc::clone(&self.operations)
    }

    fn record(&self, op: RecordedOp) {
        self.operations.lock().unwrap().push(op);
    }

    fn check_loaded(&self, operation: &str) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(ImageMillError::not_loaded(operation))
        }
    }
}

impl ImageBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn load(&mut self, _path: &Path, _format: ImageKind) -> Result<()> {
        self.record(RecordedOp::Load);
        self.loaded = true;
        (self.width, self.height) = self.initial;
        Ok(())
    }

    fn load_bytes(&mut self, _bytes: &[u8], _format: ImageKind) -> Result<()> {
        self.record(RecordedOp::LoadBytes);
        self.loaded = true;
        (self.width, self.height) = self.initial;
        Ok(())
    }

    fn release(&mut self) {
        self.record(RecordedOp::Release);
        self.loaded = false;
        self.width = 0;
        self.height = 0;
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn dimensions(&self) -> Result<(u32, u32)> {
        self.check_loaded("dimensions")?;
        Ok((self.width, self.height))
    }

    fn snapshot(&self) -> Result<DynamicImage> {
        self.check_loaded("snapshot")?;
        Ok(DynamicImage::new_rgba8(self.width, self.height))
    }

    fn resize(
        &mut self,
        width: u32,
        height: u32,
        preserve_aspect: bool,
        allow_enlarge: bool,
    ) -> Result<()> {
        self.check_loaded("resize")?;
        self.record(RecordedOp::Resize {
            width,
            height,
            preserve_aspect,
            allow_enlarge,
        });
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
        }
        Ok(())
    }

    fn crop(&mut self, width: u32, height: u32, left: u32, top: u32) -> Result<()> {
        self.check_loaded("crop")?;
        self.record(RecordedOp::Crop {
            width,
            height,
            left,
            top,
        });
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn brightness(&mut self, delta: i32) -> Result<()> {
        self.check_loaded("brightness")?;
        self.record(RecordedOp::Brightness(delta));
        Ok(())
    }

    fn contrast(&mut self, delta: i32) -> Result<()> {
        self.check_loaded("contrast")?;
        self.record(RecordedOp::Contrast(delta));
        Ok(())
    }

    fn colorize(&mut self, red: i32, green: i32, blue: i32) -> Result<()> {
        self.check_loaded("colorize")?;
        self.record(RecordedOp::Colorize(red, green, blue));
        Ok(())
    }

    fn negative(&mut self) -> Result<()> {
        self.check_loaded("negative")?;
        self.record(RecordedOp::Negative);
        Ok(())
    }

    fn grayscale(&mut self) -> Result<()> {
        self.check_loaded("grayscale")?;
        self.record(RecordedOp::Grayscale);
        Ok(())
    }

    fn sepia(&mut self) -> Result<()> {
        self.check_loaded("sepia")?;
        self.record(RecordedOp::Sepia);
        Ok(())
    }

    fn flip_horizontal(&mut self) -> Result<()> {
        self.check_loaded("flip_horizontal")?;
        self.record(RecordedOp::FlipHorizontal);
        Ok(())
    }

    fn flip_vertical(&mut self) -> Result<()> {
        self.check_loaded("flip_vertical")?;
        self.record(RecordedOp::FlipVertical);
        Ok(())
    }

    fn rotate(&mut self, angle: f32) -> Result<()> {
        self.check_loaded("rotate")?;
        self.record(RecordedOp::Rotate(angle));
        std::mem::swap(&mut self.width, &mut self.height);
        Ok(())
    }

    fn auto_orient(&mut self, _source: Option<&Path>) -> Result<()> {
        self.check_loaded("autorotate")?;
        self.record(RecordedOp::AutoOrient);
        Ok(())
    }

    fn encode(&self, format: ImageKind, quality: u8) -> Result<Vec<u8>> {
        self.check_loaded("encode")?;
        self.record(RecordedOp::Encode { format, quality });
        Ok(vec![0u8; 4])
    }

    fn save(&self, _path: &Path, format: ImageKind, quality: u8) -> Result<()> {
        self.check_loaded("save")?;
        self.record(RecordedOp::Save { format, quality });
        Ok(())
    }
}

/// Factory handing out a single pre-built mock backend
pub struct MockBackendFactory {
    initial: (u32, u32),
    operations: Arc<Mutex<Vec<RecordedOp>>>,
}

impl MockBackendFactory {
    pub fn new(initial: (u32, u32)) -> Self {
        Self {
            initial,
            operations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn operations(&self) -> Arc<Mutex<Vec<RecordedOp>>> {
        Arc::clone(&self.operations)
    }
}

impl BackendFactory for MockBackendFactory {
    fn create_backend(&self, kind: BackendKind) -> Result<Box<dyn ImageBackend>> {
        let mut backend = MockBackend::new(self.initial);
        backend.kind = kind;
        backend.operations = Arc::clone(&self.operations);
        Ok(Box::new(backend))
    }

    fn available_backends(&self) -> Vec<BackendKind> {
        vec![BackendKind::Raster, BackendKind::Toolkit]
    }
}
