//! EXIF orientation metadata
//!
//! EXIF orientation values:
//! 1 = Normal, 2 = Mirrored, 3 = 180°, 4 = 180° + mirrored,
//! 5 = 90° CW + mirrored, 6 = 90° CW, 7 = 270° CW + mirrored, 8 = 270° CW

#[cfg(feature = "exif")]
use crate::error::{ImageMillError, Result};
#[cfg(feature = "exif")]
use std::path::Path;

/// Orientation tag describing the rotation/mirroring needed to display an
/// image upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Already upright, no transform required
    #[default]
    TopLeft,
    /// Mirrored horizontally
    TopRight,
    /// Rotated 180 degrees
    BottomRight,
    /// Rotated 180 degrees and mirrored
    BottomLeft,
    /// Rotated 90 degrees clockwise and mirrored
    LeftTop,
    /// Rotated 90 degrees clockwise
    RightTop,
    /// Rotated 270 degrees clockwise and mirrored
    RightBottom,
    /// Rotated 270 degrees clockwise
    LeftBottom,
}

impl Orientation {
    /// Map a raw EXIF orientation value (1-8) to its variant.
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::TopLeft),
            2 => Some(Self::TopRight),
            3 => Some(Self::BottomRight),
            4 => Some(Self::BottomLeft),
            5 => Some(Self::LeftTop),
            6 => Some(Self::RightTop),
            7 => Some(Self::RightBottom),
            8 => Some(Self::LeftBottom),
            _ => None,
        }
    }

    /// Whether the image is already displayed upright.
    pub fn is_upright(self) -> bool {
        self == Self::TopLeft
    }

    /// The correcting transform: clockwise rotation in degrees, applied
    /// first, then an optional horizontal mirror.
    pub fn transforms(self) -> (u16, bool) {
        match self {
            Self::TopLeft => (0, false),
            Self::TopRight => (0, true),
            Self::BottomRight => (180, false),
            Self::BottomLeft => (180, true),
            Self::LeftTop => (90, true),
            Self::RightTop => (90, false),
            Self::RightBottom => (270, true),
            Self::LeftBottom => (270, false),
        }
    }
}

/// Read the EXIF orientation tag from a file.
///
/// Returns `Ok(None)` when the file carries no EXIF block or no
/// orientation tag.
#[cfg(feature = "exif")]
pub fn read_from_path(path: &Path) -> Result<Option<Orientation>> {
    let file = std::fs::File::open(path)
        .map_err(|e| ImageMillError::file_io_error("read orientation metadata from", path, e))?;
    let mut reader = std::io::BufReader::new(file);

    let parsed = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(parsed) => parsed,
        // no EXIF block at all is the common case for PNG/GIF
        Err(_) => return Ok(None),
    };

    Ok(orientation_field(&parsed))
}

/// Read the EXIF orientation tag from in-memory image data.
#[cfg(feature = "exif")]
pub fn read_from_bytes(bytes: &[u8]) -> Option<Orientation> {
    let mut cursor = std::io::Cursor::new(bytes);
    let parsed = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    orientation_field(&parsed)
}

#[cfg(feature = "exif")]
fn orientation_field(parsed: &exif::Exif) -> Option<Orientation> {
    parsed
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .and_then(Orientation::from_exif)
}
