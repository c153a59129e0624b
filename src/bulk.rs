//! Bulk resize helpers
//!
//! Free functions operating purely on file paths, with no editor handle:
//! an in-process resize pipeline plus wrappers around two external
//! command-line tools (`convert` from ImageMagick and the lightweight
//! `epeg` JPEG resizer). The tool wrappers block for the duration of the
//! external process, bounded by a configurable timeout.

use crate::error::{ImageMillError, Result};
use crate::format::ImageKind;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default timeout applied to external tool invocations
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for the in-process [`resize_file`] helper
#[derive(Debug, Clone)]
pub struct ResizeFileOptions {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Encode quality [0, 100], JPEG output only
    pub quality: u8,
    /// Fit within the target box keeping the aspect ratio; exact target
    /// dimensions otherwise
    pub preserve_aspect: bool,
    /// Resample filter for the final pass
    pub filter: FilterType,
}

impl ResizeFileOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            quality: 100,
            preserve_aspect: true,
            filter: FilterType::Lanczos3,
        }
    }
}

/// Resize a file on disk in one pass, without constructing an editor.
///
/// For JPEG outputs the decode is followed by a fast approximate pre-shrink
/// to twice the target box before the quality resample runs. The factor of
/// two trades decode-scale speed against resample quality.
///
/// # Errors
/// - `InputNotFound` when the input path does not exist
/// - `UnsupportedFormat` when the output extension is not jpg/png/gif
/// - `Processing` on any codec failure
pub fn resize_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ResizeFileOptions,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(ImageMillError::input_not_found(input));
    }

    let output_kind = output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageKind::from_extension)
        .ok_or_else(|| {
            ImageMillError::unsupported_format(format!(
                "output extension of '{}' (only jpg/png/gif)",
                output.display()
            ))
        })?;

    let mut image = ImageReader::open(input)
        .map_err(|e| ImageMillError::file_io_error("open image file", input, e))?
        .with_guessed_format()
        .map_err(|e| ImageMillError::file_io_error("probe image file", input, e))?
        .decode()
        .map_err(|e| ImageMillError::processing(format!("failed to read image: {e}")))?;

    if output_kind == ImageKind::Jpeg {
        let hint_width = options.width.saturating_mul(2);
        let hint_height = options.height.saturating_mul(2);
        if hint_width > 0
            && hint_height > 0
            && image.width() > hint_width
            && image.height() > hint_height
        {
            debug!(hint_width, hint_height, "pre-shrinking before quality resample");
            image = image.thumbnail(hint_width, hint_height);
        }
    }

    let resized = if options.preserve_aspect {
        image.resize(options.width, options.height, options.filter)
    } else {
        image.resize_exact(options.width, options.height, options.filter)
    };

    match output_kind {
        ImageKind::Jpeg => {
            let rgb = resized.to_rgb8();
            let file = std::fs::File::create(output)
                .map_err(|e| ImageMillError::file_io_error("create output file", output, e))?;
            let writer = std::io::BufWriter::new(file);
            JpegEncoder::new_with_quality(writer, options.quality)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| ImageMillError::processing(format!("JPEG encode failed: {e}")))?;
        },
        ImageKind::Png | ImageKind::Gif => {
            resized
                .save_with_format(output, output_kind.to_image_format())
                .map_err(|e| {
                    ImageMillError::processing(format!("{output_kind} encode failed: {e}"))
                })?;
        },
    }

    Ok(())
}

/// Options for the [`magick_thumbnail`] tool wrapper
#[derive(Debug, Clone)]
pub struct ThumbnailOptions {
    /// Letterboxed extent width
    pub width: u32,
    /// Letterboxed extent height
    pub height: u32,
    /// Background fill for the letterbox (any ImageMagick color spec)
    pub background: String,
    /// Kill the tool after this long
    pub timeout: Duration,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            background: "transparent".to_string(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

/// Produce a letterboxed thumbnail through ImageMagick's `convert`.
///
/// The size spec carries the only-shrink constraint (`WxH>`), the extent is
/// center-gravity padded with the background color, and a `jpeg:size`
/// decode hint of twice the target dimensions speeds up large JPEG inputs.
///
/// # Errors
/// - `InputNotFound` when the input path does not exist
/// - `ExternalTool` on missing binary, non-zero exit or timeout
pub fn magick_thumbnail<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ThumbnailOptions,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(ImageMillError::input_not_found(input));
    }

    let size = format!("{}x{}", options.width, options.height);
    let args = [
        "-define".to_string(),
        format!(
            "jpeg:size={}x{}",
            options.width.saturating_mul(2),
            options.height.saturating_mul(2)
        ),
        input.display().to_string(),
        "-thumbnail".to_string(),
        format!("{size}>"),
        "-background".to_string(),
        options.background.clone(),
        "-gravity".to_string(),
        "center".to_string(),
        "-extent".to_string(),
        size,
        output.display().to_string(),
    ];

    run_tool("convert", &args, options.timeout)
}

/// Options for the [`epeg_resize`] tool wrapper
#[derive(Debug, Clone)]
pub struct EpegOptions {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// JPEG quality [0, 100]
    pub quality: u8,
    /// Max-dimension mode (`-m`) keeping the aspect ratio; explicit
    /// width+height mode otherwise
    pub preserve_aspect: bool,
    /// Kill the tool after this long
    pub timeout: Duration,
}

impl EpegOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            quality: 100,
            preserve_aspect: true,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

/// Very fast approximate JPEG resize through the `epeg` tool.
///
/// # Errors
/// - `InputNotFound` when the input path does not exist
/// - `ExternalTool` on missing binary, non-zero exit or timeout
pub fn epeg_resize<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &EpegOptions,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(ImageMillError::input_not_found(input));
    }

    let mut args = Vec::new();
    if options.preserve_aspect {
        args.push("-m".to_string());
        args.push(format!("{},{}", options.width, options.height));
    } else {
        args.push("-w".to_string());
        args.push(options.width.to_string());
        args.push("-h".to_string());
        args.push(options.height.to_string());
    }
    args.push("-q".to_string());
    args.push(options.quality.to_string());
    args.push(input.display().to_string());
    args.push(output.display().to_string());

    run_tool("epeg", &args, options.timeout)
}

/// Run an external tool to completion under a timeout.
///
/// Non-zero exit, a missing binary and a timeout all surface as
/// `ExternalTool` errors; on timeout the child is killed before returning.
fn run_tool(program: &str, args: &[String], timeout: Duration) -> Result<()> {
    debug!(program, ?args, "invoking external tool");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ImageMillError::external_tool(format!("failed to launch `{program}`: {e}")))?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if status.success() {
                    return Ok(());
                }
                let stderr = child
                    .stderr
                    .take()
                    .and_then(|mut pipe| {
                        let mut buf = String::new();
                        std::io::Read::read_to_string(&mut pipe, &mut buf).ok()?;
                        Some(buf)
                    })
                    .unwrap_or_default();
                return Err(ImageMillError::external_tool(format!(
                    "`{program}` exited with {status}: {}",
                    stderr.trim()
                )));
            },
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ImageMillError::external_tool(format!(
                        "`{program}` timed out after {}s",
                        timeout.as_secs()
                    )));
                }
                std::thread::sleep(Duration::from_millis(25));
            },
            Err(e) => {
                return Err(ImageMillError::external_tool(format!(
                    "failed waiting for `{program}`: {e}"
                )));
            },
        }
    }
}
