//! Imagemill CLI Tool
//!
//! Command-line interface for loading, transforming and persisting raster
//! images through the unified editor facade.

use crate::{
    bulk::{self, ResizeFileOptions, ThumbnailOptions},
    editor::ImageEditor,
    tracing_config::init_cli_tracing,
    BackendKind,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

/// Imagemill CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "imagemill")]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Backend used for image operations
    #[arg(short, long, value_enum, default_value_t = CliBackend::Raster, global = true)]
    pub backend: CliBackend,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliBackend {
    Raster,
    Toolkit,
}

impl From<CliBackend> for BackendKind {
    fn from(backend: CliBackend) -> Self {
        match backend {
            CliBackend::Raster => Self::Raster,
            CliBackend::Toolkit => Self::Toolkit,
        }
    }
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Print dimensions, format and extension of an image
    Info {
        /// Input image file
        input: PathBuf,
    },
    /// Scale an image
    Resize {
        /// Input image file
        input: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        /// Target width (0 = derive from height)
        #[arg(short = 'W', long, default_value_t = 0)]
        width: u32,
        /// Target height (0 = derive from width)
        #[arg(short = 'H', long, default_value_t = 0)]
        height: u32,
        /// Ignore the aspect ratio and hit the exact target dimensions
        #[arg(long)]
        exact: bool,
        /// Allow enlarging beyond the original dimensions
        #[arg(long)]
        enlarge: bool,
        /// JPEG quality (0-100)
        #[arg(short, long, default_value_t = 90)]
        quality: i32,
    },
    /// Extract a sub-rectangle
    Crop {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short = 'W', long)]
        width: u32,
        #[arg(short = 'H', long)]
        height: u32,
        /// X coordinate of the top-left corner
        #[arg(short = 'x', long, default_value_t = 0)]
        left: u32,
        /// Y coordinate of the top-left corner
        #[arg(short = 'y', long, default_value_t = 0)]
        top: u32,
        #[arg(short, long, default_value_t = 90)]
        quality: i32,
    },
    /// Rotate by an angle in degrees (positive = clockwise)
    Rotate {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, allow_hyphen_values = true)]
        angle: f32,
        #[arg(short, long, default_value_t = 90)]
        quality: i32,
    },
    /// Adjust brightness/contrast or blend in a color
    Adjust {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Brightness delta [-255, 255]
        #[arg(long, allow_hyphen_values = true)]
        brightness: Option<i32>,
        /// Contrast delta [-100, 100]
        #[arg(long, allow_hyphen_values = true)]
        contrast: Option<i32>,
        /// Color to blend in, as R G B deltas [-255, 255]
        #[arg(long, num_args = 3, value_names = ["R", "G", "B"], allow_hyphen_values = true)]
        colorize: Option<Vec<i32>>,
        #[arg(short, long, default_value_t = 90)]
        quality: i32,
    },
    /// Apply a one-shot effect
    Filter {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(value_enum)]
        effect: CliEffect,
        #[arg(short, long, default_value_t = 90)]
        quality: i32,
    },
    /// Bulk-resize many files into a directory
    Batch {
        /// Input image files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,
        #[arg(short = 'W', long)]
        width: u32,
        #[arg(short = 'H', long)]
        height: u32,
        #[arg(short, long, default_value_t = 90)]
        quality: i32,
    },
    /// Letterboxed thumbnail through ImageMagick's `convert`
    Thumbnail {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short = 'W', long, default_value_t = 100)]
        width: u32,
        #[arg(short = 'H', long, default_value_t = 100)]
        height: u32,
        /// Background fill for the letterbox
        #[arg(long, default_value = "transparent")]
        background: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliEffect {
    Grayscale,
    Sepia,
    Negative,
    Mirror,
    Flip,
    Autorotate,
}

/// CLI entry point
///
/// # Errors
/// - Any editor or tool failure, wrapped with command context
pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_tracing(cli.verbose)?;
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let backend = BackendKind::from(cli.backend);

    match cli.command {
        CliCommand::Info { input } => {
            let editor = ImageEditor::open(backend, &input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            println!(
                "{}: {}x{} {} (.{})",
                input.display(),
                editor.width()?,
                editor.height()?,
                editor.format()?,
                editor.extension()?,
            );
        },
        CliCommand::Resize {
            input,
            output,
            width,
            height,
            exact,
            enlarge,
            quality,
        } => {
            let mut editor = ImageEditor::open(backend, &input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            editor
                .resize(width, height, !exact, enlarge)?
                .save(&output, quality)?;
            info!(output = %output.display(), "resized");
        },
        CliCommand::Crop {
            input,
            output,
            width,
            height,
            left,
            top,
            quality,
        } => {
            let mut editor = ImageEditor::open(backend, &input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            editor.crop(width, height, left, top)?.save(&output, quality)?;
            info!(output = %output.display(), "cropped");
        },
        CliCommand::Rotate {
            input,
            output,
            angle,
            quality,
        } => {
            let mut editor = ImageEditor::open(backend, &input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            editor.rotate(angle)?.save(&output, quality)?;
            info!(output = %output.display(), angle, "rotated");
        },
        CliCommand::Adjust {
            input,
            output,
            brightness,
            contrast,
            colorize,
            quality,
        } => {
            if brightness.is_none() && contrast.is_none() && colorize.is_none() {
                warn!("no adjustment given; copying input unchanged");
            }
            let mut editor = ImageEditor::open(backend, &input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            if let Some(delta) = brightness {
                editor.brightness(delta)?;
            }
            if let Some(delta) = contrast {
                editor.contrast(delta)?;
            }
            if let Some(channels) = colorize {
                // clap guarantees exactly three values
                editor.colorize(channels[0], channels[1], channels[2])?;
            }
            editor.save(&output, quality)?;
            info!(output = %output.display(), "adjusted");
        },
        CliCommand::Filter {
            input,
            output,
            effect,
            quality,
        } => {
            let mut editor = ImageEditor::open(backend, &input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            match effect {
                CliEffect::Grayscale => editor.grayscale()?,
                CliEffect::Sepia => editor.sepia()?,
                CliEffect::Negative => editor.negative()?,
                CliEffect::Mirror => editor.mirror()?,
                CliEffect::Flip => editor.flip()?,
                CliEffect::Autorotate => editor.autorotate()?,
            };
            editor.save(&output, quality)?;
            info!(output = %output.display(), ?effect, "filtered");
        },
        CliCommand::Batch {
            inputs,
            out_dir,
            width,
            height,
            quality,
        } => {
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;

            let bar = ProgressBar::new(inputs.len() as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let mut options = ResizeFileOptions::new(width, height);
            options.quality = quality.clamp(0, 100) as u8;

            let mut failures = 0usize;
            for input in &inputs {
                let name = input
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                bar.set_message(name.clone());

                let target = out_dir.join(&name);
                if let Err(e) = bulk::resize_file(input, &target, &options) {
                    warn!(input = %input.display(), error = %e, "batch item failed");
                    failures += 1;
                }
                bar.inc(1);
            }
            bar.finish_and_clear();

            if failures > 0 {
                anyhow::bail!("{failures} of {} files failed", inputs.len());
            }
            info!(count = inputs.len(), "batch resize complete");
        },
        CliCommand::Thumbnail {
            input,
            output,
            width,
            height,
            background,
        } => {
            let options = ThumbnailOptions {
                width,
                height,
                background,
                ..Default::default()
            };
            bulk::magick_thumbnail(&input, &output, &options)
                .with_context(|| format!("failed to thumbnail {}", input.display()))?;
            info!(output = %output.display(), "thumbnail written");
        },
    }

    Ok(())
}
