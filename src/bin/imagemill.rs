//! Imagemill CLI Tool
//!
//! Command-line interface for loading, transforming and persisting raster
//! images through the imagemill editor facade.

fn main() -> anyhow::Result<()> {
    imagemill::cli::main()
}
