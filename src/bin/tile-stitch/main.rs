mod args;
mod validators;

use anyhow::{Context, Result};
use args::Args;
use image::DynamicImage;
use std::path::Path;
use tracing::info;

use tile_stitch::{
    check_size, download_region, init_logging, write_link_file, Config, CornerReport,
};

/// Rough size of a single tile, for dry-run estimates.
const BYTES_PER_TILE: f64 = 10_000f64;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse()?;
    init_logging(args.verbose);

    let config = Config::from(&args);
    config.validate()?;

    if args.dry_run {
        let rect = config.region.tile_rectangle(config.zoom)?;
        let (width, height) = rect.pixel_size();

        eprintln!(
            "would download {}x{} tiles into a {}x{} px image (approx {}, assuming 10 kb per tile)",
            rect.tiles_wide(),
            rect.tiles_high(),
            width,
            height,
            pretty_bytes::converter::convert((rect.len() as f64) * BYTES_PER_TILE)
        );

        check_size(rect.tiles_wide(), rect.tiles_high())?;
        return Ok(());
    }

    let download = download_region(&config).await?;

    let output = config.output_file_name();
    save_canvas(download.canvas, Path::new(&output))?;
    info!(path = %output, "exported image");

    if let Some(target) = args.georef {
        match &args.link_file {
            Some(path) => {
                write_link_file(path, &download.rect, target)?;
                info!(path = %path.display(), "exported link file");
            }
            None => println!("{}", CornerReport::new(&download.rect, target)),
        }
    }

    Ok(())
}

/// Saves the canvas in the format implied by the file extension. JPEG has no
/// alpha channel, so the canvas is flattened to RGB for it.
fn save_canvas(canvas: image::RgbaImage, path: &Path) -> Result<()> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    let saved = if is_jpeg {
        DynamicImage::ImageRgba8(canvas).to_rgb8().save(path)
    } else {
        canvas.save(path)
    };

    saved.with_context(|| format!("failed saving image to {}", path.display()))
}
