use image::RgbaImage;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{FetchTask, ReqwestTileClient, TileClient, TileFetcher};
use crate::mosaic::{assemble, check_size, TileFailure};
use crate::tile::TileRectangle;

/// A stitched region and the tile rectangle it was built from.
#[derive(Debug)]
pub struct Download {
    pub canvas: RgbaImage,

    /// Footprint of the canvas, for georeferencing.
    pub rect: TileRectangle,

    /// Tiles left blank on the canvas.
    pub failures: Vec<TileFailure>,
}

/// Downloads and stitches the region described by `cfg` over HTTP.
///
/// # Example
/// ```rust,no_run
/// use tile_stitch::{download_region, Config, Provider, Region, Style};
///
/// # #[tokio::main]
/// # async fn main() {
/// let region = Region::new_deg(116.3883, 39.9289, 116.4046, 39.9130).unwrap();
/// let config = Config::new(region, 16, Provider::Google, Style::Satellite);
///
/// let download = download_region(&config).await.expect("failed downloading region");
/// download.canvas.save(config.output_file_name()).unwrap();
/// # }
/// ```
pub async fn download_region(cfg: &Config) -> Result<Download> {
    cfg.validate()?;
    let client = ReqwestTileClient::new(cfg.timeout)?;

    download_region_with(Arc::new(client), cfg).await
}

/// Downloads and stitches the region described by `cfg` through `client`.
///
/// Invalid settings and regions that are empty or too large to assemble fail
/// before any request is sent.
/// Tiles that cannot be fetched or decoded are left transparent and reported
/// in [`Download::failures`].
pub async fn download_region_with<C: TileClient>(client: Arc<C>, cfg: &Config) -> Result<Download> {
    cfg.validate()?;

    let rect = cfg.region.tile_rectangle(cfg.zoom)?;
    check_size(rect.tiles_wide(), rect.tiles_high())?;
    let tasks = fetch_tasks(cfg, &rect)?;
    let mut fetcher =
        TileFetcher::new(client, cfg.concurrency)?.with_attempts(cfg.request_attempts);
    if cfg.show_progress {
        fetcher = fetcher.with_progress_bar();
    }

    info!(
        provider = %cfg.provider,
        zoom = cfg.zoom,
        tiles_wide = rect.tiles_wide(),
        tiles_high = rect.tiles_high(),
        "fetching region"
    );

    let results = fetcher.fetch(tasks).await;
    let mosaic = assemble(&results, rect.tiles_wide(), rect.tiles_high())?;

    if mosaic.failures.is_empty() {
        info!(tiles = rect.len(), "region assembled");
    } else {
        warn!(
            tiles = rect.len(),
            blank = mosaic.failures.len(),
            "region assembled with blank tiles"
        );
    }

    Ok(Download {
        canvas: mosaic.canvas,
        rect,
        failures: mosaic.failures,
    })
}

/// One task per tile of `rect`, in row-major order.
pub fn fetch_tasks(cfg: &Config, rect: &TileRectangle) -> Result<Vec<FetchTask>> {
    let source = cfg.source();

    rect.tiles()
        .map(|tile| {
            Ok(FetchTask::new(
                source.tile_url(&tile)?,
                cfg.cache_path(tile.x, tile.y),
            ))
        })
        .collect()
}
