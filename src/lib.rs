//! Download a rectangular region of an online slippy-map and stitch it into
//! one image.
//!
//! Tiles come from Google, AMap (Gaode) or Tencent, in satellite or map style.
//! The covering tiles are fetched concurrently through a permanent disk cache,
//! pasted onto a single RGBA canvas, and the canvas' footprint can be
//! georeferenced in WGS84 or in the GCJ-02 datum Chinese providers use.
//!
//! **Use with caution.** Downloading tiles en-masse can hog down a tile
//! server easily, and providers' terms of use apply.
//!
//! # CLI Example
//!
//! ```bash
//! tile-stitch \
//!   --lon1 116.3883 --lat1 39.9289 \
//!   --lon2 116.4046 --lat2 39.9130 \
//!   --zoom 16 \
//!   --source google \
//!   --style s \
//!   --georef gcj --link-file forbidden_city.txt
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use tile_stitch::{download_region, geo_corners, Config, GeoTarget, Provider, Region, Style};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let region = Region::new_deg(116.3883, 39.9289, 116.4046, 39.9130).unwrap();
//! let config = Config::new(region, 16, Provider::Amap, Style::Satellite);
//!
//! let download = download_region(&config).await.expect("failed downloading region");
//! download.canvas.save(config.output_file_name()).unwrap();
//!
//! let corners = geo_corners(&download.rect, GeoTarget::Keep);
//! println!("left top at {:?}", corners.lt);
//! # }
//! ```

mod config;
mod coord;
mod download;
mod error;
mod fetch;
mod georef;
mod hash;
mod logging;
mod mosaic;
mod region;
mod tile;
mod url;

pub use config::{Config, MAX_CONCURRENCY, MIN_CONCURRENCY};
pub use coord::{
    gcj_to_wgs, mercator_to_wgs, out_of_china, wgs_to_gcj, wgs_to_mercator, wgs_to_tile,
    wgs_to_tile_position, Datum, GeoPoint, MercatorPoint, MAX_ZOOM, MERCATOR_HALF_EXTENT,
    MERCATOR_MAX_LAT,
};
pub use download::{download_region, download_region_with, fetch_tasks, Download};
pub use error::{Error, Result};
pub use fetch::{FetchTask, ReqwestTileClient, TileClient, TileFetcher, TileResult, USER_AGENT};
pub use georef::{geo_corners, link_file_contents, write_link_file, CornerReport, GeoTarget};
pub use hash::num_hash;
pub use logging::init_logging;
pub use mosaic::{assemble, check_size, Mosaic, TileFailure, MAX_MOSAIC_TILES};
pub use region::{Fixture, Region};
pub use tile::{Corners, TileIndex, TileRectangle, TILE_SIZE};
pub use url::{Provider, Style, TileSource};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_to_georeference() {
        let region = Region::new_deg(116.3883, 39.9289, 116.4046, 39.9130).unwrap();
        let rect = region.tile_rectangle(16).unwrap();
        let corners = geo_corners(&rect, GeoTarget::Keep);

        assert!(corners.lt.0 <= 116.3883 && corners.rb.0 >= 116.4046);
        assert!(corners.lt.1 >= 39.9289 && corners.rb.1 <= 39.9130);
    }

    #[test]
    fn beijing_fixture_names_its_output() {
        let region = Region::from(Fixture::Beijing);
        let config = Config::new(region, 12, Provider::Tencent, Style::Map);
        let rect = region.tile_rectangle(config.zoom).unwrap();

        assert!(config.validate().is_ok());
        assert!(check_size(rect.tiles_wide(), rect.tiles_high()).is_ok());
        assert!(config.output_file_name().starts_with("tencent_"));
        assert!(config.output_file_name().ends_with("_12_MAP_OUT.png"));
        assert_eq!(
            fetch_tasks(&config, &rect).unwrap().len(),
            rect.tiles_wide() as usize * rect.tiles_high() as usize
        );
    }
}
