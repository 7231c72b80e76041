use std::{path::PathBuf, time::Duration};

use crate::coord::MAX_ZOOM;
use crate::error::{Error, Result};
use crate::hash::num_hash;
use crate::region::Region;
use crate::url::{Provider, Style, TileSource};

pub const MIN_CONCURRENCY: u8 = 1;
pub const MAX_CONCURRENCY: u8 = 20;

/// Region download configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The area to download, north-west corner first.
    pub region: Region,

    /// The zoom level to fetch tiles at.
    pub zoom: u8,

    pub provider: Provider,

    pub style: Style,

    /// Number of parallel download workers, 1 to 20.
    pub concurrency: u8,

    /// How many times a tile is requested before its slot is marked failed.
    pub request_attempts: u8,

    /// Timeout for a single HTTP request.
    ///
    /// Pass the zero duration to disable the timeout.
    pub timeout: Duration,

    /// Root directory of the on-disk tile cache, `None` to disable caching.
    pub cache_dir: Option<PathBuf>,

    /// Name of the output image; also suffixes every cached tile file.
    pub output_name: String,

    /// Whether to draw a progress bar while fetching.
    pub show_progress: bool,
}

impl Config {
    pub fn new(region: Region, zoom: u8, provider: Provider, style: Style) -> Self {
        Self {
            region,
            zoom,
            provider,
            style,
            concurrency: 10,
            request_attempts: 3,
            timeout: Duration::from_secs(10),
            cache_dir: Some(PathBuf::from(".")),
            output_name: "MAP_OUT.png".to_owned(),
            show_progress: false,
        }
    }

    /// Rejects settings that are out of range before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        if self.zoom > MAX_ZOOM {
            return Err(Error::invalid(format!(
                "zoom must be between 0 and {}, got {}",
                MAX_ZOOM, self.zoom
            )));
        }
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(Error::invalid(format!(
                "concurrency must be between {} and {}, got {}",
                MIN_CONCURRENCY, MAX_CONCURRENCY, self.concurrency
            )));
        }
        if self.request_attempts == 0 {
            return Err(Error::invalid("request attempts must be at least 1"));
        }
        if self.output_name.is_empty() || self.output_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(Error::invalid(format!(
                "output name must be a plain file name, got `{}`",
                self.output_name
            )));
        }

        Ok(())
    }

    pub fn source(&self) -> TileSource {
        TileSource::new(self.provider, self.style)
    }

    /// Cache location of tile (x, y) at the configured zoom:
    /// `<cache_dir>/<provider>_<zoom hash>_<zoom>/<x>_<y>_<output_name>`.
    ///
    /// The style is not part of the path. Satellite and map tiles of the same
    /// provider and zoom share cache entries unless their `output_name`
    /// differs.
    pub fn cache_path(&self, x: u32, y: u32) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|root| {
            root.join(format!(
                "{}_{}_{}",
                self.provider,
                num_hash(&[self.zoom as f64]),
                self.zoom
            ))
            .join(format!("{}_{}_{}", x, y, self.output_name))
        })
    }

    /// File name the assembled image is saved under:
    /// `<provider>_<corner hash>_<zoom>_<output_name>`.
    pub fn output_file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.provider,
            num_hash(&self.region.values()),
            self.zoom,
            self.output_name
        )
    }
}
