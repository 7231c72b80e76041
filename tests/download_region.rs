use image::{ImageFormat, Rgba, RgbaImage};
use std::{
    collections::HashMap,
    io::Cursor,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use tile_stitch::{
    download_region_with, Config, Error, Provider, Region, Style, TileClient, TileSource,
    TileIndex,
};

/// Answers every known URL with a solid tile whose red channel encodes the
/// tile's column and green channel its row.
struct GridServer {
    tiles: HashMap<String, Vec<u8>>,
    requests: AtomicUsize,
}

impl GridServer {
    fn new(source: TileSource, first: TileIndex, last: TileIndex) -> Self {
        let mut tiles = HashMap::new();
        for y in first.y..=last.y {
            for x in first.x..=last.x {
                let url = source.tile_url(&TileIndex::new(x, y, first.z)).unwrap();
                tiles.insert(url, solid_png(x as u8, y as u8));
            }
        }

        Self {
            tiles,
            requests: AtomicUsize::new(0),
        }
    }

    fn offline() -> Self {
        Self {
            tiles: HashMap::new(),
            requests: AtomicUsize::new(0),
        }
    }

    fn without(mut self, source: TileSource, tile: TileIndex) -> Self {
        self.tiles.remove(&source.tile_url(&tile).unwrap());
        self
    }
}

impl TileClient for GridServer {
    async fn get(&self, url: &str) -> tile_stitch::Result<Vec<u8>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.tiles
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Transport(format!("no tile at {}", url)))
    }
}

fn solid_png(r: u8, g: u8) -> Vec<u8> {
    let img = RgbaImage::from_pixel(256, 256, Rgba([r, g, 0, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn config(provider: Provider, cache: Option<&std::path::Path>) -> Config {
    // zoom 6 tiles (40..=41, 24..=25)
    let region = Region::new_deg(45.1, 40.9, 53.0, 35.1).unwrap();
    Config {
        concurrency: 3,
        cache_dir: cache.map(|p| p.to_path_buf()),
        output_name: "test.png".to_owned(),
        ..Config::new(region, 6, provider, Style::Satellite)
    }
}

#[tokio::test]
async fn tiles_land_at_their_grid_position() {
    for provider in Provider::ALL.iter().copied() {
        let cfg = config(provider, None);
        let rect = cfg.region.tile_rectangle(cfg.zoom).unwrap();
        let server = Arc::new(GridServer::new(cfg.source(), rect.lt, rect.rb));

        let download = download_region_with(Arc::clone(&server), &cfg).await.unwrap();

        assert_eq!(download.rect, rect);
        assert!(download.failures.is_empty(), "{:?}", download.failures);
        assert_eq!(
            download.canvas.dimensions(),
            (rect.tiles_wide() * 256, rect.tiles_high() * 256)
        );
        for (i, tile) in rect.tiles().enumerate() {
            let col = i as u32 % rect.tiles_wide();
            let row = i as u32 / rect.tiles_wide();
            let px = download.canvas.get_pixel(col * 256 + 128, row * 256 + 128);
            assert_eq!(px.0, [tile.x as u8, tile.y as u8, 0, 255], "{}", provider);
        }
    }
}

#[tokio::test]
async fn second_run_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(Provider::Google, Some(dir.path()));
    let rect = cfg.region.tile_rectangle(cfg.zoom).unwrap();

    let server = Arc::new(GridServer::new(cfg.source(), rect.lt, rect.rb));
    let first = download_region_with(Arc::clone(&server), &cfg).await.unwrap();
    assert_eq!(server.requests.load(Ordering::SeqCst), rect.len());
    assert!(cfg.cache_path(rect.lt.x, rect.lt.y).unwrap().exists());

    let offline = Arc::new(GridServer::offline());
    let second = download_region_with(Arc::clone(&offline), &cfg).await.unwrap();

    assert_eq!(offline.requests.load(Ordering::SeqCst), 0);
    assert!(second.failures.is_empty());
    assert_eq!(first.canvas.as_raw(), second.canvas.as_raw());
}

#[tokio::test]
async fn unreachable_tile_is_left_blank() {
    let cfg = config(Provider::Tencent, None);
    let rect = cfg.region.tile_rectangle(cfg.zoom).unwrap();
    let server =
        Arc::new(GridServer::new(cfg.source(), rect.lt, rect.rb).without(cfg.source(), rect.rt));

    let download = download_region_with(Arc::clone(&server), &cfg).await.unwrap();

    assert_eq!(download.failures.len(), 1);
    assert_eq!(download.failures[0].index, rect.tiles_wide() as usize - 1);
    let x = (rect.tiles_wide() - 1) * 256 + 10;
    assert_eq!(download.canvas.get_pixel(x, 10).0, [0, 0, 0, 0]);
    assert_eq!(
        server.requests.load(Ordering::SeqCst),
        rect.len() - 1 + cfg.request_attempts as usize
    );
}
