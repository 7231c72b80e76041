//! Placement of fetched tiles onto one RGBA canvas.

use image::{imageops, RgbaImage};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fetch::TileResult;
use crate::tile::TILE_SIZE;

/// Largest grid that is assembled, 4 GiB of RGBA canvas.
pub const MAX_MOSAIC_TILES: u64 = 1 << 14;

/// Fails with `InvalidArgument` if a `tiles_wide` x `tiles_high` grid is
/// larger than [`MAX_MOSAIC_TILES`].
pub fn check_size(tiles_wide: u32, tiles_high: u32) -> Result<()> {
    let tiles = tiles_wide as u64 * tiles_high as u64;
    if tiles > MAX_MOSAIC_TILES {
        return Err(Error::invalid(format!(
            "a {}x{} tile mosaic is too large, at most {} tiles are supported",
            tiles_wide, tiles_high, MAX_MOSAIC_TILES
        )));
    }

    Ok(())
}

/// A slot of the mosaic that was left blank.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TileFailure {
    pub index: usize,
    pub col: u32,
    pub row: u32,
    pub reason: String,
}

/// The assembled canvas and the slots that could not be filled.
#[derive(Debug)]
pub struct Mosaic {
    pub canvas: RgbaImage,
    pub failures: Vec<TileFailure>,
}

/// Pastes every decodable tile at its grid position on a transparent canvas.
///
/// `results` are in row-major order, slot `i` covering column
/// `i % tiles_wide` and row `i / tiles_wide`. Slots that failed to download
/// or decode stay transparent and are listed in [`Mosaic::failures`].
///
/// Fails only if the slot count does not match the grid or the grid exceeds
/// [`MAX_MOSAIC_TILES`].
pub fn assemble(results: &[TileResult], tiles_wide: u32, tiles_high: u32) -> Result<Mosaic> {
    let expected = tiles_wide as usize * tiles_high as usize;
    if results.len() != expected {
        return Err(Error::invalid(format!(
            "{} tile results for a {}x{} grid",
            results.len(),
            tiles_wide,
            tiles_high
        )));
    }

    check_size(tiles_wide, tiles_high)?;
    let (width, height) = (tiles_wide * TILE_SIZE, tiles_high * TILE_SIZE);

    debug!(width, height, tiles = expected, "assembling mosaic");

    let mut canvas = RgbaImage::new(width, height);
    let mut failures = Vec::new();

    for (index, res) in results.iter().enumerate() {
        let col = (index % tiles_wide as usize) as u32;
        let row = (index / tiles_wide as usize) as u32;

        let outcome = match res {
            Ok(bytes) => decode_tile(index, bytes).map(|tile| {
                imageops::replace(
                    &mut canvas,
                    &tile,
                    (col * TILE_SIZE) as i64,
                    (row * TILE_SIZE) as i64,
                )
            }),
            Err(e) => Err(e.to_string()),
        };

        if let Err(reason) = outcome {
            warn!(index, col, row, %reason, "tile left blank");
            failures.push(TileFailure {
                index,
                col,
                row,
                reason,
            });
        }
    }

    Ok(Mosaic { canvas, failures })
}

/// Decodes a tile, cropping anything beyond one tile so it cannot spill into
/// its neighbours.
fn decode_tile(index: usize, bytes: &[u8]) -> Result<RgbaImage, String> {
    let tile = image::load_from_memory(bytes)
        .map_err(|e| {
            Error::DecodeFailed {
                index,
                reason: e.to_string(),
            }
            .to_string()
        })?
        .to_rgba8();

    if tile.width() > TILE_SIZE || tile.height() > TILE_SIZE {
        return Ok(imageops::crop_imm(&tile, 0, 0, TILE_SIZE, TILE_SIZE).to_image());
    }

    Ok(tile)
}
