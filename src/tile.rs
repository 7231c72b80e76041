use crate::coord::{MercatorPoint, MERCATOR_HALF_EXTENT};

/// Edge length of a tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// A slippy-map tile with x, y and z-coordinate, origin at the top left.
/// ref: https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames
///
/// Providers with a different y origin translate at URL-build time; the index
/// itself always uses the standard convention.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TileIndex {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileIndex {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }
}

/// The four corners of a rectangle: left-top, right-top, left-bottom,
/// right-bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corners<T> {
    pub lt: T,
    pub rt: T,
    pub lb: T,
    pub rb: T,
}

impl<T> Corners<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Corners<U> {
        Corners {
            lt: f(self.lt),
            rt: f(self.rt),
            lb: f(self.lb),
            rb: f(self.rb),
        }
    }

    /// Corners in the order GIS link files list them: LT, LB, RT, RB.
    pub fn link_order(&self) -> [&T; 4] {
        [&self.lt, &self.lb, &self.rt, &self.rb]
    }
}

/// The tiles covering a region at one zoom level.
///
/// The corners are the first and last tiles of the mosaic, both inclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TileRectangle {
    pub lt: TileIndex,
    pub rt: TileIndex,
    pub lb: TileIndex,
    pub rb: TileIndex,
    pub z: u8,
}

impl TileRectangle {
    /// Creates the rectangle spanning from `first` (top left) to `last`
    /// (bottom right).
    ///
    /// # Panics
    /// Panics if the tiles are on different zoom levels or `last` lies north
    /// or west of `first`.
    pub fn new(first: TileIndex, last: TileIndex) -> Self {
        assert_eq!(first.z, last.z);
        assert!(first.x <= last.x && first.y <= last.y);

        let z = first.z;
        TileRectangle {
            lt: first,
            rt: TileIndex::new(last.x, first.y, z),
            lb: TileIndex::new(first.x, last.y, z),
            rb: last,
            z,
        }
    }

    pub fn tiles_wide(&self) -> u32 {
        self.rt.x - self.lt.x + 1
    }

    pub fn tiles_high(&self) -> u32 {
        self.lb.y - self.lt.y + 1
    }

    pub fn len(&self) -> usize {
        self.tiles_wide() as usize * self.tiles_high() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width and height of the assembled mosaic, in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.tiles_wide() * TILE_SIZE,
            self.tiles_high() * TILE_SIZE,
        )
    }

    /// Iterates all tiles in row-major order, which is also the order of
    /// the mosaic's slots.
    pub fn tiles(&self) -> impl Iterator<Item = TileIndex> {
        let (x0, x1) = (self.lt.x, self.rt.x);
        let (y0, y1) = (self.lt.y, self.lb.y);
        let z = self.z;

        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| TileIndex::new(x, y, z)))
    }

    /// Web-Mercator coordinates of the rectangle's outer edge.
    ///
    /// A tile index addresses its top-left corner, so the right and bottom
    /// edges use `index + 1`.
    pub fn mercator_corners(&self) -> Corners<MercatorPoint> {
        let n = 2_f64.powi(self.z as i32);
        let extent = MERCATOR_HALF_EXTENT;

        let left = self.lt.x as f64 / n * extent * 2.0 - extent;
        let top = -(self.lt.y as f64 / n * extent * 2.0) + extent;
        let right = (self.rb.x as f64 + 1.0) / n * extent * 2.0 - extent;
        let bottom = -((self.rb.y as f64 + 1.0) / n * extent * 2.0) + extent;

        Corners {
            lt: MercatorPoint { x: left, y: top },
            rt: MercatorPoint { x: right, y: top },
            lb: MercatorPoint { x: left, y: bottom },
            rb: MercatorPoint { x: right, y: bottom },
        }
    }

    /// Pixel coordinates of the mosaic's corners as GIS tools expect them:
    /// the origin at the top left, y growing negative downwards.
    pub fn pixel_corners(&self) -> Corners<(i64, i64)> {
        let (width, height) = self.pixel_size();
        let (w, h) = (width as i64, height as i64);

        Corners {
            lt: (0, 0),
            rt: (w, 0),
            lb: (0, -h),
            rb: (w, -h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: u32, y0: u32, x1: u32, y1: u32, z: u8) -> TileRectangle {
        TileRectangle::new(TileIndex::new(x0, y0, z), TileIndex::new(x1, y1, z))
    }

    #[test]
    fn corners_are_consistent() {
        let r = rect(3371, 1550, 3373, 1553, 12);
        assert_eq!(r.rt, TileIndex::new(3373, 1550, 12));
        assert_eq!(r.lb, TileIndex::new(3371, 1553, 12));
        assert_eq!((r.tiles_wide(), r.tiles_high()), (3, 4));
        assert_eq!(r.len(), 12);
    }

    #[test]
    fn tiles_are_row_major() {
        let tiles: Vec<_> = rect(5, 7, 6, 8, 4).tiles().map(|t| (t.x, t.y)).collect();
        assert_eq!(tiles, vec![(5, 7), (6, 7), (5, 8), (6, 8)]);
    }

    #[test]
    fn pixel_corners_follow_tile_count() {
        for r in &[rect(0, 0, 0, 0, 0), rect(10, 20, 14, 22, 6)] {
            let px = r.pixel_corners();
            assert_eq!(px.lt, (0, 0));
            assert_eq!(px.rt.0, r.tiles_wide() as i64 * 256);
            assert_eq!(px.lb.1, -(r.tiles_high() as i64) * 256);
            assert_eq!(px.rb, (px.rt.0, px.lb.1));
        }
    }

    #[test]
    fn world_tile_covers_mercator_square() {
        let m = rect(0, 0, 0, 0, 0).mercator_corners();
        assert_eq!(m.lt, MercatorPoint { x: -MERCATOR_HALF_EXTENT, y: MERCATOR_HALF_EXTENT });
        assert_eq!(m.rb, MercatorPoint { x: MERCATOR_HALF_EXTENT, y: -MERCATOR_HALF_EXTENT });
        assert_eq!(m.rt.x, m.rb.x);
        assert_eq!(m.lb.y, m.rb.y);
    }

    #[test]
    fn mercator_far_edge_is_exclusive() {
        // the north-west quadrant at zoom 1 ends on the meridian and equator
        let m = rect(0, 0, 0, 0, 1).mercator_corners();
        assert_eq!(m.rb, MercatorPoint { x: 0.0, y: 0.0 });
    }

    #[test]
    #[should_panic]
    fn reversed_rectangle_panics() {
        rect(4, 4, 3, 4, 3);
    }
}
