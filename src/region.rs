use crate::coord::{wgs_to_tile_position, GeoPoint};
use crate::error::{Error, Result};
use crate::tile::{TileIndex, TileRectangle};

/// A rectangular region given by its north-west and south-east WGS84 corners,
/// in degrees.
///
/// # Example
/// ```rust
/// # use tile_stitch::Region;
/// let forbidden_city = Region::new_deg(116.3883, 39.9289, 116.4046, 39.9130).unwrap();
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Region {
    pub north_west: GeoPoint,
    pub south_east: GeoPoint,
}

impl Region {
    /// Create a new region from the longitude/latitude of its north-west and
    /// south-east corners.
    ///
    /// Fails if a coordinate is not a finite number, or outside [-180, 180]
    /// longitude / [-90, 90] latitude.
    pub fn new_deg(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Result<Self> {
        for &lon in &[lon1, lon2] {
            if !(lon.is_finite() && (-180.0..=180.0).contains(&lon)) {
                return Err(Error::invalid(format!(
                    "longitude must be within [-180, 180], got {}",
                    lon
                )));
            }
        }
        for &lat in &[lat1, lat2] {
            if !(lat.is_finite() && (-90.0..=90.0).contains(&lat)) {
                return Err(Error::invalid(format!(
                    "latitude must be within [-90, 90], got {}",
                    lat
                )));
            }
        }

        Ok(Region {
            north_west: GeoPoint::wgs84(lon1, lat1),
            south_east: GeoPoint::wgs84(lon2, lat2),
        })
    }

    /// The corner values in (lon1, lat1, lon2, lat2) order.
    pub fn values(&self) -> [f64; 4] {
        [
            self.north_west.lon,
            self.north_west.lat,
            self.south_east.lon,
            self.south_east.lat,
        ]
    }

    /// The rectangle of tiles covering the region at `zoom`.
    ///
    /// Every tile the region touches is included, so a region inside a
    /// single tile yields one tile. Fails with `EmptyRegion` unless the second
    /// corner lies strictly east and south of the first.
    pub fn tile_rectangle(&self, zoom: u8) -> Result<TileRectangle> {
        let (x1, y1) = wgs_to_tile_position(self.north_west.lon, self.north_west.lat, zoom)?;
        let (x2, y2) = wgs_to_tile_position(self.south_east.lon, self.south_east.lat, zoom)?;

        let tiles_wide = span(x1, x2);
        let tiles_high = span(y1, y2);
        if tiles_wide <= 0 || tiles_high <= 0 {
            return Err(Error::EmptyRegion {
                tiles_wide,
                tiles_high,
            });
        }

        let first = TileIndex::new(x1.floor() as u32, y1.floor() as u32, zoom);
        let last = TileIndex::new(
            first.x + tiles_wide as u32 - 1,
            first.y + tiles_high as u32 - 1,
            zoom,
        );

        Ok(TileRectangle::new(first, last))
    }

    /// Iterates all tiles of the region at `zoom` in row-major order.
    pub fn tiles(&self, zoom: u8) -> Result<impl Iterator<Item = TileIndex>> {
        Ok(self.tile_rectangle(zoom)?.tiles())
    }
}

/// Number of tiles between two fractional positions along one axis, or a
/// non-positive count if `to` does not lie past `from`.
fn span(from: f64, to: f64) -> i64 {
    if to <= from {
        return (to.floor() - from.floor()) as i64;
    }

    (to.ceil() - from.floor()) as i64
}

/// A region fixture containing preset coordinates for a known area.
pub enum Fixture {
    World,
    Beijing,
}

impl std::str::FromStr for Fixture {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Fixture::*;

        match s.to_lowercase().as_str() {
            "world" | "earth" => Ok(World),
            "beijing" => Ok(Beijing),
            _ => Err("unrecognized fixture"),
        }
    }
}

impl std::convert::From<Fixture> for Region {
    fn from(fixture: Fixture) -> Self {
        use Fixture::*;

        let (lon1, lat1, lon2, lat2) = match fixture {
            World => (-180.0, 90.0, 180.0, -90.0),
            Beijing => (116.1, 40.1, 116.7, 39.7),
        };

        Region {
            north_west: GeoPoint::wgs84(lon1, lat1),
            south_east: GeoPoint::wgs84(lon2, lat2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(matches!(
            Region::new_deg(360.0, 0.0, 0.0, 0.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Region::new_deg(0.0, 0.0, 1.0, -91.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Region::new_deg(0.0, f64::NAN, 1.0, 0.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn world_at_zoom_zero_is_one_tile() {
        let rect = Region::from(Fixture::World).tile_rectangle(0).unwrap();
        let origin = TileIndex::new(0, 0, 0);
        assert_eq!(rect.lt, origin);
        assert_eq!(rect.rb, origin);
        assert_eq!((rect.tiles_wide(), rect.tiles_high()), (1, 1));
    }

    #[test]
    fn world_at_zoom_six_covers_pyramid() {
        let rect = Region::from(Fixture::World).tile_rectangle(6).unwrap();
        assert_eq!((rect.tiles_wide(), rect.tiles_high()), (64, 64));
        assert_eq!(rect.rb, TileIndex::new(63, 63, 6));
    }

    #[test]
    fn includes_partially_covered_tiles() {
        let region = Region::new_deg(116.3, 40.0, 116.5, 39.8).unwrap();
        let rect = region.tile_rectangle(12).unwrap();
        assert_eq!(rect.lt, TileIndex::new(3371, 1550, 12));
        assert_eq!(rect.rb, TileIndex::new(3373, 1553, 12));
    }

    #[test]
    fn region_inside_one_tile() {
        let region = Region::new_deg(116.3883, 39.9289, 116.3884, 39.9288).unwrap();
        let rect = region.tile_rectangle(10).unwrap();
        assert_eq!(rect.len(), 1);
        assert_eq!(rect.lt, TileIndex::new(843, 387, 10));
    }

    #[test]
    fn reversed_corners_are_empty() {
        let region = Region::new_deg(116.5, 39.8, 116.3, 40.0).unwrap();
        assert!(matches!(
            region.tile_rectangle(12),
            Err(Error::EmptyRegion { .. })
        ));

        let point = Region::new_deg(116.3, 40.0, 116.3, 40.0).unwrap();
        assert!(matches!(
            point.tile_rectangle(12),
            Err(Error::EmptyRegion {
                tiles_wide: 0,
                tiles_high: 0
            })
        ));
    }

    #[test]
    fn invalid_zoom_is_rejected() {
        let region = Region::from(Fixture::Beijing);
        assert!(matches!(
            region.tile_rectangle(23),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn tiles_match_rectangle() {
        let region = Region::from(Fixture::Beijing);
        let rect = region.tile_rectangle(9).unwrap();
        let tiles: Vec<_> = region.tiles(9).unwrap().collect();
        assert_eq!(tiles.len(), rect.len());
        assert_eq!(tiles.first(), Some(&rect.lt));
        assert_eq!(tiles.last(), Some(&rect.rb));
    }
}
