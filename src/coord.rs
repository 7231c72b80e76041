//! Conversions between WGS84, the GCJ-02 "China offset" datum, spherical
//! Web-Mercator and slippy-map tile indices.

use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::tile::TileIndex;

/// Latitude bound of the Web-Mercator square, in degrees.
pub const MERCATOR_MAX_LAT: f64 = 85.0511287798;

/// Half the circumference of the Web-Mercator sphere, in meters.
pub const MERCATOR_HALF_EXTENT: f64 = 20037508.34;

pub const MAX_ZOOM: u8 = 22;

// Krasovsky 1940
const KRASOVSKY_A: f64 = 6378245.0;
const KRASOVSKY_EE: f64 = 0.00669342162296594323;

const CHINA_LON_MIN: f64 = 72.004;
const CHINA_LON_MAX: f64 = 137.8347;
const CHINA_LAT_MIN: f64 = 0.8293;
const CHINA_LAT_MAX: f64 = 55.8271;

/// The geodetic datum a [`GeoPoint`] is expressed in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Datum {
    Wgs84,
    Gcj02,
}

/// Longitude/latitude in degrees, tagged with its datum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub datum: Datum,
}

impl GeoPoint {
    pub fn wgs84(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            datum: Datum::Wgs84,
        }
    }

    pub fn gcj02(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            datum: Datum::Gcj02,
        }
    }

    /// Re-expresses the point in GCJ-02.
    pub fn to_gcj02(self) -> Self {
        match self.datum {
            Datum::Gcj02 => self,
            Datum::Wgs84 => {
                let (lon, lat) = wgs_to_gcj(self.lon, self.lat);
                Self::gcj02(lon, lat)
            }
        }
    }

    /// Re-expresses the point in WGS84.
    pub fn to_wgs84(self) -> Self {
        match self.datum {
            Datum::Wgs84 => self,
            Datum::Gcj02 => {
                let (lon, lat) = gcj_to_wgs(self.lon, self.lat);
                Self::wgs84(lon, lat)
            }
        }
    }
}

/// A point on the Web-Mercator plane, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MercatorPoint {
    pub x: f64,
    pub y: f64,
}

/// Whether the point lies outside the box in which the GCJ-02 offset is defined.
pub fn out_of_china(lon: f64, lat: f64) -> bool {
    !(CHINA_LON_MIN..=CHINA_LON_MAX).contains(&lon)
        || !(CHINA_LAT_MIN..=CHINA_LAT_MAX).contains(&lat)
}

fn offset_lat(x: f64, y: f64) -> f64 {
    let mut ret =
        -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn offset_lon(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// The (lon, lat) offset in degrees between WGS84 and GCJ-02 at a point.
fn offset(lon: f64, lat: f64) -> (f64, f64) {
    let d_lat = offset_lat(lon - 105.0, lat - 35.0);
    let d_lon = offset_lon(lon - 105.0, lat - 35.0);

    let rad_lat = lat.to_radians();
    let magic = 1.0 - KRASOVSKY_EE * rad_lat.sin().powi(2);
    let sqrt_magic = magic.sqrt();

    let d_lat = (d_lat * 180.0) / ((KRASOVSKY_A * (1.0 - KRASOVSKY_EE)) / (magic * sqrt_magic) * PI);
    let d_lon = (d_lon * 180.0) / (KRASOVSKY_A / sqrt_magic * rad_lat.cos() * PI);

    (d_lon, d_lat)
}

/// Shifts a WGS84 point into GCJ-02. Points outside China are returned as-is.
pub fn wgs_to_gcj(lon: f64, lat: f64) -> (f64, f64) {
    if out_of_china(lon, lat) {
        return (lon, lat);
    }

    let (d_lon, d_lat) = offset(lon, lat);
    (lon + d_lon, lat + d_lat)
}

/// Shifts a GCJ-02 point back to WGS84. Points outside China are returned as-is.
///
/// This subtracts the offset evaluated at the GCJ-02 point once, it does not
/// iterate towards an exact inverse. The round trip error stays well below
/// 1e-4 degrees.
pub fn gcj_to_wgs(lon: f64, lat: f64) -> (f64, f64) {
    if out_of_china(lon, lat) {
        return (lon, lat);
    }

    let (d_lon, d_lat) = offset(lon, lat);
    (lon - d_lon, lat - d_lat)
}

fn clamp_lat(lat: f64) -> f64 {
    lat.max(-MERCATOR_MAX_LAT).min(MERCATOR_MAX_LAT)
}

/// Projects a WGS84 point onto the Web-Mercator plane.
pub fn wgs_to_mercator(lon: f64, lat: f64) -> MercatorPoint {
    let lat = clamp_lat(lat);

    let x = lon * MERCATOR_HALF_EXTENT / 180.0;
    let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    let y = y * MERCATOR_HALF_EXTENT / 180.0;

    MercatorPoint { x, y }
}

/// Unprojects a Web-Mercator point to WGS84 (lon, lat).
pub fn mercator_to_wgs(point: MercatorPoint) -> (f64, f64) {
    let lon = point.x / MERCATOR_HALF_EXTENT * 180.0;
    let lat = point.y / MERCATOR_HALF_EXTENT * 180.0;
    let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);

    (lon, lat)
}

/// The fractional tile position of a WGS84 point, origin at the top left.
///
/// Both axes are in `[0, 2^zoom]`; the east and south edges of the world map
/// to `2^zoom` exactly.
pub fn wgs_to_tile_position(lon: f64, lat: f64, zoom: u8) -> Result<(f64, f64)> {
    if zoom > MAX_ZOOM {
        return Err(Error::invalid(format!(
            "zoom must be between 0 and {}, got {}",
            MAX_ZOOM, zoom
        )));
    }
    if !lon.is_finite() || !lat.is_finite() {
        return Err(Error::invalid(format!(
            "coordinates must be numeric, got ({}, {})",
            lon, lat
        )));
    }

    let n = 2_f64.powi(zoom as i32);

    let x = (lon + 180.0) / 360.0;

    let y = ((90.0 + clamp_lat(lat)) * PI / 360.0).tan().ln() / (PI / 180.0);
    let y = 1.0 - (y / 180.0 + 1.0) / 2.0;

    Ok(((x * n).max(0.0).min(n), (y * n).max(0.0).min(n)))
}

/// The tile containing a WGS84 point.
///
/// Points exactly on the east (lon 180) or south edge of the world land one
/// past the last tile index, which callers use as an exclusive bound.
pub fn wgs_to_tile(lon: f64, lat: f64, zoom: u8) -> Result<TileIndex> {
    let (x, y) = wgs_to_tile_position(lon, lat, zoom)?;

    Ok(TileIndex::new(x.floor() as u32, y.floor() as u32, zoom))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHINA_SAMPLES: &[(f64, f64)] = &[
        (116.3883, 39.9289),
        (121.47, 31.23),
        (113.26, 23.13),
        (87.6, 43.8),
        (126.6, 45.75),
    ];

    #[test]
    fn gcj_round_trip_inside_china() {
        for &(lon, lat) in CHINA_SAMPLES {
            let (g_lon, g_lat) = wgs_to_gcj(lon, lat);
            let (w_lon, w_lat) = gcj_to_wgs(g_lon, g_lat);
            assert!((w_lon - lon).abs() < 1e-4, "lon drift at {},{}", lon, lat);
            assert!((w_lat - lat).abs() < 1e-4, "lat drift at {},{}", lon, lat);
        }
    }

    #[test]
    fn gcj_offset_in_beijing() {
        let (lon, lat) = wgs_to_gcj(116.3883, 39.9289);
        assert!((lon - 116.394542).abs() < 1e-5);
        assert!((lat - 39.930300).abs() < 1e-5);
    }

    #[test]
    fn gcj_is_identity_outside_china() {
        for &(lon, lat) in &[(6.0402, 50.7929), (-74.006, 40.7128), (139.69, 35.68), (0.0, 0.0)] {
            assert_eq!(wgs_to_gcj(lon, lat), (lon, lat));
            assert_eq!(gcj_to_wgs(lon, lat), (lon, lat));
        }
    }

    #[test]
    fn geo_point_datum_conversion() {
        let wgs = GeoPoint::wgs84(121.47, 31.23);
        let gcj = wgs.to_gcj02();
        assert_eq!(gcj.datum, Datum::Gcj02);
        assert_eq!(gcj.to_gcj02(), gcj);

        let back = gcj.to_wgs84();
        assert_eq!(back.datum, Datum::Wgs84);
        assert!((back.lon - wgs.lon).abs() < 1e-4);
    }

    #[test]
    fn mercator_round_trip() {
        for &(lon, lat) in &[(116.3883, 39.9289), (-179.9, -85.0), (0.0, 0.0), (45.0, 60.0)] {
            let (r_lon, r_lat) = mercator_to_wgs(wgs_to_mercator(lon, lat));
            assert!((r_lon - lon).abs() < 1e-9);
            assert!((r_lat - lat).abs() < 1e-9);
        }
    }

    #[test]
    fn mercator_clamps_latitude() {
        let pole = wgs_to_mercator(180.0, 90.0);
        assert!((pole.x - MERCATOR_HALF_EXTENT).abs() < 1e-6);
        assert!((pole.y - MERCATOR_HALF_EXTENT).abs() < 1e-3);
        assert_eq!(
            wgs_to_mercator(10.0, -90.0),
            wgs_to_mercator(10.0, -MERCATOR_MAX_LAT)
        );
    }

    #[test]
    fn tile_index_beijing() {
        let tile = wgs_to_tile(116.3883, 39.9289, 10).unwrap();
        assert_eq!(tile, TileIndex::new(843, 387, 10));
    }

    #[test]
    fn tile_index_monotonic() {
        let mut last_x = 0;
        let mut lon = -180.0;
        while lon <= 180.0 {
            let tile = wgs_to_tile(lon, 12.0, 8).unwrap();
            assert!(tile.x >= last_x);
            last_x = tile.x;
            lon += 0.7;
        }

        let mut last_y = u32::MAX;
        let mut lat = -89.0;
        while lat <= 89.0 {
            let tile = wgs_to_tile(12.0, lat, 8).unwrap();
            assert!(tile.y <= last_y);
            last_y = tile.y;
            lat += 0.7;
        }
    }

    #[test]
    fn tile_rejects_bad_input() {
        assert!(matches!(
            wgs_to_tile(0.0, 0.0, 23),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            wgs_to_tile(f64::NAN, 0.0, 3),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            wgs_to_tile(0.0, f64::INFINITY, 3),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn world_edges_map_to_pyramid_bounds() {
        let (x, y) = wgs_to_tile_position(-180.0, 90.0, 0).unwrap();
        assert_eq!(x, 0.0);
        assert!(y < 1e-9);

        let (x, y) = wgs_to_tile_position(180.0, -90.0, 0).unwrap();
        assert_eq!(x, 1.0);
        assert!((y - 1.0).abs() < 1e-9);
    }
}
