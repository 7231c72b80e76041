//! Georeferencing of an assembled mosaic.
//!
//! The corners of a [`TileRectangle`] are unprojected from Web-Mercator to
//! WGS84 and optionally shifted between WGS84 and GCJ-02, then either shown
//! on screen or written as a pixel-to-coordinate link file for GIS tools.

use std::{fmt, fs, path::Path, str::FromStr};

use crate::coord::{gcj_to_wgs, mercator_to_wgs, wgs_to_gcj};
use crate::error::{Error, Result};
use crate::tile::{Corners, TileRectangle};

/// Datum step applied after unprojecting the corners.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GeoTarget {
    /// Report the corners as they come out of the projection.
    Keep,
    /// Shift the corners from WGS84 into GCJ-02.
    Gcj,
    /// Shift the corners from GCJ-02 back to WGS84.
    Wgs,
}

impl GeoTarget {
    pub fn name(self) -> &'static str {
        match self {
            GeoTarget::Keep => "keep",
            GeoTarget::Gcj => "gcj",
            GeoTarget::Wgs => "wgs",
        }
    }

    fn apply(self, (lon, lat): (f64, f64)) -> (f64, f64) {
        match self {
            GeoTarget::Keep => (lon, lat),
            GeoTarget::Gcj => wgs_to_gcj(lon, lat),
            GeoTarget::Wgs => gcj_to_wgs(lon, lat),
        }
    }
}

impl FromStr for GeoTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "keep" => Ok(GeoTarget::Keep),
            "gcj" => Ok(GeoTarget::Gcj),
            "wgs" => Ok(GeoTarget::Wgs),
            other => Err(Error::invalid(format!(
                "target must be one of keep, gcj, wgs, got `{}`",
                other
            ))),
        }
    }
}

/// Geographic (lon, lat) corners of the rectangle's outer edge.
pub fn geo_corners(rect: &TileRectangle, target: GeoTarget) -> Corners<(f64, f64)> {
    rect.mercator_corners()
        .map(mercator_to_wgs)
        .map(|p| target.apply(p))
}

/// Screen listing of a rectangle's geographic corners.
pub struct CornerReport {
    pub target: GeoTarget,
    pub corners: Corners<(f64, f64)>,
}

impl CornerReport {
    pub fn new(rect: &TileRectangle, target: GeoTarget) -> Self {
        Self {
            target,
            corners: geo_corners(rect, target),
        }
    }
}

impl fmt::Display for CornerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.corners;
        writeln!(f, "coordinates: {}", self.target.name())?;
        writeln!(f, "left top:     ({:.5},{:.5})", c.lt.0, c.lt.1)?;
        writeln!(f, "right top:    ({:.5},{:.5})", c.rt.0, c.rt.1)?;
        writeln!(f, "left bottom:  ({:.5},{:.5})", c.lb.0, c.lb.1)?;
        write!(f, "right bottom: ({:.5},{:.5})", c.rb.0, c.rb.1)
    }
}

/// The link file body: one `px, py, gx, gy` line per corner, in LT, LB, RT, RB
/// order.
pub fn link_file_contents(rect: &TileRectangle, target: GeoTarget) -> String {
    let pixels = rect.pixel_corners();
    let geo = geo_corners(rect, target);

    pixels
        .link_order()
        .into_iter()
        .zip(geo.link_order())
        .map(|((px, py), (gx, gy))| {
            format!(
                "{:.5}, {:.5}, {:.5}, {:.5}\n",
                *px as f64, *py as f64, gx, gy
            )
        })
        .collect()
}

/// Writes the link file for `rect` to `path`.
pub fn write_link_file(path: &Path, rect: &TileRectangle, target: GeoTarget) -> Result<()> {
    fs::write(path, link_file_contents(rect, target)).map_err(|e| Error::io(path, e))
}
