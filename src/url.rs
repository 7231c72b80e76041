use maplit::hashmap;
use std::{fmt, str::FromStr};
use strfmt::strfmt;

use crate::error::{Error, Result};
use crate::tile::TileIndex;

const GOOGLE_URL: &str =
    "http://mt2.google.cn/vt/lyrs={style}&hl=zh-CN&gl=CN&src=app&x={x}&y={y}&z={z}";
const AMAP_URL: &str = "http://wprd02.is.autonavi.com/appmaptile?style={style}&x={x}&y={y}&z={z}";
const TENCENT_SATELLITE_URL: &str = "http://p3.map.gtimg.com/sateTiles/{z}/{fx}/{fy}/{x}_{y}.jpg";
const TENCENT_MAP_URL: &str = "http://rt0.map.gtimg.com/tile?z={z}&x={x}&y={y}&styleid=3";

const AMAP_SATELLITE_STYLE: u8 = 6;
const AMAP_MAP_STYLE: u8 = 7;

/// Tencent stores satellite tiles in directories of 16x16.
const TENCENT_BUCKET: u32 = 16;

/// A supported tile provider.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Provider {
    Google,
    Amap,
    Tencent,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Google, Provider::Amap, Provider::Tencent];

    pub fn name(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Amap => "amap",
            Provider::Tencent => "tencent",
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Provider::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnsupportedSource(s.to_owned()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Imagery style of a tile.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Style {
    Satellite,
    Map,
}

impl Style {
    pub fn token(self) -> &'static str {
        match self {
            Style::Satellite => "s",
            Style::Map => "m",
        }
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "s" => Ok(Style::Satellite),
            "m" => Ok(Style::Map),
            other => Err(Error::invalid(format!(
                "style must be `s` or `m`, got `{}`",
                other
            ))),
        }
    }
}

/// A provider and style pair, able to build the URL of any tile.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TileSource {
    pub provider: Provider,
    pub style: Style,
}

impl TileSource {
    pub fn new(provider: Provider, style: Style) -> Self {
        Self { provider, style }
    }

    /// Formats the URL for `tile`. Pure, no network access.
    pub fn tile_url(&self, tile: &TileIndex) -> Result<String> {
        let (template, vars) = match self.provider {
            Provider::Google => (
                GOOGLE_URL,
                hashmap! {
                    "style".to_owned() => self.style.token().to_owned(),
                    "x".to_owned() => tile.x.to_string(),
                    "y".to_owned() => tile.y.to_string(),
                    "z".to_owned() => tile.z.to_string(),
                },
            ),
            Provider::Amap => {
                let style = match self.style {
                    Style::Satellite => AMAP_SATELLITE_STYLE,
                    Style::Map => AMAP_MAP_STYLE,
                };

                (
                    AMAP_URL,
                    hashmap! {
                        "style".to_owned() => style.to_string(),
                        "x".to_owned() => tile.x.to_string(),
                        "y".to_owned() => tile.y.to_string(),
                        "z".to_owned() => tile.z.to_string(),
                    },
                )
            }
            Provider::Tencent => {
                // tencent's pyramid has its origin at the bottom left
                let y = 1u64
                    .checked_shl(tile.z as u32)
                    .and_then(|rows| (rows - 1).checked_sub(tile.y as u64))
                    .ok_or_else(|| {
                        Error::invalid(format!(
                            "tile row {} out of range at zoom {}",
                            tile.y, tile.z
                        ))
                    })?;

                match self.style {
                    Style::Satellite => (
                        TENCENT_SATELLITE_URL,
                        hashmap! {
                            "fx".to_owned() => (tile.x / TENCENT_BUCKET).to_string(),
                            "fy".to_owned() => (y / TENCENT_BUCKET as u64).to_string(),
                            "x".to_owned() => tile.x.to_string(),
                            "y".to_owned() => y.to_string(),
                            "z".to_owned() => tile.z.to_string(),
                        },
                    ),
                    Style::Map => (
                        TENCENT_MAP_URL,
                        hashmap! {
                            "x".to_owned() => tile.x.to_string(),
                            "y".to_owned() => y.to_string(),
                            "z".to_owned() => tile.z.to_string(),
                        },
                    ),
                }
            }
        };

        strfmt(template, &vars).map_err(|e| Error::invalid(format!("failed formatting URL: {}", e)))
    }
}
