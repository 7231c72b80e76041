use anyhow::{Context, Result};
use clap::{
    app_from_crate, crate_authors, crate_description, crate_name, crate_version,
    AppSettings, Arg, ArgMatches,
};
use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::validators::*;
use tile_stitch::{Config, Fixture, GeoTarget, Provider, Region, Style};

const LON1_ARG: &str = "lon1";
const LAT1_ARG: &str = "lat1";
const LON2_ARG: &str = "lon2";
const LAT2_ARG: &str = "lat2";
const FIXTURE_ARG: &str = "fixture";
const ZOOM_ARG: &str = "zoom";
const SOURCE_ARG: &str = "source";
const STYLE_ARG: &str = "style";
const PARALLEL_FETCHES_ARG: &str = "num_parallel";
const REQUEST_RETRIES_ARG: &str = "num_retries";
const TIMEOUT_ARG: &str = "timeout";
const CACHE_DIR_ARG: &str = "cache_dir";
const NO_CACHE_ARG: &str = "no_cache";
const OUTPUT_ARG: &str = "output";
const GEOREF_ARG: &str = "georef";
const LINK_FILE_ARG: &str = "link_file";
const DRY_RUN_ARG: &str = "dry_run";
const QUIET_ARG: &str = "quiet";
const VERBOSE_ARG: &str = "verbose";

pub struct Args {
    pub region: Region,
    pub zoom: u8,
    pub provider: Provider,
    pub style: Style,
    pub parallel_fetches: u8,
    pub attempts: u8,
    pub timeout: Duration,
    pub cache_dir: Option<PathBuf>,
    pub output_name: String,
    pub georef: Option<GeoTarget>,
    pub link_file: Option<PathBuf>,
    pub dry_run: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl std::convert::From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            concurrency: args.parallel_fetches,
            request_attempts: args.attempts,
            timeout: args.timeout,
            cache_dir: args.cache_dir.clone(),
            output_name: args.output_name.clone(),
            show_progress: !args.quiet,
            ..Config::new(args.region, args.zoom, args.provider, args.style)
        }
    }
}

impl Args {
    pub fn parse() -> Result<Self> {
        let matches = get_matches();

        let region = match matches.value_of(FIXTURE_ARG) {
            // a fixture replaces the four corner coordinates
            Some(f) => Region::from(
                f.parse::<Fixture>()
                    .map_err(|e| anyhow::anyhow!("{}: {}", e, f))?,
            ),
            None => Region::new_deg(
                value(&matches, LON1_ARG)?,
                value(&matches, LAT1_ARG)?,
                value(&matches, LON2_ARG)?,
                value(&matches, LAT2_ARG)?,
            )?,
        };

        let cache_dir = if matches.is_present(NO_CACHE_ARG) {
            None
        } else {
            Some(PathBuf::from(required(&matches, CACHE_DIR_ARG)?))
        };

        Ok(Self {
            region,
            cache_dir,
            zoom: value(&matches, ZOOM_ARG)?,
            provider: value(&matches, SOURCE_ARG)?,
            style: value(&matches, STYLE_ARG)?,
            parallel_fetches: value(&matches, PARALLEL_FETCHES_ARG)?,
            attempts: value(&matches, REQUEST_RETRIES_ARG)?,
            timeout: Duration::from_secs(value(&matches, TIMEOUT_ARG)?),
            output_name: required(&matches, OUTPUT_ARG)?.to_owned(),
            georef: matches
                .value_of(GEOREF_ARG)
                .map(str::parse::<GeoTarget>)
                .transpose()?,
            link_file: matches.value_of(LINK_FILE_ARG).map(PathBuf::from),
            dry_run: matches.is_present(DRY_RUN_ARG),
            quiet: matches.is_present(QUIET_ARG),
            verbose: matches.is_present(VERBOSE_ARG),
        })
    }
}

fn required<'a>(matches: &'a ArgMatches<'_>, name: &str) -> Result<&'a str> {
    matches
        .value_of(name)
        .with_context(|| format!("missing argument `{}`", name))
}

fn value<T>(matches: &ArgMatches<'_>, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = required(matches, name)?;
    raw.parse()
        .with_context(|| format!("invalid value `{}` for `{}`", raw, name))
}

fn get_matches() -> ArgMatches<'static> {
    app_from_crate!()
        .setting(AppSettings::GlobalVersion)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name(LON1_ARG)
                .help("Longitude of the north-west corner (in degrees)")
                .required_unless(FIXTURE_ARG)
                .validator(is_longitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("lon1"),
        )
        .arg(
            Arg::with_name(LAT1_ARG)
                .help("Latitude of the north-west corner (in degrees)")
                .required_unless(FIXTURE_ARG)
                .validator(is_latitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("lat1"),
        )
        .arg(
            Arg::with_name(LON2_ARG)
                .help("Longitude of the south-east corner (in degrees)")
                .required_unless(FIXTURE_ARG)
                .validator(is_longitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("lon2"),
        )
        .arg(
            Arg::with_name(LAT2_ARG)
                .help("Latitude of the south-east corner (in degrees)")
                .required_unless(FIXTURE_ARG)
                .validator(is_latitude)
                .takes_value(true)
                .allow_hyphen_values(true)
                .long("lat2"),
        )
        .arg(
            Arg::with_name(FIXTURE_ARG)
                .help("Use a known, named region (world, beijing)")
                .validator(is_fixture)
                .takes_value(true)
                .short("f")
                .long("fixture"),
        )
        .arg(
            Arg::with_name(ZOOM_ARG)
                .help("The zoom level to fetch, 0 to 22")
                .validator(is_numeric_range(0, 22))
                .required(true)
                .takes_value(true)
                .short("z")
                .long("zoom"),
        )
        .arg(
            Arg::with_name(SOURCE_ARG)
                .help("The map source: google, amap or tencent")
                .validator(is_provider)
                .default_value("google")
                .takes_value(true)
                .short("S")
                .long("source"),
        )
        .arg(
            Arg::with_name(STYLE_ARG)
                .help("The imagery style: `s` for satellite, `m` for map")
                .validator(is_style)
                .default_value("s")
                .takes_value(true)
                .long("style"),
        )
        .arg(
            Arg::with_name(PARALLEL_FETCHES_ARG)
                .help("The amount of tiles fetched in parallel, 1 to 20.")
                .validator(is_numeric_range(1, 20))
                .default_value("10")
                .takes_value(true)
                .short("r")
                .long("rate"),
        )
        .arg(
            Arg::with_name(REQUEST_RETRIES_ARG)
                .help("How many times a tile is requested before it is left blank.")
                .validator(is_numeric_range(1, 255))
                .default_value("3")
                .takes_value(true)
                .long("retries"),
        )
        .arg(
            Arg::with_name(TIMEOUT_ARG)
                .help("The timeout (in seconds) for a single tile request. Pass 0 for no timeout.")
                .validator(is_numeric_range(0, u64::MAX))
                .default_value("10")
                .takes_value(true)
                .short("t")
                .long("timeout"),
        )
        .arg(
            Arg::with_name(CACHE_DIR_ARG)
                .help("The folder downloaded tiles are cached in. Cached tiles are never fetched again. Tiles are keyed by source, zoom and output name, not by style; use a distinct --output per style.")
                .default_value(".")
                .takes_value(true)
                .long("cache-dir"),
        )
        .arg(
            Arg::with_name(NO_CACHE_ARG)
                .help("Neither read nor write the tile cache")
                .takes_value(false)
                .long("no-cache"),
        )
        .arg(
            Arg::with_name(OUTPUT_ARG)
                .help("Name of the output image; the format follows the extension (png or jpg). The file is prefixed with the source, a hash of the region and the zoom.")
                .default_value("MAP_OUT.png")
                .takes_value(true)
                .short("o")
                .long("output"),
        )
        .arg(
            Arg::with_name(GEOREF_ARG)
                .help("Report the image corners: `keep` as downloaded, `gcj` converted WGS84 to GCJ-02, `wgs` converted GCJ-02 to WGS84")
                .validator(is_target)
                .takes_value(true)
                .short("g")
                .long("georef"),
        )
        .arg(
            Arg::with_name(LINK_FILE_ARG)
                .help("Write the corners as a GIS link file instead of printing them")
                .requires(GEOREF_ARG)
                .takes_value(true)
                .long("link-file"),
        )
        .arg(
            Arg::with_name(DRY_RUN_ARG)
                .help("Don't actually fetch anything, just determine how many tiles would be fetched.")
                .takes_value(false)
                .long("dry-run"),
        )
        .arg(
            Arg::with_name(QUIET_ARG)
                .help("Hide the progress bar")
                .takes_value(false)
                .short("q")
                .long("quiet"),
        )
        .arg(
            Arg::with_name(VERBOSE_ARG)
                .help("Log every tile request")
                .takes_value(false)
                .short("v")
                .long("verbose"),
        )
        .get_matches()
}
