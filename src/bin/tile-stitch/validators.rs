use std::str::FromStr;

use tile_stitch::{Fixture, GeoTarget, Provider, Style};

pub fn is_numeric_range(min: u64, max: u64) -> impl Fn(String) -> Result<(), String> {
    move |v: String| {
        let val = v.parse::<u64>().map_err(|_| "must be numeric".to_owned())?;

        if val < min || val > max {
            return Err(format!("must be between {} and {}", min, max));
        }

        Ok(())
    }
}

fn is_coord_within(v: &str, limit: f64) -> Result<(), String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if !(-limit..=limit).contains(&val) {
        return Err(format!("must be between -{0}° and {0}°", limit));
    }

    Ok(())
}

pub fn is_longitude(v: String) -> Result<(), String> {
    is_coord_within(&v, 180.0)
}

pub fn is_latitude(v: String) -> Result<(), String> {
    is_coord_within(&v, 90.0)
}

fn parses_as<T: FromStr>(v: &str, what: &str) -> Result<(), String> {
    v.parse::<T>()
        .map(|_| ())
        .map_err(|_| format!("invalid {}", what))
}

pub fn is_fixture(v: String) -> Result<(), String> {
    parses_as::<Fixture>(&v, "fixture")
}

pub fn is_provider(v: String) -> Result<(), String> {
    parses_as::<Provider>(&v, "map source")
}

pub fn is_style(v: String) -> Result<(), String> {
    parses_as::<Style>(&v, "style")
}

pub fn is_target(v: String) -> Result<(), String> {
    parses_as::<GeoTarget>(&v, "georeference target")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_range() {
        let rate = is_numeric_range(1, 20);
        assert!(rate("1".to_owned()).is_ok());
        assert!(rate("20".to_owned()).is_ok());
        assert!(rate("0".to_owned()).is_err());
        assert!(rate("21".to_owned()).is_err());
        assert!(rate("ten".to_owned()).is_err());
    }

    #[test]
    fn coordinates() {
        assert!(is_longitude("-180".to_owned()).is_ok());
        assert!(is_longitude("180.5".to_owned()).is_err());
        assert!(is_latitude("-90".to_owned()).is_ok());
        assert!(is_latitude("91".to_owned()).is_err());
    }

    #[test]
    fn named_values() {
        assert!(is_provider("tencent".to_owned()).is_ok());
        assert!(is_provider("osm".to_owned()).is_err());
        assert!(is_style("m".to_owned()).is_ok());
        assert!(is_style("satellite".to_owned()).is_err());
        assert!(is_target("gcj".to_owned()).is_ok());
        assert!(is_target("bd09".to_owned()).is_err());
        assert!(is_fixture("world".to_owned()).is_ok());
    }
}
