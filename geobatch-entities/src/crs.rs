use std::{fmt, str::FromStr};

use thiserror::Error;

/// EPSG codes of common geographic (latitude/longitude)
/// coordinate reference systems.
const GEOGRAPHIC_EPSG_CODES: &[u32] = &[
    4326, // WGS 84
    4258, // ETRS89
    4269, // NAD83
    4267, // NAD27
    4283, // GDA94
    7844, // GDA2020
    4674, // SIRGAS 2000
    4490, // CGCS2000
    6668, // JGD2011
    4322, // WGS 72
];

/// A coordinate reference system identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    pub const WGS84: Self = Self::epsg(4326);

    pub const fn epsg(code: u32) -> Self {
        Self { epsg: code }
    }

    pub const fn code(&self) -> u32 {
        self.epsg
    }

    /// Whether coordinates in this system are plain degrees of
    /// latitude and longitude, as returned by geocoding providers.
    pub fn is_geographic(&self) -> bool {
        GEOGRAPHIC_EPSG_CODES.contains(&self.epsg)
    }

    /// OGC URN, e.g. `urn:ogc:def:crs:EPSG::4326`.
    pub fn to_urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid CRS identifier '{0}'")]
pub struct CrsParseError(String);

impl FromStr for Crs {
    type Err = CrsParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
            Some(_) => return Err(CrsParseError(s.to_owned())),
            None => trimmed,
        };
        code.trim()
            .parse::<u32>()
            .ok()
            .filter(|code| *code > 0)
            .map(Self::epsg)
            .ok_or_else(|| CrsParseError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_epsg_identifiers() {
        assert_eq!("EPSG:4326".parse::<Crs>().unwrap(), Crs::WGS84);
        assert_eq!("epsg:3395".parse::<Crs>().unwrap(), Crs::epsg(3395));
        assert_eq!(" 25832 ".parse::<Crs>().unwrap().code(), 25832);
        assert!("OGC:CRS84".parse::<Crs>().is_err());
        assert!("EPSG:".parse::<Crs>().is_err());
        assert!("EPSG:0".parse::<Crs>().is_err());
        assert!("mercator".parse::<Crs>().is_err());
    }

    #[test]
    fn display_round_trip() {
        let crs = Crs::epsg(4258);
        assert_eq!(crs.to_string(), "EPSG:4258");
        assert_eq!(crs.to_string().parse::<Crs>().unwrap(), crs);
        assert_eq!(crs.to_urn(), "urn:ogc:def:crs:EPSG::4258");
    }

    #[test]
    fn projected_systems_are_not_geographic() {
        assert!(Crs::default().is_geographic());
        assert!(!Crs::epsg(3395).is_geographic());
        assert!(!Crs::epsg(3857).is_geographic());
    }
}
