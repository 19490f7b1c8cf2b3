use std::fmt;

use thiserror::Error;

use crate::crs::Crs;

pub const LAT_DEG_MIN: f64 = -90.0;
pub const LAT_DEG_MAX: f64 = 90.0;
pub const LNG_DEG_MIN: f64 = -180.0;
pub const LNG_DEG_MAX: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPosition {
    #[error("Latitude out of range")]
    Latitude,
    #[error("Longitude out of range")]
    Longitude,
    #[error("Altitude is not a finite number")]
    Altitude,
}

/// A geographic position in degrees with an optional
/// altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
}

impl GeoPoint {
    pub fn try_new(
        latitude: f64,
        longitude: f64,
        altitude: Option<f64>,
    ) -> Result<Self, InvalidPosition> {
        if !is_valid_lat_deg(latitude) {
            return Err(InvalidPosition::Latitude);
        }
        if !is_valid_lng_deg(longitude) {
            return Err(InvalidPosition::Longitude);
        }
        if altitude.is_some_and(|alt| !alt.is_finite()) {
            return Err(InvalidPosition::Altitude);
        }
        Ok(Self {
            latitude,
            longitude,
            altitude,
        })
    }

    pub fn try_from_lat_lng_deg(latitude: f64, longitude: f64) -> Option<Self> {
        Self::try_new(latitude, longitude, None).ok()
    }

    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    pub const fn altitude(&self) -> Option<f64> {
        self.altitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)?;
        if let Some(alt) = self.altitude {
            write!(f, ",{alt}")?;
        }
        Ok(())
    }
}

fn is_valid_lat_deg(deg: f64) -> bool {
    deg.is_finite() && (LAT_DEG_MIN..=LAT_DEG_MAX).contains(&deg)
}

fn is_valid_lng_deg(deg: f64) -> bool {
    deg.is_finite() && (LNG_DEG_MIN..=LNG_DEG_MAX).contains(&deg)
}

/// A point geometry with `x = longitude` and `y = latitude`,
/// tagged with the coordinate reference system declared by
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointGeometry {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub crs: Crs,
}

impl PointGeometry {
    pub const fn from_point(pos: &GeoPoint, crs: Crs) -> Self {
        Self {
            x: pos.longitude,
            y: pos.latitude,
            z: pos.altitude,
            crs,
        }
    }

    /// Well-known text representation, e.g. `POINT(-75 40)`.
    pub fn to_wkt(&self) -> String {
        match self.z {
            Some(z) => format!("POINT Z({} {} {})", self.x, self.y, z),
            None => format!("POINT({} {})", self.x, self.y),
        }
    }
}

impl fmt::Display for PointGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_out_of_range_coordinates() {
        assert_eq!(
            GeoPoint::try_new(90.1, 0.0, None),
            Err(InvalidPosition::Latitude)
        );
        assert_eq!(
            GeoPoint::try_new(0.0, -180.5, None),
            Err(InvalidPosition::Longitude)
        );
        assert_eq!(
            GeoPoint::try_new(f64::NAN, 0.0, None),
            Err(InvalidPosition::Latitude)
        );
        assert_eq!(
            GeoPoint::try_new(0.0, 0.0, Some(f64::INFINITY)),
            Err(InvalidPosition::Altitude)
        );
        assert!(GeoPoint::try_from_lat_lng_deg(-90.0, 180.0).is_some());
    }

    #[test]
    fn geometry_swaps_axis_order() {
        let pos = GeoPoint::try_new(40.0, -75.0, None).unwrap();
        let geometry = PointGeometry::from_point(&pos, Crs::WGS84);
        assert_eq!(geometry.x, -75.0);
        assert_eq!(geometry.y, 40.0);
        assert_eq!(geometry.to_wkt(), "POINT(-75 40)");
    }

    #[test]
    fn geometry_with_altitude() {
        let pos = GeoPoint::try_new(52.5, 13.4, Some(34.0)).unwrap();
        let geometry = PointGeometry::from_point(&pos, Crs::WGS84);
        assert_eq!(geometry.to_wkt(), "POINT Z(13.4 52.5 34)");
        assert_eq!(pos.to_string(), "52.5,13.4,34");
    }
}
