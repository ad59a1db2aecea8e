//! Geographic primitives for the Fiji dashboard map.
//!
//! Longitudes are not wrapped: the islands straddle the antimeridian, so the
//! map works in a continuous range that may exceed 180.
use serde::{Deserialize, Serialize};

/// Hard pan limits of the map (south-west / north-east corners).
pub const FIJI_BOUNDS: LatLngBounds =
    LatLngBounds::new(LatLng::new(-21.5, 174.5), LatLng::new(-15.0, 180.5));

/// Region the camera may wander in without being pulled back home.
pub const HOME_REGION: LatLngBounds =
    LatLngBounds::new(LatLng::new(-19.6, 176.6), LatLng::new(-15.9, 180.3));

pub const HOME_CENTER: LatLng = LatLng::new(-17.7134, 178.065);
pub const HOME_ZOOM: f64 = 8.0;

pub const MIN_ZOOM: f64 = 6.0;
pub const MAX_ZOOM: f64 = 13.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lon: f64) -> Self {
        LatLng { lat, lon }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// Axis-aligned lat/lon rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub const fn new(south_west: LatLng, north_east: LatLng) -> Self {
        LatLngBounds {
            south_west,
            north_east,
        }
    }

    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    pub fn west(&self) -> f64 {
        self.south_west.lon
    }

    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    pub fn east(&self) -> f64 {
        self.north_east.lon
    }

    /// (latitude span, longitude span) in degrees.
    pub fn span(&self) -> (f64, f64) {
        (self.north() - self.south(), self.east() - self.west())
    }

    /// Edges are inclusive.
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south() && p.lat <= self.north() && p.lon >= self.west() && p.lon <= self.east()
    }

    pub fn contains_bounds(&self, other: &LatLngBounds) -> bool {
        self.contains(other.south_west) && self.contains(other.north_east)
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south() + self.north()) / 2.0,
            (self.west() + self.east()) / 2.0,
        )
    }

    /// Nearest point inside the rectangle.
    pub fn clamp(&self, p: LatLng) -> LatLng {
        LatLng::new(
            p.lat.clamp(self.south(), self.north()),
            p.lon.clamp(self.west(), self.east()),
        )
    }

    /// Finite coordinates and south-west strictly below/left of north-east.
    pub fn is_valid(&self) -> bool {
        let finite = [self.south(), self.west(), self.north(), self.east()]
            .iter()
            .all(|v| v.is_finite());
        finite && self.south() < self.north() && self.west() < self.east()
    }
}
