//! Geographic points, records and bounding boxes

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeoClusterError, Result};

/// Domain attributes attached to a point (e.g. incident category)
///
/// The clustering never reads them; they are carried through to the
/// rendered [`Cluster`](super::Cluster) unchanged.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Opaque identifier of a source record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub String);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        PointId(id.to_string())
    }
}

impl From<String> for PointId {
    fn from(id: String) -> Self {
        PointId(id)
    }
}

impl From<u64> for PointId {
    fn from(id: u64) -> Self {
        PointId(id.to_string())
    }
}

/// Point is a position in the unit Web Mercator square
///
/// - `[0]` is x, growing eastwards from the antimeridian
/// - `[1]` is y, growing southwards from the northern Mercator limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub [f64; 2]);

impl Point {
    /// Returns squared euclidean distance between two points
    pub fn sq_dist(&self, b: &Point) -> f64 {
        let dx = self.0[0] - b.0[0];
        let dy = self.0[1] - b.0[1];
        dx * dx + dy * dy
    }

    /// Checks if this point is less than or equal to another point
    /// (a <= b)
    pub fn less_eq(&self, b: &Point) -> bool {
        self.0[0] <= b.0[0] && self.0[1] <= b.0[1]
    }

    /// Checks if this point is greater than or equal to another point
    /// (a >= b)
    pub fn greater_eq(&self, b: &Point) -> bool {
        self.0[0] >= b.0[0] && self.0[1] >= b.0[1]
    }
}

/// Checks if `p` is inside the (min, max) rectangle, edges inclusive
pub fn inside(p: &Point, min: &Point, max: &Point) -> bool {
    p.greater_eq(min) && p.less_eq(max)
}

/// A (longitude, latitude) pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lon: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        LngLat { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// GeoPoint is an immutable, validated point feature
///
/// Both coordinates are finite, longitude is within `[-180, 180]` and
/// latitude within `[-90, 90]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    id: PointId,
    longitude: f64,
    latitude: f64,
    properties: Properties,
}

impl GeoPoint {
    /// Creates a point, rejecting coordinates that cannot be placed on a map
    pub fn new(
        id: impl Into<PointId>,
        longitude: f64,
        latitude: f64,
        properties: Properties,
    ) -> Result<Self> {
        let id = id.into();
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoClusterError::InvalidPoint {
                id: id.0,
                reason: format!("longitude {longitude} is out of range"),
            });
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoClusterError::InvalidPoint {
                id: id.0,
                reason: format!("latitude {latitude} is out of range"),
            });
        }

        Ok(GeoPoint {
            id,
            longitude,
            latitude,
            properties,
        })
    }

    pub fn id(&self) -> &PointId {
        &self.id
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn lng_lat(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// RawRecord is what a point-set provider hands over before validation
///
/// Source rows frequently lack coordinates, so both are optional here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    #[serde(default)]
    pub properties: Properties,
}

impl RawRecord {
    /// Validates the record into a [`GeoPoint`]
    pub fn into_point(self) -> Result<GeoPoint> {
        let (longitude, latitude) = match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => (lon, lat),
            (None, _) => {
                return Err(GeoClusterError::InvalidPoint {
                    id: self.id,
                    reason: "longitude is missing".to_string(),
                });
            }
            (_, None) => {
                return Err(GeoClusterError::InvalidPoint {
                    id: self.id,
                    reason: "latitude is missing".to_string(),
                });
            }
        };
        GeoPoint::new(self.id, longitude, latitude, self.properties)
    }
}

/// BoundingBox is the visible geographic rectangle `[west, south, east, north]`
///
/// `west > east` means the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Box covering every valid coordinate
    pub const WORLD: BoundingBox = BoundingBox {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };

    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        BoundingBox {
            west,
            south,
            east,
            north,
        }
    }

    /// Builds a box from the `[west, south, east, north]` array a map surface reports
    pub fn from_array(bbox: [f64; 4]) -> Self {
        BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3])
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Checks whether a coordinate lies inside the box (edges inclusive)
    pub fn contains(&self, p: LngLat) -> bool {
        if p.lat < self.south || p.lat > self.north {
            return false;
        }
        if self.east - self.west >= 360.0 {
            return true;
        }
        let west = wrap_longitude(self.west);
        let east = if self.east == 180.0 {
            180.0
        } else {
            wrap_longitude(self.east)
        };
        if west <= east {
            p.lon >= west && p.lon <= east
        } else {
            p.lon >= west || p.lon <= east
        }
    }
}

/// Wraps a longitude into `[-180, 180)`
pub fn wrap_longitude(lon: f64) -> f64 {
    ((lon + 180.0) % 360.0 + 360.0) % 360.0 - 180.0
}
