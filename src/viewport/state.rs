//! Camera state, its limits and the screen/geographic mapping of the visible area

use serde::{Deserialize, Serialize};

use crate::cluster::point::{BoundingBox, LngLat, Point, wrap_longitude};
use crate::cluster::projection::{MAX_LATITUDE, project, unproject, world_size};

/// Zoom and pitch limits of the camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportLimits {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Maximum tilt in degrees
    pub max_pitch: f64,
}

impl Default for ViewportLimits {
    fn default() -> Self {
        ViewportLimits {
            min_zoom: 5.0,
            max_zoom: 23.0,
            max_pitch: 60.0,
        }
    }
}

/// Camera state of the map view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub center: LngLat,
    pub zoom: f64,
    /// Tilt in degrees, 0 looks straight down
    pub pitch: f64,
    /// Rotation in degrees clockwise from north
    pub bearing: f64,
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
}

impl ViewportState {
    pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
        ViewportState {
            center,
            zoom,
            pitch: 0.0,
            bearing: 0.0,
            width,
            height,
        }
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    /// Returns the state with every field inside `limits` and the projection's range
    pub fn clamped(mut self, limits: &ViewportLimits) -> Self {
        self.zoom = self.zoom.clamp(limits.min_zoom, limits.max_zoom);
        self.pitch = self.pitch.clamp(0.0, limits.max_pitch);
        self.bearing = wrap_longitude(self.bearing);
        self.center = LngLat::new(
            wrap_longitude(self.center.lon),
            self.center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        );
        self.width = self.width.max(0.0);
        self.height = self.height.max(0.0);
        self
    }

    /// World width in pixels at the current zoom
    pub fn world_size(&self) -> f64 {
        world_size(self.zoom)
    }

    /// Screen pixel position of a coordinate, `(0, 0)` being the top-left corner
    ///
    /// Pitch and bearing are not taken into account.
    pub fn project(&self, p: LngLat) -> (f64, f64) {
        let scale = self.world_size();
        let at = project(p);
        let center = project(self.center);
        (
            (at.0[0] - center.0[0]) * scale + self.width / 2.0,
            (at.0[1] - center.0[1]) * scale + self.height / 2.0,
        )
    }

    /// Coordinate under a screen pixel, inverse of [`ViewportState::project`]
    pub fn unproject(&self, x: f64, y: f64) -> LngLat {
        let scale = self.world_size();
        let center = project(self.center);
        unproject(&Point([
            center.0[0] + (x - self.width / 2.0) / scale,
            center.0[1] + (y - self.height / 2.0) / scale,
        ]))
    }

    /// Geographic box visible in the viewport
    ///
    /// Longitudes are left unwrapped so a view wider than the world spans more
    /// than 360 degrees; latitudes are limited to `[-90, 90]`.
    pub fn bounds(&self) -> BoundingBox {
        let north_west = self.unproject(0.0, 0.0);
        let south_east = self.unproject(self.width, self.height);
        BoundingBox::new(
            north_west.lon,
            south_east.lat.max(-90.0),
            south_east.lon,
            north_west.lat.min(90.0),
        )
    }
}
