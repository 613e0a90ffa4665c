//! Clustering options and the zoom range they cover

use serde::{Deserialize, Serialize};

use crate::error::{GeoClusterError, Result};

/// Highest zoom the cluster id encoding can carry (5 bits hold `zoom + 1`)
pub const MAX_SUPPORTED_ZOOM: u8 = 30;

/// Clustering configuration
///
/// Clustering applies to integer zooms in `[min_zoom, max_zoom)`; outside that
/// range queries return the raw points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Cluster radius in screen pixels
    pub radius: f64,
    /// Lowest zoom level that is clustered
    pub min_zoom: u8,
    /// First zoom level at which every point is shown on its own
    pub max_zoom: u8,
    /// Minimum number of points to form a cluster
    pub min_points: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        ClusterOptions {
            radius: 100.0,
            min_zoom: 5,
            max_zoom: 23,
            min_points: 2,
        }
    }
}

impl ClusterOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GeoClusterError::InvalidOptions(format!(
                "radius must be a positive number of pixels, got {}",
                self.radius
            )));
        }
        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(GeoClusterError::InvalidOptions(format!(
                "max_zoom {} exceeds {}",
                self.max_zoom, MAX_SUPPORTED_ZOOM
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(GeoClusterError::InvalidOptions(format!(
                "min_zoom {} is above max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.min_points < 2 {
            return Err(GeoClusterError::InvalidOptions(
                "min_points must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    /// Integer zoom level whose nodes answer a query at `zoom`
    ///
    /// Zooms outside `[min_zoom, max_zoom)` map to `max_zoom`, the level of raw points.
    pub fn level_for(&self, zoom: f64) -> u8 {
        let z = zoom.floor();
        if z < self.min_zoom as f64 || z >= self.max_zoom as f64 {
            self.max_zoom
        } else {
            z as u8
        }
    }
}
