#[cfg(test)]
mod tests {
    use crate::cluster::LngLat;
    use crate::cluster::projection::{
        MAX_LATITUDE, lat_y, lng_x, pixels_to_world, project, unproject, world_size, x_lng, y_lat,
    };

    #[test]
    fn test_mercator_edges() {
        assert_eq!(lng_x(-180.0), 0.0);
        assert_eq!(lng_x(0.0), 0.5);
        assert_eq!(lng_x(180.0), 1.0);
        assert_eq!(lat_y(0.0), 0.5);
        assert!(lat_y(MAX_LATITUDE).abs() < 1e-9);
        assert!((lat_y(-MAX_LATITUDE) - 1.0).abs() < 1e-9);
        // poles are pinned to the square
        assert_eq!(lat_y(90.0), 0.0);
        assert_eq!(lat_y(-90.0), 1.0);
    }

    #[test]
    fn test_inverse_projection() {
        let philly = LngLat::new(-75.1652, 39.9526);
        let back = unproject(&project(philly));
        assert!((back.lon - philly.lon).abs() < 1e-9);
        assert!((back.lat - philly.lat).abs() < 1e-9);

        assert!((x_lng(0.25) + 90.0).abs() < 1e-12);
        assert!(y_lat(0.5).abs() < 1e-12);
    }

    #[test]
    fn test_world_size() {
        assert_eq!(world_size(0.0), 512.0);
        assert_eq!(world_size(3.0), 4096.0);
        assert_eq!(pixels_to_world(100.0, 0.0), 100.0 / 512.0);
        assert_eq!(pixels_to_world(512.0, 1.0), 0.5);
    }
}
