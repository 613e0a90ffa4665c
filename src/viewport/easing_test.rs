#[cfg(test)]
mod tests {
    use super::super::easing::*;
    use crate::cluster::LngLat;
    use crate::cluster::point::wrap_longitude;

    const EASINGS: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::Mapbox,
    ];

    #[test]
    fn test_easing_endpoints() {
        for easing in EASINGS {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
            assert_eq!(easing.apply(-0.5), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.5), 1.0, "{:?}", easing);
        }
        assert_eq!(Easing::default(), Easing::Mapbox);
    }

    #[test]
    fn test_easing_values() {
        assert!((Easing::Linear.apply(0.3) - 0.3).abs() < 1e-12);
        assert!((Easing::EaseOutCubic.apply(0.5) - 0.875).abs() < 1e-12);
        assert!((Easing::EaseInOutCubic.apply(0.5) - 0.5).abs() < 1e-12);
        assert!((Easing::EaseInOutCubic.apply(0.25) - 0.0625).abs() < 1e-12);
        // ease curves front-load the motion
        assert!(Easing::Mapbox.apply(0.5) > 0.5);
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in EASINGS {
            let mut last = 0.0;
            for i in 1..=200 {
                let v = easing.apply(i as f64 / 200.0);
                assert!(v >= last - 1e-9, "{:?} at {}", easing, i);
                assert!((0.0..=1.0).contains(&v));
                last = v;
            }
        }
    }

    #[test]
    fn test_fly_path_endpoints() {
        let philly = LngLat::new(-75.1652, 39.9526);
        let nyc = LngLat::new(-73.9857, 40.7484);
        let path = FlyToPath::new(philly, 12.0, nyc, 12.0, 1.414, 1280.0, 720.0);
        assert!(path.length() > 0.0);

        let (center, zoom) = path.at(0.0);
        assert!((center.lon - philly.lon).abs() < 1e-9);
        assert!((center.lat - philly.lat).abs() < 1e-9);
        assert!((zoom - 12.0).abs() < 1e-9);

        let (center, zoom) = path.at(1.0);
        assert!((center.lon - nyc.lon).abs() < 1e-6);
        assert!((center.lat - nyc.lat).abs() < 1e-6);
        assert!((zoom - 12.0).abs() < 1e-6);

        // the camera pulls out halfway through a long pan
        let (_, zoom) = path.at(0.5);
        assert!(zoom < 12.0);
    }

    #[test]
    fn test_fly_path_zoom_only() {
        let philly = LngLat::new(-75.1652, 39.9526);
        let path = FlyToPath::new(philly, 12.0, philly, 16.0, 1.414, 1280.0, 720.0);

        let (center, zoom) = path.at(0.5);
        assert!((zoom - 14.0).abs() < 1e-9);
        assert!((center.lon - philly.lon).abs() < 1e-9);
        assert!((center.lat - philly.lat).abs() < 1e-9);

        let (_, zoom) = path.at(1.0);
        assert!((zoom - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_fly_path_across_antimeridian() {
        let east = LngLat::new(179.0, 0.0);
        let west = LngLat::new(-179.0, 0.0);
        let path = FlyToPath::new(east, 12.0, west, 12.0, 1.414, 1280.0, 720.0);
        let short = FlyToPath::new(LngLat::new(1.0, 0.0), 12.0, LngLat::new(-1.0, 0.0), 12.0, 1.414, 1280.0, 720.0);
        assert!((path.length() - short.length()).abs() < 1e-9);

        let (center, _) = path.at(0.5);
        assert!((center.lon - 180.0).abs() < 1e-6);
        let (center, _) = path.at(1.0);
        assert!((wrap_longitude(center.lon) - west.lon).abs() < 1e-6);
    }

    #[test]
    fn test_fly_path_still() {
        let philly = LngLat::new(-75.1652, 39.9526);
        let path = FlyToPath::new(philly, 12.0, philly, 12.0, 1.414, 1280.0, 720.0);
        assert_eq!(path.length(), 0.0);
        let (center, zoom) = path.at(0.7);
        assert_eq!(zoom, 12.0);
        assert!((center.lon - philly.lon).abs() < 1e-9);
    }
}
