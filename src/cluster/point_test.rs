#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::GeoClusterError;

    #[test]
    fn test_geo_point_validation() {
        let p = GeoPoint::new(1u64, -75.1652, 39.9526, Properties::new()).expect("valid point");
        assert_eq!(p.id(), &PointId::from("1"));
        assert_eq!(p.lng_lat(), LngLat::new(-75.1652, 39.9526));

        assert!(matches!(
            GeoPoint::new("a", f64::NAN, 39.9, Properties::new()),
            Err(GeoClusterError::InvalidPoint { .. })
        ));
        assert!(matches!(
            GeoPoint::new("b", -75.1, 91.0, Properties::new()),
            Err(GeoClusterError::InvalidPoint { .. })
        ));
        assert!(GeoPoint::new("c", 181.0, 0.0, Properties::new()).is_err());
        assert!(GeoPoint::new("d", 180.0, -90.0, Properties::new()).is_ok());
    }

    #[test]
    fn test_raw_record_into_point() {
        let mut properties = Properties::new();
        properties.insert("category".to_string(), "Thefts".into());

        let record = RawRecord {
            id: "17".to_string(),
            longitude: Some(-75.16),
            latitude: Some(39.95),
            properties: properties.clone(),
        };
        let point = record.into_point().expect("record has coordinates");
        assert_eq!(point.properties(), &properties);

        let missing = RawRecord {
            id: "18".to_string(),
            longitude: Some(-75.16),
            latitude: None,
            properties: Properties::new(),
        };
        match missing.into_point() {
            Err(GeoClusterError::InvalidPoint { id, reason }) => {
                assert_eq!(id, "18");
                assert!(reason.contains("latitude"));
            }
            other => panic!("expected InvalidPoint, got {:?}", other),
        }
    }

    #[test]
    fn test_bounding_box_contains() {
        let philly = BoundingBox::new(-75.3, 39.8, -74.9, 40.1);
        assert!(philly.contains(LngLat::new(-75.1652, 39.9526)));
        assert!(!philly.contains(LngLat::new(-73.9, 40.7)));

        // crosses the antimeridian
        let pacific = BoundingBox::new(170.0, -20.0, -170.0, 20.0);
        assert!(pacific.contains(LngLat::new(175.0, 0.0)));
        assert!(pacific.contains(LngLat::new(-175.0, 0.0)));
        assert!(!pacific.contains(LngLat::new(0.0, 0.0)));

        assert!(BoundingBox::WORLD.contains(LngLat::new(180.0, 90.0)));
        assert!(BoundingBox::new(-400.0, -90.0, 400.0, 90.0).contains(LngLat::new(12.0, 3.0)));
    }

    #[test]
    fn test_inside() {
        let min = Point([0.1, 0.1]);
        let max = Point([0.2, 0.3]);
        assert!(point::inside(&Point([0.1, 0.3]), &min, &max));
        assert!(!point::inside(&Point([0.05, 0.2]), &min, &max));
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(point::wrap_longitude(190.0), -170.0);
        assert_eq!(point::wrap_longitude(-190.0), 170.0);
        assert_eq!(point::wrap_longitude(180.0), -180.0);
        assert_eq!(point::wrap_longitude(-75.0), -75.0);
    }
}
