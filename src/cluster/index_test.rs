#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use quickcheck::quickcheck;

    use crate::cluster::{
        BoundingBox, ClusterIndex, ClusterOptions, GeoPoint, Properties, RawRecord, get_clusters,
    };
    use crate::error::GeoClusterError;

    fn pt(id: u64, lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(id, lon, lat, Properties::new()).expect("valid point")
    }

    fn from_coords(coords: &[(u16, u16)]) -> Vec<GeoPoint> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(a, b))| {
                pt(
                    i as u64,
                    -75.3 + a as f64 / 65535.0 * 0.4,
                    39.8 + b as f64 / 65535.0 * 0.3,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_index() {
        let index = ClusterIndex::build(Vec::new(), ClusterOptions::default()).expect("index");
        assert!(index.is_empty());
        for zoom in [0.0, 5.0, 12.5, 23.0, 40.0] {
            assert!(index.query(&BoundingBox::WORLD, zoom).is_empty());
        }
    }

    #[test]
    fn test_levels_cover_zoom_range() {
        let options = ClusterOptions::default();
        let index = ClusterIndex::build(vec![pt(1, -75.16, 39.95)], options.clone()).expect("index");
        assert!(index.level(options.min_zoom - 1).is_none());
        assert!(index.level(options.max_zoom + 1).is_none());
        for zoom in options.min_zoom..=options.max_zoom {
            let level = index.level(zoom).expect("level in range");
            assert_eq!(level.zoom, zoom);
            assert_eq!(level.nodes.len(), 1);
        }
    }

    #[test]
    fn test_invalid_options() {
        let options = ClusterOptions {
            min_zoom: 12,
            max_zoom: 10,
            ..ClusterOptions::default()
        };
        assert!(matches!(
            ClusterIndex::build(Vec::new(), options),
            Err(GeoClusterError::InvalidOptions(_))
        ));

        let options = ClusterOptions {
            max_zoom: 31,
            ..ClusterOptions::default()
        };
        assert!(ClusterIndex::build(Vec::new(), options).is_err());

        let options = ClusterOptions {
            radius: 0.0,
            ..ClusterOptions::default()
        };
        assert!(ClusterIndex::build(Vec::new(), options).is_err());
    }

    #[test]
    fn test_from_records_skips_missing_coordinates() {
        let records = vec![
            RawRecord {
                id: "1".to_string(),
                longitude: Some(-75.16),
                latitude: Some(39.95),
                properties: Properties::new(),
            },
            RawRecord {
                id: "2".to_string(),
                longitude: None,
                latitude: Some(39.95),
                properties: Properties::new(),
            },
            RawRecord {
                id: "3".to_string(),
                longitude: Some(f64::INFINITY),
                latitude: Some(39.95),
                properties: Properties::new(),
            },
            RawRecord {
                id: "4".to_string(),
                longitude: Some(-75.17),
                latitude: Some(39.96),
                properties: Properties::new(),
            },
        ];
        let index = ClusterIndex::from_records(records, ClusterOptions::default()).expect("index");
        assert_eq!(index.len(), 2);
        let ids: Vec<&str> = index.points().iter().map(|p| p.id().0.as_str()).collect();
        assert_eq!(ids, vec!["4", "1"]);
    }

    #[test]
    fn test_query_respects_bounds() {
        let points = vec![
            pt(1, -75.16, 39.95),
            pt(2, -73.99, 40.73),
            pt(3, 2.35, 48.85),
        ];
        let index = ClusterIndex::build(points, ClusterOptions::default()).expect("index");
        let philly = BoundingBox::new(-75.3, 39.8, -74.9, 40.1);
        let nodes = index.query(&philly, 23.0);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].count, 1);

        assert_eq!(index.query(&BoundingBox::WORLD, 23.0).len(), 3);
        assert!(index.query(&BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0), 23.0).is_empty());
        assert!(index.query(&BoundingBox::WORLD, f64::NAN).is_empty());
    }

    #[test]
    fn test_query_across_antimeridian() {
        let points = vec![pt(1, 179.5, 0.0), pt(2, -179.5, 0.0), pt(3, 0.0, 0.0)];
        let index = ClusterIndex::build(points, ClusterOptions::default()).expect("index");

        let nodes = index.query(&BoundingBox::new(179.0, -1.0, -179.0, 1.0), 23.0);
        assert_eq!(nodes.len(), 2);

        // same box expressed with an unwrapped eastern edge
        let nodes = index.query(&BoundingBox::new(179.0, -1.0, 181.0, 1.0), 23.0);
        assert_eq!(nodes.len(), 2);

        let nodes = index.query(&BoundingBox::new(-500.0, -1.0, 500.0, 1.0), 23.0);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_parents_link_levels() {
        let points = vec![pt(1, -75.160000, 39.950000), pt(2, -75.160001, 39.950001)];
        let options = ClusterOptions::default();
        let index = ClusterIndex::build(points, options.clone()).expect("index");

        let leaves = &index.level(options.max_zoom).expect("leaf level").nodes;
        let parent = leaves[0].parent.expect("leaf merged one level up");
        assert_eq!(leaves[1].parent, Some(parent));

        let merged = &index.level(options.max_zoom - 1).expect("level").nodes;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, parent);
        assert_eq!(merged[0].count, 2);
        assert!(merged[0].is_aggregate());
    }

    #[test]
    fn test_index_is_shared_across_threads() {
        let points = (0..50)
            .map(|i| pt(i, -75.2 + i as f64 * 0.002, 39.95))
            .collect();
        let index = Arc::new(ClusterIndex::build(points, ClusterOptions::default()).expect("index"));

        let handles: Vec<_> = (5..15)
            .map(|zoom| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    get_clusters(&index, zoom as f64, Some(&BoundingBox::WORLD))
                        .iter()
                        .map(|c| c.point_count)
                        .sum::<usize>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("query thread"), 50);
        }
    }

    quickcheck! {
        fn prop_input_order_does_not_matter(coords: Vec<(u16, u16)>, zoom: u8) -> bool {
            let points = from_coords(&coords);
            let mut reversed = points.clone();
            reversed.reverse();
            let zoom = (zoom % 25) as f64;

            let a = ClusterIndex::build(points, ClusterOptions::default()).expect("index");
            let b = ClusterIndex::build(reversed, ClusterOptions::default()).expect("index");

            let mut ca = get_clusters(&a, zoom, Some(&BoundingBox::WORLD));
            let mut cb = get_clusters(&b, zoom, Some(&BoundingBox::WORLD));
            ca.sort_by_key(|c| c.id);
            cb.sort_by_key(|c| c.id);
            ca == cb
        }
    }
}
