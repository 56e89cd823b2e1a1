//! GeoJSON of a feed, to check the stops and shapes on a map before publishing.
use crate::feed::Feed;
use crate::shape::{to_line_string, ShapeFlag};
use crate::stop_registry::UNSET_COORDINATE;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use gtfs_structures::Shape;
use std::collections::BTreeMap;

/// One feature per stop, per shape and per trip without shape
///
/// Stops without coordinates and flagged trips have no geometry.
pub fn to_geojson(feed: &Feed) -> FeatureCollection {
    let mut features = Vec::new();

    for stop in &feed.gtfs.stops {
        let position = match (stop.latitude, stop.longitude) {
            (Some(lat), Some(lon)) if lat != UNSET_COORDINATE || lon != UNSET_COORDINATE => {
                Some((lat, lon))
            }
            _ => None,
        };
        let mut feature = match position {
            Some((lat, lon)) => Feature::from(Value::Point(vec![lon, lat])),
            None => empty_feature(),
        };
        feature.set_property("type", "stop");
        feature.set_property("stop_id", stop.id.clone());
        feature.set_property("stop_name", stop.name.clone());
        feature.set_property("unset_coordinates", position.is_none());
        features.push(feature);
    }

    let mut shapes: BTreeMap<&str, Vec<&Shape>> = BTreeMap::new();
    for point in &feed.gtfs.shapes {
        shapes.entry(point.id.as_str()).or_default().push(point);
    }
    // shapes in the order they were numbered
    let mut shapes: Vec<_> = shapes.into_iter().collect();
    shapes.sort_by_key(|(id, _)| shape_number(id));
    for (shape_id, points) in shapes {
        let trips: Vec<&str> = feed
            .gtfs
            .trips
            .iter()
            .filter(|t| t.shape_id.as_deref() == Some(shape_id))
            .map(|t| t.id.as_str())
            .collect();
        let mut feature = Feature::from(Geometry::from(&to_line_string(&points)));
        feature.set_property("type", "shape");
        feature.set_property("shape_id", shape_id);
        feature.set_property("trips", trips);
        features.push(feature);
    }

    for flagged in &feed.review.flagged_shapes {
        let mut feature = empty_feature();
        feature.set_property("type", "flagged_trip");
        feature.set_property("trip_id", flagged.trip_id.clone());
        feature.set_property("reason", flagged.flag.to_string());
        if let ShapeFlag::UnsetCoordinates(stops) = &flagged.flag {
            feature.set_property("unset_stops", stops.clone());
        }
        features.push(feature);
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn empty_feature() -> Feature {
    Feature {
        bbox: None,
        geometry: None,
        id: None,
        properties: None,
        foreign_members: None,
    }
}

fn shape_number(shape_id: &str) -> (usize, String) {
    let number = shape_id
        .strip_prefix("shp_")
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX);
    (number, shape_id.to_owned())
}
