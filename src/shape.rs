use crate::stop_registry::StopRegistry;
use geo_types::{Coord, LineString};
use gtfs_structures::{Shape, StopTime};
use rustc_hash::FxHashMap;
use std::fmt;

/// Why a trip gets no shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeFlag {
    /// These stops of the trip have no coordinates yet
    UnsetCoordinates(Vec<String>),
    /// Less than two points, or all points at the same place
    TooFewPoints,
}

impl fmt::Display for ShapeFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShapeFlag::UnsetCoordinates(stops) => {
                write!(f, "stops without coordinates: {}", stops.join(", "))
            }
            ShapeFlag::TooFewPoints => write!(f, "less than two distinct points"),
        }
    }
}

/// Straight lines between the stops of each trip
///
/// Trips drawing exactly the same polyline share a shape. Shapes are numbered
/// `shp_1`, `shp_2`... in the order they are first needed.
#[derive(Debug, Default)]
pub struct ShapeSynthesizer {
    points: Vec<Shape>,
    known: FxHashMap<Vec<(u64, u64)>, String>,
}

impl ShapeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape id for a trip, given its stop times in sequence order
    pub fn synthesize(
        &mut self,
        stop_times: &[StopTime],
        registry: &StopRegistry,
    ) -> Result<String, ShapeFlag> {
        let line = trip_line(stop_times, registry)?;
        let key: Vec<(u64, u64)> = line
            .coords()
            .map(|c| (c.x.to_bits(), c.y.to_bits()))
            .collect();
        if let Some(id) = self.known.get(&key) {
            return Ok(id.clone());
        }

        let id = format!("shp_{}", self.known.len() + 1);
        self.points
            .extend(line.coords().enumerate().map(|(i, c)| Shape {
                id: id.clone(),
                latitude: c.y,
                longitude: c.x,
                sequence: i + 1,
            }));
        self.known.insert(key, id.clone());
        Ok(id)
    }

    pub fn shape_count(&self) -> usize {
        self.known.len()
    }

    pub fn into_points(self) -> Vec<Shape> {
        self.points
    }
}

/// Polyline through the stops of a trip, x being the longitude
pub fn trip_line(
    stop_times: &[StopTime],
    registry: &StopRegistry,
) -> Result<LineString, ShapeFlag> {
    let mut coords = Vec::with_capacity(stop_times.len());
    let mut unset = Vec::new();
    for stop_time in stop_times {
        match registry.coordinates(&stop_time.stop_id) {
            Some((lat, lon)) => coords.push(Coord { x: lon, y: lat }),
            None => {
                if !unset.contains(&stop_time.stop_id) {
                    unset.push(stop_time.stop_id.clone());
                }
            }
        }
    }
    if !unset.is_empty() {
        return Err(ShapeFlag::UnsetCoordinates(unset));
    }
    let distinct = coords
        .first()
        .map_or(false, |first| coords.iter().any(|c| c != first));
    if distinct {
        Ok(LineString::new(coords))
    } else {
        Err(ShapeFlag::TooFewPoints)
    }
}

/// Polyline of the points of one shape, ordered by `shape_pt_sequence`
pub fn to_line_string(points: &[&Shape]) -> LineString {
    let mut points = points.to_vec();
    points.sort_by_key(|p| p.sequence);
    points
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect()
}
