use crate::objects::*;
use crate::Error;
use crate::GtfsReader;
use std::collections::HashSet;
use std::path::Path;

/// Data structure that map the GTFS csv with little intelligence
///
/// Every table is kept in the order its rows were produced, which is also the order they are written in.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawGtfs {
    /// All Agencies
    pub agencies: Vec<Agency>,
    /// All Calendar
    pub calendar: Vec<Calendar>,
    /// All Stops
    pub stops: Vec<Stop>,
    /// All Routes
    pub routes: Vec<Route>,
    /// All Trips
    pub trips: Vec<Trip>,
    /// All StopTimes
    pub stop_times: Vec<StopTime>,
    /// All shapes points, empty when the feed has no shapes
    pub shapes: Vec<Shape>,
    /// All files that were present when the feed was read. Empty for a feed built in memory
    pub files: Vec<String>,
}

impl RawGtfs {
    /// Prints on stdout some basic statistics about the GTFS tables (numbers of elements for each object)
    pub fn print_stats(&self) {
        println!("GTFS data:");
        println!("  Agencies: {}", self.agencies.len());
        println!("  Calendar: {}", self.calendar.len());
        println!("  Stops: {}", self.stops.len());
        println!("  Routes: {}", self.routes.len());
        println!("  Trips: {}", self.trips.len());
        println!("  Stop times: {}", self.stop_times.len());
        println!("  Shapes: {}", self.shape_count());
    }

    /// Reads the raw GTFS from a local zip archive or local directory
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path> + std::fmt::Display,
    {
        GtfsReader::default().read_from_path(path)
    }

    /// Reads for any object implementing [std::io::Read] and [std::io::Seek]
    pub fn from_reader<T: std::io::Read + std::io::Seek>(reader: T) -> Result<Self, Error> {
        GtfsReader::default().read_from_reader(reader)
    }

    /// Number of distinct shapes (not shape points)
    pub fn shape_count(&self) -> usize {
        self.shapes
            .iter()
            .map(|s| s.id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// The same feed without the shapes table and without any `shape_id` on the trips
    pub fn without_shapes(&self) -> RawGtfs {
        RawGtfs {
            trips: self
                .trips
                .iter()
                .map(|t| Trip {
                    shape_id: None,
                    ..t.clone()
                })
                .collect(),
            shapes: Vec::new(),
            ..self.clone()
        }
    }

    /// Checks that identifiers are unique and that every reference points to an existing object
    ///
    /// A feed that passes this check can be written without dangling references.
    pub fn check_references(&self) -> Result<(), Error> {
        let stops = unique_ids(&self.stops)?;
        let routes = unique_ids(&self.routes)?;
        let calendar = unique_ids(&self.calendar)?;
        let trips = unique_ids(&self.trips)?;
        let shapes: HashSet<&str> = self.shapes.iter().map(|s| s.id.as_str()).collect();

        for trip in &self.trips {
            check_reference(&routes, &trip.route_id)?;
            check_reference(&calendar, &trip.service_id)?;
            if let Some(shape_id) = &trip.shape_id {
                check_reference(&shapes, shape_id)?;
            }
        }
        for stop_time in &self.stop_times {
            check_reference(&trips, &stop_time.trip_id)?;
            check_reference(&stops, &stop_time.stop_id)?;
        }
        Ok(())
    }
}

fn unique_ids<O: Id>(objs: &[O]) -> Result<HashSet<&str>, Error> {
    let mut ids = HashSet::with_capacity(objs.len());
    for o in objs {
        if !ids.insert(o.id()) {
            return Err(Error::DuplicateId(o.id().to_owned()));
        }
    }
    Ok(ids)
}

fn check_reference(ids: &HashSet<&str>, id: &str) -> Result<(), Error> {
    if ids.contains(id) {
        Ok(())
    } else {
        Err(Error::ReferenceError(id.to_owned()))
    }
}
