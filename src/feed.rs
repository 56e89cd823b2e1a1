use crate::configuration::{Config, RouteRef, ServiceConfig};
use crate::error::Result;
use crate::shape::{ShapeFlag, ShapeSynthesizer};
use crate::stop_registry::StopRegistry;
use crate::stop_times::assemble_stop_times;
use crate::timetable::Timetable;
use crate::trips::RouteTripBuilder;
use gtfs_structures::{Agency, Calendar, RawGtfs, StopTime};
use rustc_hash::FxHashMap;
use std::ops::Range;

/// A trip that got no shape, and why
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedShape {
    pub trip_id: String,
    pub flag: ShapeFlag,
}

/// What an operator should look at before publishing the feed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReviewReport {
    /// Stops written with placeholder coordinates
    pub unset_stops: Vec<String>,
    /// Trips without any stop time
    pub degenerate_trips: Vec<String>,
    /// Routes whose timetable has no trip column
    pub empty_routes: Vec<String>,
    /// Services without routes, left out of the calendar
    pub skipped_services: Vec<String>,
    pub flagged_shapes: Vec<FlaggedShape>,
}

impl ReviewReport {
    pub fn is_empty(&self) -> bool {
        self.unset_stops.is_empty()
            && self.degenerate_trips.is_empty()
            && self.empty_routes.is_empty()
            && self.skipped_services.is_empty()
            && self.flagged_shapes.is_empty()
    }
}

/// The complete tables of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub gtfs: RawGtfs,
    pub review: ReviewReport,
}

impl Feed {
    pub fn print_stats(&self) {
        self.gtfs.print_stats();
        println!("To review:");
        println!("  Stops without coordinates: {}", self.review.unset_stops.len());
        println!("  Trips without stop times: {}", self.review.degenerate_trips.len());
        println!("  Routes without trips: {}", self.review.empty_routes.len());
        println!("  Services skipped: {}", self.review.skipped_services.len());
        println!("  Trips without shape: {}", self.review.flagged_shapes.len());
    }
}

/// Builds the feed of a configuration in one pass
pub fn build_feed(config: &Config) -> Result<Feed> {
    FeedBuilder::new(config)?.run(config)
}

/// State of a run
///
/// Services are processed in configuration order, then their routes, then the
/// trip columns left to right. Nothing is visible before [FeedBuilder::finish].
pub struct FeedBuilder {
    agency: Agency,
    registry: StopRegistry,
    calendar: Vec<Calendar>,
    routes: RouteTripBuilder,
    stop_times: Vec<StopTime>,
    /// Stop times of each trip, in trip order
    trip_spans: Vec<Range<usize>>,
    timetables: FxHashMap<String, Timetable>,
    review: ReviewReport,
}

impl FeedBuilder {
    pub fn new(config: &Config) -> Result<Self> {
        let registry = match &config.paths.stops {
            Some(path) => StopRegistry::from_catalog_file(path)?,
            None => StopRegistry::new(),
        };
        Ok(Self::with_registry(config, registry))
    }

    pub fn with_registry(config: &Config, registry: StopRegistry) -> Self {
        FeedBuilder {
            agency: Agency {
                id: Some(config.agency.id.clone()),
                name: config.agency.name.clone(),
                url: config.agency.url.clone(),
                timezone: config.agency.timezone.clone(),
            },
            registry,
            calendar: Vec::new(),
            routes: RouteTripBuilder::new(config.route_type),
            stop_times: Vec::new(),
            trip_spans: Vec::new(),
            timetables: FxHashMap::default(),
            review: ReviewReport::default(),
        }
    }

    pub fn run(mut self, config: &Config) -> Result<Feed> {
        for service in &config.services {
            self.add_service(service)?;
        }
        Ok(self.finish())
    }

    pub fn add_service(&mut self, service: &ServiceConfig) -> Result<()> {
        if service.routes.is_empty() {
            log::warn!("service {} has no route, skipped", service.id());
            self.review.skipped_services.push(service.id().to_owned());
            return Ok(());
        }
        log::info!(
            "service {}: {}, {} routes",
            service.id(),
            service.calendar,
            service.routes.len()
        );
        self.calendar.push(service.calendar.clone());
        for route in &service.routes {
            self.add_route_trips(service.id(), route)?;
        }
        Ok(())
    }

    pub fn add_route_trips(&mut self, service_id: &str, route: &RouteRef) -> Result<()> {
        self.load_timetable(route)?;
        let timetable = &self.timetables[&route.name];

        self.routes.route_id(&route.name);
        if timetable.trips.is_empty() {
            if !self.review.empty_routes.contains(&route.name) {
                self.review.empty_routes.push(route.name.clone());
            }
            return Ok(());
        }

        log::info!(
            "{} for {}: {} trips, {} stops",
            route.name,
            service_id,
            timetable.trips.len(),
            timetable.stops.len()
        );
        for (i, column) in timetable.trips.iter().enumerate() {
            let trip_id = self.routes.add_trip(service_id, &route.name, i + 1).id.clone();
            let stop_times = assemble_stop_times(&trip_id, timetable, column, &mut self.registry);
            if stop_times.is_empty() {
                log::warn!("trip {} (column {}) has no time", trip_id, column.index + 1);
                self.review.degenerate_trips.push(trip_id);
            }
            let start = self.stop_times.len();
            self.stop_times.extend(stop_times);
            self.trip_spans.push(start..self.stop_times.len());
        }
        Ok(())
    }

    fn load_timetable(&mut self, route: &RouteRef) -> Result<()> {
        if self.timetables.contains_key(&route.name) {
            log::debug!("{} already parsed", route.name);
            return Ok(());
        }
        let timetable = Timetable::from_path(&route.path, &route.name)?;
        self.timetables.insert(route.name.clone(), timetable);
        Ok(())
    }

    /// Draws the shapes and hands over the tables
    pub fn finish(mut self) -> Feed {
        let (routes, mut trips) = self.routes.into_tables();
        let mut shapes = ShapeSynthesizer::new();
        for (trip, span) in trips.iter_mut().zip(&self.trip_spans) {
            match shapes.synthesize(&self.stop_times[span.clone()], &self.registry) {
                Ok(shape_id) => trip.shape_id = Some(shape_id),
                Err(flag) => {
                    log::warn!("trip {} has no shape: {}", trip.id, flag);
                    self.review.flagged_shapes.push(FlaggedShape {
                        trip_id: trip.id.clone(),
                        flag,
                    });
                }
            }
        }

        self.review.unset_stops = self.registry.unset_stops().map(|s| s.id.clone()).collect();
        for stop in self.registry.unset_stops() {
            log::warn!("stop '{}' ({}) has no coordinates", stop.name, stop.id);
        }
        log::info!(
            "{} stops, {} trips, {} shapes",
            self.registry.len(),
            trips.len(),
            shapes.shape_count()
        );

        Feed {
            gtfs: RawGtfs {
                agencies: vec![self.agency],
                calendar: self.calendar,
                stops: self.registry.into_stops(),
                routes,
                trips,
                stop_times: self.stop_times,
                shapes: shapes.into_points(),
                files: Vec::new(),
            },
            review: self.review,
        }
    }
}
