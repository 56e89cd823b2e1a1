use gtfs_structures::{Route, RouteType, Trip};
use rustc_hash::FxHashMap;

/// `{service_id}_{route_name}_{ordinal:03}`
///
/// The ordinal counts the trips of a route for one service from 1.
pub fn trip_id(service_id: &str, route_name: &str, ordinal: usize) -> String {
    format!("{}_{:03}", trip_id_prefix(service_id, route_name), ordinal)
}

/// Part of the trip ids shared by every trip of a route for one service
///
/// The ordinal never contains `_`, so two (service, route) pairs can only
/// produce the same trip id if they have the same prefix.
pub fn trip_id_prefix(service_id: &str, route_name: &str) -> String {
    format!("{}_{}", service_id, route_name)
}

/// Routes and trips, in the order the timetables are processed
#[derive(Debug, Default)]
pub struct RouteTripBuilder {
    route_type: RouteType,
    routes: Vec<Route>,
    route_ids: FxHashMap<String, String>,
    trips: Vec<Trip>,
}

impl RouteTripBuilder {
    pub fn new(route_type: RouteType) -> Self {
        Self {
            route_type,
            ..Default::default()
        }
    }

    /// Id of the route for this route file, assigning the next one on first encounter
    pub fn route_id(&mut self, route_name: &str) -> String {
        if let Some(id) = self.route_ids.get(route_name) {
            return id.clone();
        }
        let id = (self.routes.len() + 1).to_string();
        log::debug!("route {} gets the id {}", route_name, id);
        self.routes.push(Route {
            id: id.clone(),
            long_name: route_name.to_owned(),
            route_type: self.route_type,
        });
        self.route_ids.insert(route_name.to_owned(), id.clone());
        id
    }

    /// Adds the `ordinal`-th trip of a route for a service
    pub fn add_trip(&mut self, service_id: &str, route_name: &str, ordinal: usize) -> &Trip {
        let route_id = self.route_id(route_name);
        self.trips.push(Trip {
            route_id,
            service_id: service_id.to_owned(),
            id: trip_id(service_id, route_name, ordinal),
            shape_id: None,
        });
        &self.trips[self.trips.len() - 1]
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn into_tables(self) -> (Vec<Route>, Vec<Trip>) {
        (self.routes, self.trips)
    }
}
