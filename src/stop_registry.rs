use crate::error::{Error, Result};
use gtfs_structures::{GtfsReader, Stop};
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Written in place of a coordinate that nobody provided
pub const UNSET_COORDINATE: f64 = 0.0;

/// Identifier of a stop as written in `stops.txt`
pub type StopId = String;

/// Stable identifier derived from a stop name
///
/// The first 8 bytes of the SHA-256 of the name, as 16 lowercase hex digits.
/// The same name gives the same id on every run and every machine.
pub fn mint_stop_id(name: &str) -> StopId {
    let digest = Sha256::digest(name.as_bytes());
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

/// A catalog row that does not deserialize is reported with its line and column
fn catalog_error(file: &str, e: gtfs_structures::Error) -> Error {
    if let gtfs_structures::Error::CSVError { source, .. } = &e {
        if let csv::ErrorKind::Deserialize { pos: Some(pos), err } = source.kind() {
            let column = err.field().map_or(1, |f| f as usize + 1);
            let message = err.kind().to_string();
            return Error::input_format(file, pos.line() as usize, column, message);
        }
    }
    Error::from(e)
}

fn is_unset(stop: &Stop) -> bool {
    match (stop.latitude, stop.longitude) {
        (Some(lat), Some(lon)) => lat == UNSET_COORDINATE && lon == UNSET_COORDINATE,
        _ => true,
    }
}

/// Maps stop names to stop ids for the whole run
///
/// Pre-seeded from the stop catalog, then extended each time a timetable names
/// an unknown stop. The first stop registered under a name keeps it.
#[derive(Debug, Default)]
pub struct StopRegistry {
    stops: Vec<Stop>,
    by_name: FxHashMap<String, usize>,
    by_id: FxHashMap<StopId, usize>,
}

impl StopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a `stop_id,stop_name,stop_lat,stop_lon` catalog
    pub fn from_catalog_file(path: &Path) -> Result<Self> {
        let file = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("stops");
        let catalog: Vec<Stop> = GtfsReader::default()
            .read_table(path)
            .map_err(|e| catalog_error(file, e))?;
        log::info!("{} stops in the catalog {}", catalog.len(), path.display());
        Self::from_catalog(catalog, file)
    }

    pub fn from_catalog(catalog: Vec<Stop>, file: &str) -> Result<Self> {
        let mut registry = Self::new();
        for (i, mut stop) in catalog.into_iter().enumerate() {
            // header is line 1
            let row = i + 2;
            if stop.name.is_empty() {
                return Err(Error::input_format(file, row, 2, "blank stop name"));
            }
            if registry.by_id.contains_key(&stop.id) {
                return Err(Error::input_format(
                    file,
                    row,
                    1,
                    format!("stop_id '{}' is defined more than once", stop.id),
                ));
            }
            if registry.by_name.contains_key(&stop.name) {
                log::warn!(
                    "{}: stop '{}' ({}) shares its name with an earlier stop, \
                     timetables will use the earlier one",
                    file,
                    stop.name,
                    stop.id
                );
            }
            if is_unset(&stop) {
                stop.latitude = Some(UNSET_COORDINATE);
                stop.longitude = Some(UNSET_COORDINATE);
            }
            registry.push(stop);
        }
        Ok(registry)
    }

    fn push(&mut self, stop: Stop) {
        let index = self.stops.len();
        self.by_name.entry(stop.name.clone()).or_insert(index);
        self.by_id.insert(stop.id.clone(), index);
        self.stops.push(stop);
    }

    /// Stop id for this name, minting a new stop without coordinates the first time an unknown name shows up
    pub fn resolve(&mut self, stop_name: &str) -> StopId {
        if let Some(index) = self.by_name.get(stop_name) {
            return self.stops[*index].id.clone();
        }

        let minted = mint_stop_id(stop_name);
        let mut id = minted.clone();
        let mut suffix = 0;
        while self.by_id.contains_key(&id) {
            suffix += 1;
            id = format!("{}-{}", minted, suffix);
        }
        if suffix > 0 {
            log::warn!("stop id {} is already taken, '{}' gets {}", minted, stop_name, id);
        }
        log::debug!("new stop '{}' gets the id {}", stop_name, id);

        self.push(Stop {
            id: id.clone(),
            name: stop_name.to_owned(),
            latitude: Some(UNSET_COORDINATE),
            longitude: Some(UNSET_COORDINATE),
        });
        id
    }

    /// Latitude and longitude of a stop, `None` if unknown or unset
    pub fn coordinates(&self, stop_id: &str) -> Option<(f64, f64)> {
        let stop = &self.stops[*self.by_id.get(stop_id)?];
        if is_unset(stop) {
            return None;
        }
        Some((stop.latitude?, stop.longitude?))
    }

    /// Stops written with placeholder coordinates
    pub fn unset_stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter().filter(|s| is_unset(s))
    }

    /// Catalog stops first, then minted ones in the order they were met
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn into_stops(self) -> Vec<Stop> {
        self.stops
    }
}
