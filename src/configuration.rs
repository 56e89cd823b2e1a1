use crate::error::{Error, Result};
use crate::trips::trip_id_prefix;
use chrono::NaiveDate;
use config::{File, FileFormat};
use gtfs_structures::{Calendar, RouteType};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

const TIMETABLE_EXTENSION: &str = "csv";

/// Configuration file, as written by the operator
#[derive(Debug, Deserialize)]
struct ConfigFile {
    folder_input: PathBuf,
    folder_output: PathBuf,
    #[serde(default)]
    stops: Option<PathBuf>,
    #[serde(default = "default_archive_name")]
    archive_name: String,
    agency_id: String,
    agency_name: String,
    agency_url: String,
    agency_timezone: String,
    #[serde(default = "default_route_type")]
    route_type: i32,
    #[serde(default)]
    services: Vec<ServiceFile>,
}

#[derive(Debug, Deserialize)]
struct ServiceFile {
    service_id: String,
    #[serde(default)]
    monday: bool,
    #[serde(default)]
    tuesday: bool,
    #[serde(default)]
    wednesday: bool,
    #[serde(default)]
    thursday: bool,
    #[serde(default)]
    friday: bool,
    #[serde(default)]
    saturday: bool,
    #[serde(default)]
    sunday: bool,
    start_date: String,
    end_date: String,
    #[serde(default)]
    routes: Vec<String>,
}

fn default_archive_name() -> String {
    "gtfs".to_owned()
}

fn default_route_type() -> i32 {
    i32::from(RouteType::Bus)
}

/// Validated configuration of a run, every path resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub paths: Paths,
    pub agency: AgencyConfig,
    pub route_type: RouteType,
    /// Archives are named `<archive_name>.zip` and `<archive_name>_shapes.zip`
    pub archive_name: String,
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Stop catalog
    pub stops: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgencyConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub calendar: Calendar,
    pub routes: Vec<RouteRef>,
}

/// A route file found in the input folder
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRef {
    /// File name without the `.csv` extension
    pub name: String,
    pub path: PathBuf,
}

impl ServiceConfig {
    pub fn id(&self) -> &str {
        &self.calendar.id
    }
}

impl Config {
    /// Loads a configuration file, the format being guessed from its extension
    ///
    /// Relative paths are relative to the folder of the configuration file.
    pub fn from_file(path: &Path) -> Result<Config> {
        let file = config::Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| {
                Error::ConfigError(format!("file '{}' produced error: {e}", path.display()))
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_source(file, base_dir)
    }

    /// Same as [Config::from_file] for a TOML document already in memory
    pub fn from_toml_str(toml: &str, base_dir: &Path) -> Result<Config> {
        let file = config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        Self::from_source(file, base_dir)
    }

    fn from_source(source: config::Config, base_dir: &Path) -> Result<Config> {
        let raw: ConfigFile = source
            .try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        Self::validate(raw, base_dir)
    }

    fn validate(raw: ConfigFile, base_dir: &Path) -> Result<Config> {
        let agency = AgencyConfig {
            id: non_empty("agency_id", raw.agency_id)?,
            name: non_empty("agency_name", raw.agency_name)?,
            url: non_empty("agency_url", raw.agency_url)?,
            timezone: non_empty("agency_timezone", raw.agency_timezone)?,
        };
        let archive_name = non_empty("archive_name", raw.archive_name)?;
        let paths = Paths {
            input: base_dir.join(raw.folder_input),
            output: base_dir.join(raw.folder_output),
            stops: raw.stops.map(|s| base_dir.join(s)),
        };
        if !paths.input.is_dir() {
            return Err(Error::ConfigError(format!(
                "input folder '{}' does not exist",
                paths.input.display()
            )));
        }
        if let Some(stops) = &paths.stops {
            if !stops.is_file() {
                return Err(Error::ConfigError(format!(
                    "stop catalog '{}' does not exist",
                    stops.display()
                )));
            }
        }

        let mut service_ids = HashSet::new();
        // route name -> file, and trip id prefix -> (service, route)
        let mut route_files: HashMap<String, PathBuf> = HashMap::new();
        let mut trip_prefixes: HashMap<String, (String, String)> = HashMap::new();
        let mut services = Vec::with_capacity(raw.services.len());
        for service in raw.services {
            let service_id = non_empty("service_id", service.service_id.clone())?;
            if !service_ids.insert(service_id.clone()) {
                return Err(Error::ConfigError(format!(
                    "service '{service_id}' is defined more than once"
                )));
            }
            let calendar = Calendar {
                id: service_id.clone(),
                monday: service.monday,
                tuesday: service.tuesday,
                wednesday: service.wednesday,
                thursday: service.thursday,
                friday: service.friday,
                saturday: service.saturday,
                sunday: service.sunday,
                start_date: parse_date(&service_id, "start_date", &service.start_date)?,
                end_date: parse_date(&service_id, "end_date", &service.end_date)?,
            };
            if calendar.start_date > calendar.end_date {
                return Err(Error::ConfigError(format!(
                    "service '{service_id}' ends on {} before it starts on {}",
                    calendar.end_date, calendar.start_date
                )));
            }
            if !calendar.runs_on_any_day() {
                log::warn!("service '{}' never runs ({})", service_id, calendar);
            }

            let mut routes: Vec<RouteRef> = Vec::with_capacity(service.routes.len());
            for route in &service.routes {
                let route = locate_route(&paths.input, route)?;
                if routes.iter().any(|r| r.name == route.name) {
                    return Err(Error::ConfigError(format!(
                        "route '{}' is listed twice in service '{service_id}'",
                        route.name
                    )));
                }
                match route_files.get(&route.name) {
                    Some(path) if *path != route.path => {
                        return Err(Error::ConfigError(format!(
                            "route '{}' names both '{}' and '{}'",
                            route.name,
                            path.display(),
                            route.path.display()
                        )));
                    }
                    Some(_) => {}
                    None => {
                        route_files.insert(route.name.clone(), route.path.clone());
                    }
                }
                let prefix = trip_id_prefix(&service_id, &route.name);
                if let Some((other_service, other_route)) = trip_prefixes.get(&prefix) {
                    return Err(Error::ConfigError(format!(
                        "route '{}' of service '{service_id}' and route '{other_route}' of \
                         service '{other_service}' would both get the trip ids {prefix}_NNN",
                        route.name
                    )));
                }
                trip_prefixes.insert(prefix, (service_id.clone(), route.name.clone()));
                routes.push(route);
            }
            services.push(ServiceConfig { calendar, routes });
        }

        Ok(Config {
            paths,
            agency,
            route_type: RouteType::from(raw.route_type),
            archive_name,
            services,
        })
    }
}

fn non_empty(key: &str, value: String) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::ConfigError(format!("'{key}' must not be empty")))
    } else {
        Ok(value.to_owned())
    }
}

fn parse_date(service_id: &str, key: &str, value: &str) -> Result<NaiveDate> {
    let invalid = || {
        Error::ConfigError(format!(
            "'{key}' of service '{service_id}' is '{value}', a YYYYMMDD date is expected"
        ))
    };
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| invalid())
}

/// Finds `<name>` or `<name>.csv` in the input folder
fn locate_route(input: &Path, name: &str) -> Result<RouteRef> {
    let stem = name
        .strip_suffix(TIMETABLE_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(name);
    let candidates = if stem.len() == name.len() {
        vec![
            input.join(name),
            input.join(format!("{name}.{TIMETABLE_EXTENSION}")),
        ]
    } else {
        vec![input.join(name)]
    };
    match candidates.into_iter().find(|p| p.is_file()) {
        Some(path) => Ok(RouteRef {
            name: stem.to_owned(),
            path,
        }),
        None => Err(Error::ConfigError(format!(
            "route file '{}' not found in '{}'",
            name,
            input.display()
        ))),
    }
}
