use crate::objects::*;
use crate::{Error, GtfsReader, GtfsWriter, RawGtfs};
use chrono::NaiveDate;
use std::io::Cursor;

fn small_feed() -> RawGtfs {
    RawGtfs {
        agencies: vec![Agency {
            id: Some("ACME".to_owned()),
            name: "Acme Transit".to_owned(),
            url: "https://acme.example".to_owned(),
            timezone: "Europe/Paris".to_owned(),
        }],
        calendar: vec![Calendar {
            id: "weekday".to_owned(),
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }],
        stops: vec![
            Stop {
                id: "A".to_owned(),
                name: "Alpha".to_owned(),
                latitude: Some(48.1),
                longitude: Some(-1.6),
            },
            Stop {
                id: "B".to_owned(),
                name: "Beta, north side".to_owned(),
                latitude: Some(0.0),
                longitude: Some(0.0),
            },
        ],
        routes: vec![Route {
            id: "1".to_owned(),
            long_name: "line1".to_owned(),
            route_type: RouteType::Bus,
        }],
        trips: vec![Trip {
            route_id: "1".to_owned(),
            service_id: "weekday".to_owned(),
            id: "weekday_line1_001".to_owned(),
            shape_id: Some("shp_1".to_owned()),
        }],
        stop_times: vec![
            StopTime {
                trip_id: "weekday_line1_001".to_owned(),
                arrival_time: 8 * 3600,
                departure_time: 8 * 3600,
                stop_id: "A".to_owned(),
                stop_sequence: 1,
            },
            StopTime {
                trip_id: "weekday_line1_001".to_owned(),
                arrival_time: 8 * 3600 + 300,
                departure_time: 8 * 3600 + 300,
                stop_id: "B".to_owned(),
                stop_sequence: 2,
            },
        ],
        shapes: vec![
            Shape {
                id: "shp_1".to_owned(),
                latitude: 48.1,
                longitude: -1.6,
                sequence: 1,
            },
            Shape {
                id: "shp_1".to_owned(),
                latitude: 48.2,
                longitude: -1.5,
                sequence: 2,
            },
        ],
        files: vec![],
    }
}

fn table<'a>(tables: &'a [crate::SerializedTable], file_name: &str) -> &'a str {
    let table = tables
        .iter()
        .find(|t| t.file_name == file_name)
        .unwrap_or_else(|| panic!("{file_name} not serialized"));
    std::str::from_utf8(&table.content).unwrap()
}

#[test]
fn read_directory() {
    let gtfs = RawGtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    assert_eq!(1, gtfs.agencies.len());
    assert_eq!("Bibus", gtfs.agencies[0].name);
    assert_eq!(3, gtfs.stops.len());
    assert_eq!("stops.txt", gtfs.stops[0].object_type().file_name());
    assert_eq!(Some(48.3878), gtfs.stops[0].latitude);
    assert_eq!(None, gtfs.stops[2].latitude);
    assert_eq!(RouteType::Tramway, gtfs.routes[0].route_type);
    assert_eq!(RouteType::Bus, gtfs.routes[1].route_type);
    assert_eq!(Some("A_shp".to_owned()), gtfs.trips[0].shape_id);
    assert_eq!(None, gtfs.trips[1].shape_id);
    assert_eq!(25 * 3600 + 600, gtfs.stop_times[2].arrival_time);
    assert_eq!(1, gtfs.shape_count());
    assert_eq!(7, gtfs.files.len());
}

#[test]
fn read_calendar() {
    let gtfs = RawGtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    let calendar = &gtfs.calendar[0];
    assert!(!calendar.monday);
    assert!(calendar.saturday);
    assert_eq!("weekends", calendar.describe_days());
    assert!(calendar.runs_on_any_day());
}

#[test]
fn read_catalog_with_bom() {
    let stops: Vec<Stop> = GtfsReader::default()
        .read_table("fixtures/catalogs/stops_with_bom.csv")
        .expect("impossible to read catalog");
    assert_eq!(2, stops.len());
    assert_eq!("S1", stops[0].id);
    assert_eq!("Gare Sud", stops[1].name);
    assert_eq!(Some(-1.54), stops[1].longitude);
}

#[test]
fn read_catalog_with_invalid_coordinate() {
    let result: Result<Vec<Stop>, Error> =
        GtfsReader::default().read_table("fixtures/catalogs/stops_invalid_lat.csv");
    match result {
        Err(Error::CSVError {
            file_name,
            line_in_error: Some(line),
            ..
        }) => {
            assert_eq!("stops_invalid_lat.csv", file_name);
            assert_eq!("north", line.values[2]);
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn missing_table() {
    let result: Result<Vec<Stop>, Error> =
        GtfsReader::default().read_table("fixtures/catalogs/nope.csv");
    assert!(matches!(result, Err(Error::MissingFile(f)) if f == "nope.csv"));
}

#[test]
fn serialized_headers_and_rows() {
    let tables = GtfsWriter::default().serialize(&small_feed()).unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.file_name).collect();
    assert_eq!(
        vec![
            "agency.txt",
            "calendar.txt",
            "stops.txt",
            "routes.txt",
            "trips.txt",
            "stop_times.txt",
            "shapes.txt"
        ],
        names
    );
    assert_eq!(
        "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
         weekday,1,1,1,1,1,0,0,20240101,20241231\n",
        table(&tables, "calendar.txt")
    );
    assert_eq!(
        "stop_id,stop_name,stop_lat,stop_lon\nA,Alpha,48.1,-1.6\nB,\"Beta, north side\",0,0\n",
        table(&tables, "stops.txt")
    );
    assert_eq!(
        "route_id,service_id,trip_id,shape_id\n1,weekday,weekday_line1_001,shp_1\n",
        table(&tables, "trips.txt")
    );
    assert_eq!(
        "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
         weekday_line1_001,08:00:00,08:00:00,A,1\n\
         weekday_line1_001,08:05:00,08:05:00,B,2\n",
        table(&tables, "stop_times.txt")
    );
}

#[test]
fn empty_tables_keep_their_header() {
    let mut gtfs = small_feed();
    gtfs.shapes.clear();
    gtfs.trips[0].shape_id = None;
    let tables = GtfsWriter::default().serialize(&gtfs).unwrap();
    assert_eq!(
        "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n",
        table(&tables, "shapes.txt")
    );
}

#[test]
fn without_shapes_blanks_shape_ids() {
    let tables = GtfsWriter::default()
        .write_shapes(false)
        .serialize(&small_feed())
        .unwrap();
    assert_eq!(6, tables.len());
    assert!(tables.iter().all(|t| t.file_name != "shapes.txt"));
    assert_eq!(
        "route_id,service_id,trip_id,shape_id\n1,weekday,weekday_line1_001,\n",
        table(&tables, "trips.txt")
    );
}

#[test]
fn dangling_reference_is_refused() {
    let mut gtfs = small_feed();
    gtfs.stop_times[1].stop_id = "C".to_owned();
    let result = GtfsWriter::default().serialize(&gtfs);
    assert!(matches!(result, Err(Error::ReferenceError(id)) if id == "C"));

    let mut gtfs = small_feed();
    gtfs.shapes.clear();
    let result = GtfsWriter::default().serialize(&gtfs);
    assert!(matches!(result, Err(Error::ReferenceError(id)) if id == "shp_1"));
}

#[test]
fn duplicate_id_is_refused() {
    let mut gtfs = small_feed();
    let duplicate = gtfs.stops[0].clone();
    gtfs.stops.push(duplicate);
    assert!(matches!(
        gtfs.check_references(),
        Err(Error::DuplicateId(id)) if id == "A"
    ));
}

#[test]
fn zip_files() {
    let bytes = GtfsWriter::default().to_zip_bytes(&small_feed()).unwrap();
    let gtfs = RawGtfs::from_reader(Cursor::new(bytes)).expect("impossible to read gtfs");
    assert_eq!(7, gtfs.files.len());
    assert!(gtfs.files.contains(&"shapes.txt".to_owned()));

    let mut expected = small_feed();
    expected.files = gtfs.files.clone();
    assert_eq!(expected, gtfs);
}

#[test]
fn zip_is_reproducible() {
    let first = GtfsWriter::default().to_zip_bytes(&small_feed()).unwrap();
    let second = GtfsWriter::default().to_zip_bytes(&small_feed()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn write_directory() {
    let dir = std::env::temp_dir().join(format!("gtfs-structures-write-{}", std::process::id()));
    GtfsWriter::default()
        .write_to_directory(&small_feed(), &dir)
        .unwrap();
    let gtfs = RawGtfs::from_path(dir.display().to_string()).expect("impossible to read gtfs");
    assert_eq!(small_feed().stop_times, gtfs.stop_times);
    assert_eq!(2, gtfs.shapes.len());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn extended_route_types() {
    assert_eq!(RouteType::Bus, RouteType::from(3));
    assert_eq!(RouteType::Bus, RouteType::from(704));
    assert_eq!(RouteType::Coach, RouteType::from(200));
    assert_eq!(RouteType::Other(42), RouteType::from(42));
    assert_eq!(3, i32::from(RouteType::default()));
}
