use crate::configuration::Config;
use crate::error::Error;
use crate::feed::build_feed;
use crate::output::{write_feed, OutputOptions};
use crate::shape::ShapeFlag;
use crate::stop_registry::mint_stop_id;
use gtfs_structures::{format_time, RawGtfs};
use std::path::{Path, PathBuf};

fn basic_config() -> Config {
    Config::from_file(Path::new("fixtures/basic/config.toml")).expect("invalid fixture config")
}

fn output_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("timetable2gtfs-{}-{}", name, std::process::id()))
}

/// (stop_id, time, stop_sequence) of every stop time of a trip
fn stop_times_of(gtfs: &RawGtfs, trip_id: &str) -> Vec<(String, String, u32)> {
    gtfs.stop_times
        .iter()
        .filter(|st| st.trip_id == trip_id)
        .map(|st| {
            (
                st.stop_id.clone(),
                format_time(st.arrival_time),
                st.stop_sequence,
            )
        })
        .collect()
}

fn expected(rows: &[(&str, &str, u32)]) -> Vec<(String, String, u32)> {
    rows.iter()
        .map(|(stop, time, seq)| (stop.to_string(), time.to_string(), *seq))
        .collect()
}

#[test]
fn basic_feed() {
    let feed = build_feed(&basic_config()).unwrap();
    let gtfs = &feed.gtfs;

    assert_eq!("Acme Transit", gtfs.agencies[0].name);
    // the holidays service has no route
    let services: Vec<&str> = gtfs.calendar.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(vec!["weekday", "sunday"], services);
    assert_eq!(vec!["holidays".to_owned()], feed.review.skipped_services);

    let routes: Vec<(&str, &str)> = gtfs
        .routes
        .iter()
        .map(|r| (r.id.as_str(), r.long_name.as_str()))
        .collect();
    assert_eq!(vec![("1", "line1"), ("2", "line2")], routes);

    let trips: Vec<(&str, &str, &str)> = gtfs
        .trips
        .iter()
        .map(|t| (t.id.as_str(), t.route_id.as_str(), t.service_id.as_str()))
        .collect();
    assert_eq!(
        vec![
            ("weekday_line1_001", "1", "weekday"),
            ("weekday_line1_002", "1", "weekday"),
            ("weekday_line2_001", "2", "weekday"),
            ("weekday_line2_002", "2", "weekday"),
            ("sunday_line1_001", "1", "sunday"),
            ("sunday_line1_002", "1", "sunday"),
        ],
        trips
    );
    assert_eq!(15, gtfs.stop_times.len());
}

#[test]
fn stops_catalog_first_then_minted() {
    let feed = build_feed(&basic_config()).unwrap();
    let stops: Vec<(&str, &str)> = feed
        .gtfs
        .stops
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();
    let b = mint_stop_id("B");
    let market = mint_stop_id("Market Square");
    assert_eq!(
        vec![
            ("cat_a", "A"),
            ("cat_c", "C"),
            ("cat_d", "D"),
            (b.as_str(), "B"),
            (market.as_str(), "Market Square"),
        ],
        stops
    );
    assert_eq!(vec![b, market], feed.review.unset_stops);
    assert_eq!(Some(0.0), feed.gtfs.stops[4].latitude);
}

#[test]
fn stop_times_are_chronological() {
    let feed = build_feed(&basic_config()).unwrap();
    let b = mint_stop_id("B");
    let market = mint_stop_id("Market Square");

    assert_eq!(
        expected(&[
            ("cat_a", "08:00:00", 1),
            (b.as_str(), "08:05:00", 2),
            ("cat_c", "08:10:00", 3)
        ]),
        stop_times_of(&feed.gtfs, "weekday_line1_001")
    );
    // blank cell for B
    assert_eq!(
        expected(&[("cat_a", "08:00:00", 1), ("cat_c", "08:07:00", 2)]),
        stop_times_of(&feed.gtfs, "weekday_line1_002")
    );
    // times going up the table: the trip runs the other way
    assert_eq!(
        expected(&[
            (market.as_str(), "09:10:00", 1),
            ("cat_d", "09:20:00", 2),
            ("cat_c", "09:30:00", 3)
        ]),
        stop_times_of(&feed.gtfs, "weekday_line2_001")
    );
    assert_eq!(
        stop_times_of(&feed.gtfs, "weekday_line1_002"),
        stop_times_of(&feed.gtfs, "sunday_line1_002")
    );
}

#[test]
fn shapes_of_the_basic_feed() {
    let feed = build_feed(&basic_config()).unwrap();
    let shape_ids: Vec<(&str, Option<&str>)> = feed
        .gtfs
        .trips
        .iter()
        .map(|t| (t.id.as_str(), t.shape_id.as_deref()))
        .collect();
    assert_eq!(
        vec![
            ("weekday_line1_001", None),
            ("weekday_line1_002", Some("shp_1")),
            ("weekday_line2_001", None),
            ("weekday_line2_002", Some("shp_2")),
            ("sunday_line1_001", None),
            ("sunday_line1_002", Some("shp_1")),
        ],
        shape_ids
    );
    assert_eq!(2, feed.gtfs.shape_count());
    assert_eq!(4, feed.gtfs.shapes.len());
    assert_eq!(3, feed.review.flagged_shapes.len());
    assert_eq!(
        ShapeFlag::UnsetCoordinates(vec![mint_stop_id("Market Square")]),
        feed.review.flagged_shapes[1].flag
    );
    let shp_2: Vec<(f64, f64, usize)> = feed
        .gtfs
        .shapes
        .iter()
        .filter(|s| s.id == "shp_2")
        .map(|s| (s.latitude, s.longitude, s.sequence))
        .collect();
    assert_eq!(vec![(48.2, -1.5, 1), (48.25, -1.45, 2)], shp_2);
}

#[test]
fn archives() {
    let feed = build_feed(&basic_config()).unwrap();
    let dir = output_dir("archives");
    let written = write_feed(
        &feed,
        &dir,
        "acme",
        OutputOptions {
            unpacked: true,
            geojson: true,
        },
    )
    .unwrap();
    assert_eq!(dir.join("acme.zip"), written.archive);
    assert_eq!(dir.join("acme_shapes.zip"), written.shapes_archive);
    assert!(!dir.join("acme.zip.tmp").exists());

    let plain = RawGtfs::from_path(written.archive.display().to_string()).unwrap();
    assert_eq!(
        vec![
            "agency.txt",
            "calendar.txt",
            "stops.txt",
            "routes.txt",
            "trips.txt",
            "stop_times.txt"
        ],
        plain.files
    );
    assert!(plain.trips.iter().all(|t| t.shape_id.is_none()));
    assert!(plain.shapes.is_empty());

    let with_shapes = RawGtfs::from_path(written.shapes_archive.display().to_string()).unwrap();
    assert_eq!(7, with_shapes.files.len());
    assert_eq!(feed.gtfs.stops, with_shapes.stops);
    assert_eq!(feed.gtfs.trips, with_shapes.trips);
    assert_eq!(feed.gtfs.stop_times.len(), with_shapes.stop_times.len());
    assert_eq!(feed.gtfs.shapes, with_shapes.shapes);

    let unpacked = written.unpacked.unwrap();
    assert_eq!(dir.join("acme"), unpacked);
    let stop_times = std::fs::read_to_string(unpacked.join("stop_times.txt")).unwrap();
    assert!(stop_times.starts_with(
        "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
         weekday_line1_001,08:00:00,08:00:00,cat_a,1\n"
    ));

    let geojson = std::fs::read_to_string(written.geojson.unwrap()).unwrap();
    let geojson: serde_json::Value = serde_json::from_str(&geojson).unwrap();
    // 5 stops, 2 shapes, 3 flagged trips
    assert_eq!(10, geojson["features"].as_array().unwrap().len());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn runs_are_reproducible() {
    let first = output_dir("run-1");
    let second = output_dir("run-2");
    for dir in [&first, &second] {
        let feed = build_feed(&basic_config()).unwrap();
        write_feed(&feed, dir, "acme", OutputOptions::default()).unwrap();
    }
    for archive in ["acme.zip", "acme_shapes.zip"] {
        assert_eq!(
            std::fs::read(first.join(archive)).unwrap(),
            std::fs::read(second.join(archive)).unwrap()
        );
    }
    std::fs::remove_dir_all(&first).unwrap();
    std::fs::remove_dir_all(&second).unwrap();
}

fn all_outputs() -> OutputOptions {
    OutputOptions {
        unpacked: true,
        geojson: true,
    }
}

#[test]
fn rewriting_replaces_outputs() {
    let feed = build_feed(&basic_config()).unwrap();
    let dir = output_dir("rewrite");
    std::fs::create_dir_all(dir.join("acme")).unwrap();
    std::fs::write(dir.join("acme").join("stale.txt"), "stale").unwrap();
    std::fs::write(dir.join("acme.zip"), "previous").unwrap();

    write_feed(&feed, &dir, "acme", all_outputs()).unwrap();
    assert!(RawGtfs::from_path(dir.join("acme.zip").display().to_string()).is_ok());
    assert!(dir.join("acme").join("stops.txt").is_file());
    assert!(!dir.join("acme").join("stale.txt").exists());
    for leftover in ["acme.zip.bak", "acme.bak", "acme.tmp", "acme.geojson.tmp"] {
        assert!(!dir.join(leftover).exists(), "{leftover}");
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn failed_run_leaves_no_partial_output() {
    let feed = build_feed(&basic_config()).unwrap();
    let dir = output_dir("blocked");
    // the shapes archive cannot replace a directory
    std::fs::create_dir_all(dir.join("acme_shapes.zip").join("keep")).unwrap();

    let result = write_feed(&feed, &dir, "acme", all_outputs());
    assert!(
        matches!(&result, Err(Error::IoError { path, .. }) if *path == dir.join("acme_shapes.zip")),
        "{result:?}"
    );
    for missing in [
        "acme.zip",
        "acme.zip.tmp",
        "acme_shapes.zip.tmp",
        "acme",
        "acme.tmp",
        "acme.geojson",
        "acme.geojson.tmp",
    ] {
        assert!(!dir.join(missing).exists(), "{missing}");
    }
    assert!(dir.join("acme_shapes.zip").join("keep").is_dir());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn failed_run_keeps_the_previous_archive() {
    let feed = build_feed(&basic_config()).unwrap();
    let dir = output_dir("previous");
    std::fs::create_dir_all(dir.join("acme_shapes.zip").join("keep")).unwrap();
    std::fs::write(dir.join("acme.zip"), "previous").unwrap();

    assert!(write_feed(&feed, &dir, "acme", OutputOptions::default()).is_err());
    assert_eq!("previous", std::fs::read_to_string(dir.join("acme.zip")).unwrap());
    assert!(!dir.join("acme.zip.bak").exists());
    std::fs::remove_dir_all(&dir).unwrap();
}
