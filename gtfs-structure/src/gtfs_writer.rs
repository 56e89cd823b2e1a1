use serde::Serialize;

use crate::{Error, ObjectType, RawGtfs};
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::FileOptions;

/// A GTFS table serialized as CSV, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTable {
    /// File name of the table inside the feed, like `stops.txt`
    pub file_name: &'static str,
    /// CSV content, header line included
    pub content: Vec<u8>,
}

/// Writes a [RawGtfs] as a directory of `.txt` files or as a zip archive
///
/// All the tables are serialized in memory before anything is written, so a
/// serialization failure never leaves a half written feed behind.
///
/// ```
///let gtfs = gtfs_structures::RawGtfs::default();
///let mut buffer = std::io::Cursor::new(Vec::new());
///gtfs_structures::GtfsWriter::default()
///    .write_shapes(false)
///    .write_to_zip(&gtfs, &mut buffer)?;
///let read = gtfs_structures::RawGtfs::from_reader(buffer)?;
///assert_eq!(6, read.files.len());
/// # Ok::<(), gtfs_structures::error::Error>(())
///```
#[derive(Derivative)]
#[derivative(Default)]
pub struct GtfsWriter {
    /// Write `shapes.txt`
    #[derivative(Default(value = "true"))]
    pub write_shapes: bool,
    /// Check the references between tables before writing
    #[derivative(Default(value = "true"))]
    pub check_references: bool,
}

impl GtfsWriter {
    /// Configures the writer to write the shapes table or not (default: true)
    ///
    /// When the shapes are not written, the `shape_id` of the trips are blanked too
    pub fn write_shapes(mut self, write_shapes: bool) -> Self {
        self.write_shapes = write_shapes;
        self
    }

    /// Configures the writer to verify the references between tables (default: true)
    pub fn check_references(mut self, check_references: bool) -> Self {
        self.check_references = check_references;
        self
    }

    /// Serializes every table of the feed as CSV
    pub fn serialize(&self, gtfs: &RawGtfs) -> Result<Vec<SerializedTable>, Error> {
        let stripped;
        let gtfs = if self.write_shapes {
            gtfs
        } else {
            stripped = gtfs.without_shapes();
            &stripped
        };
        if self.check_references {
            gtfs.check_references()?;
        }

        let mut tables = vec![
            serialize_table(ObjectType::Agency, &gtfs.agencies)?,
            serialize_table(ObjectType::Calendar, &gtfs.calendar)?,
            serialize_table(ObjectType::Stop, &gtfs.stops)?,
            serialize_table(ObjectType::Route, &gtfs.routes)?,
            serialize_table(ObjectType::Trip, &gtfs.trips)?,
            serialize_table(ObjectType::StopTime, &gtfs.stop_times)?,
        ];
        if self.write_shapes {
            tables.push(serialize_table(ObjectType::Shape, &gtfs.shapes)?);
        }
        Ok(tables)
    }

    /// Writes the feed as a zip archive
    ///
    /// Entries carry a fixed modification date, so the same feed always gives the same bytes
    pub fn write_to_zip<W: Write + Seek>(&self, gtfs: &RawGtfs, writer: W) -> Result<(), Error> {
        let tables = self.serialize(gtfs)?;
        let mut zip = zip::ZipWriter::new(writer);
        let options = FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        for table in &tables {
            zip.start_file(table.file_name, options)?;
            zip.write_all(&table.content)
                .map_err(|e| Error::NamedFileIO {
                    file_name: table.file_name.to_owned(),
                    source: Box::new(e),
                })?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Writes the feed as a zip archive held in memory
    pub fn to_zip_bytes(&self, gtfs: &RawGtfs) -> Result<Vec<u8>, Error> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        self.write_to_zip(gtfs, &mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Writes one `.txt` file per table in the given directory, creating it if needed
    pub fn write_to_directory<P: AsRef<Path>>(&self, gtfs: &RawGtfs, dir: P) -> Result<(), Error> {
        let tables = self.serialize(gtfs)?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for table in &tables {
            std::fs::write(dir.join(table.file_name), &table.content).map_err(|e| {
                Error::NamedFileIO {
                    file_name: table.file_name.to_owned(),
                    source: Box::new(e),
                }
            })?;
        }
        Ok(())
    }
}

fn serialize_table<O: Serialize>(
    object_type: ObjectType,
    objs: &[O],
) -> Result<SerializedTable, Error> {
    let file_name = object_type.file_name();
    let csv_error = |e: csv::Error| Error::CSVError {
        file_name: file_name.to_owned(),
        source: e,
        line_in_error: None,
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    if objs.is_empty() {
        // serde only discovers the header from a first record
        writer
            .write_record(header_of(object_type))
            .map_err(csv_error)?;
    }
    for obj in objs {
        writer.serialize(obj).map_err(csv_error)?;
    }
    let content = writer.into_inner().map_err(|e| Error::NamedFileIO {
        file_name: file_name.to_owned(),
        source: Box::new(e.into_error()),
    })?;
    log::debug!("{}: {} rows serialized", file_name, objs.len());
    Ok(SerializedTable { file_name, content })
}

fn header_of(object_type: ObjectType) -> &'static [&'static str] {
    match object_type {
        ObjectType::Agency => &["agency_id", "agency_name", "agency_url", "agency_timezone"],
        ObjectType::Calendar => &[
            "service_id",
            "monday",
            "tuesday",
            "wednesday",
            "thursday",
            "friday",
            "saturday",
            "sunday",
            "start_date",
            "end_date",
        ],
        ObjectType::Stop => &["stop_id", "stop_name", "stop_lat", "stop_lon"],
        ObjectType::Route => &["route_id", "route_long_name", "route_type"],
        ObjectType::Trip => &["route_id", "service_id", "trip_id", "shape_id"],
        ObjectType::StopTime => &[
            "trip_id",
            "arrival_time",
            "departure_time",
            "stop_id",
            "stop_sequence",
        ],
        ObjectType::Shape => &[
            "shape_id",
            "shape_pt_lat",
            "shape_pt_lon",
            "shape_pt_sequence",
        ],
    }
}
