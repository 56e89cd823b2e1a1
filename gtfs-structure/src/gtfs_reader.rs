use serde::Deserialize;

use crate::{Error, ObjectType, RawGtfs};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// Allows to parameterize how the parsing library behaves
///
/// ```
///let stops: Vec<gtfs_structures::Stop> = gtfs_structures::GtfsReader::default()
///    .trim_fields(true)
///    .read_table("fixtures/basic/stops.txt")?;
///assert_eq!(3, stops.len());
/// # Ok::<(), gtfs_structures::error::Error>(())
///```
#[derive(Derivative)]
#[derivative(Default)]
pub struct GtfsReader {
    /// Avoid trimming the fields
    ///
    /// Hand maintained files often have spaces around the separators
    #[derivative(Default(value = "true"))]
    pub trim_fields: bool,
}

impl GtfsReader {
    /// Should the fields be trimmed (default: true)
    pub fn trim_fields(mut self, trim_fields: bool) -> Self {
        self.trim_fields = trim_fields;
        self
    }

    /// Reads a single CSV table with a header line, like a `stops.txt` file
    pub fn read_table<O, P>(&self, path: P) -> Result<Vec<O>, Error>
    where
        for<'de> O: Deserialize<'de>,
        P: AsRef<Path>,
    {
        self.read_objs_from_path(path.as_ref())
    }

    /// Reads the raw GTFS from a local zip archive or local directory
    pub fn read_from_path<P>(&self, path: P) -> Result<RawGtfs, Error>
    where
        P: AsRef<Path> + std::fmt::Display,
    {
        let p = path.as_ref();
        if p.is_file() {
            let reader = File::open(p)?;
            self.read_from_reader(reader)
        } else if p.is_dir() {
            self.read_from_directory(p)
        } else {
            Err(Error::NotFileNorDirectory(format!("{}", p.display())))
        }
    }

    fn read_from_directory(&self, p: &Path) -> Result<RawGtfs, Error> {
        let mut files: Vec<String> = std::fs::read_dir(p)?
            .filter_map(|d| {
                d.ok()
                    .and_then(|d| d.file_name().to_str().map(|s| s.to_owned()))
            })
            .collect();
        files.sort();

        let shapes_path = p.join(ObjectType::Shape.file_name());
        Ok(RawGtfs {
            agencies: self.read_objs_from_path(&p.join(ObjectType::Agency.file_name()))?,
            calendar: self.read_objs_from_path(&p.join(ObjectType::Calendar.file_name()))?,
            stops: self.read_objs_from_path(&p.join(ObjectType::Stop.file_name()))?,
            routes: self.read_objs_from_path(&p.join(ObjectType::Route.file_name()))?,
            trips: self.read_objs_from_path(&p.join(ObjectType::Trip.file_name()))?,
            stop_times: self.read_objs_from_path(&p.join(ObjectType::StopTime.file_name()))?,
            shapes: if shapes_path.exists() {
                self.read_objs_from_path(&shapes_path)?
            } else {
                Vec::new()
            },
            files,
        })
    }

    /// Reads a zipped GTFS from any object implementing [std::io::Read] and [std::io::Seek]
    pub fn read_from_reader<T: std::io::Read + std::io::Seek>(
        &self,
        reader: T,
    ) -> Result<RawGtfs, Error> {
        let mut archive = zip::ZipArchive::new(std::io::BufReader::new(reader))?;
        let mut file_mapping = HashMap::new();
        let mut files = Vec::new();

        for i in 0..archive.len() {
            let archive_file = archive.by_index(i)?;
            files.push(archive_file.name().to_owned());
            let path = Path::new(archive_file.name());
            if let Some(file_name) = path.file_name().and_then(|f| f.to_str()) {
                file_mapping.insert(file_name.to_owned(), i);
            }
        }

        Ok(RawGtfs {
            agencies: self.read_file(&file_mapping, &mut archive, ObjectType::Agency)?,
            calendar: self.read_file(&file_mapping, &mut archive, ObjectType::Calendar)?,
            stops: self.read_file(&file_mapping, &mut archive, ObjectType::Stop)?,
            routes: self.read_file(&file_mapping, &mut archive, ObjectType::Route)?,
            trips: self.read_file(&file_mapping, &mut archive, ObjectType::Trip)?,
            stop_times: self.read_file(&file_mapping, &mut archive, ObjectType::StopTime)?,
            shapes: self
                .read_optional_file(&file_mapping, &mut archive, ObjectType::Shape)
                .unwrap_or_else(|| Ok(Vec::new()))?,
            files,
        })
    }

    fn read_objs<T, O>(&self, mut reader: T, file_name: &str) -> Result<Vec<O>, Error>
    where
        for<'de> O: Deserialize<'de>,
        T: std::io::Read,
    {
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })?;
        let content = content.strip_prefix(&UTF8_BOM).unwrap_or(&content);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(if self.trim_fields {
                csv::Trim::Fields
            } else {
                csv::Trim::None
            })
            .from_reader(content);
        // We store the headers to be able to return them in case of errors
        let headers = reader
            .headers()
            .map_err(|e| Error::CSVError {
                file_name: file_name.to_owned(),
                source: e,
                line_in_error: None,
            })?
            .clone();

        // Pre-allocate a StringRecord for performance reasons
        let mut rec = csv::StringRecord::new();
        let mut objs = Vec::new();

        // Read each record into the pre-allocated StringRecord one at a time
        while reader.read_record(&mut rec).map_err(|e| Error::CSVError {
            file_name: file_name.to_owned(),
            source: e,
            line_in_error: None,
        })? {
            let obj = rec
                .deserialize(Some(&headers))
                .map_err(|e| Error::CSVError {
                    file_name: file_name.to_owned(),
                    source: e,
                    line_in_error: Some(crate::error::LineError {
                        headers: headers.into_iter().map(String::from).collect(),
                        values: rec.into_iter().map(String::from).collect(),
                    }),
                })?;
            objs.push(obj);
        }
        Ok(objs)
    }

    fn read_objs_from_path<O>(&self, path: &Path) -> Result<Vec<O>, Error>
    where
        for<'de> O: Deserialize<'de>,
    {
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("invalid_file_name")
            .to_string();
        if path.exists() {
            File::open(path)
                .map_err(|e| Error::NamedFileIO {
                    file_name: file_name.to_owned(),
                    source: Box::new(e),
                })
                .and_then(|r| self.read_objs(r, &file_name))
        } else {
            Err(Error::MissingFile(file_name))
        }
    }

    fn read_file<O, T>(
        &self,
        file_mapping: &HashMap<String, usize>,
        archive: &mut zip::ZipArchive<T>,
        object_type: ObjectType,
    ) -> Result<Vec<O>, Error>
    where
        for<'de> O: Deserialize<'de>,
        T: std::io::Read + std::io::Seek,
    {
        self.read_optional_file(file_mapping, archive, object_type)
            .unwrap_or_else(|| Err(Error::MissingFile(object_type.file_name().to_owned())))
    }

    fn read_optional_file<O, T>(
        &self,
        file_mapping: &HashMap<String, usize>,
        archive: &mut zip::ZipArchive<T>,
        object_type: ObjectType,
    ) -> Option<Result<Vec<O>, Error>>
    where
        for<'de> O: Deserialize<'de>,
        T: std::io::Read + std::io::Seek,
    {
        let file_name = object_type.file_name();
        file_mapping.get(file_name).map(|i| {
            self.read_objs(
                archive.by_index(*i).map_err(|e| Error::NamedFileIO {
                    file_name: file_name.to_owned(),
                    source: Box::new(e),
                })?,
                file_name,
            )
        })
    }
}
