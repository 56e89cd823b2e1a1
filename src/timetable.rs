//! Wide timetables: one row per stop, one column per trip.
//!
//! ```text
//! Gare,08:00:00,09:00:00
//! Mairie,08:05:00,-
//! Port,08:12:00,09:10:00
//! ```
use crate::error::{Error, Result};
use gtfs_structures::parse_time;
use std::path::Path;

const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];
const ABSENT_MARKER: &str = "-";

/// Parsed content of one route file
#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    /// File name without extension, also the route long name
    pub route_name: String,
    /// Stop names in the physical order of the file
    pub stops: Vec<String>,
    pub trips: Vec<TripColumn>,
}

/// One trip, as a column of the timetable
#[derive(Debug, Clone, PartialEq)]
pub struct TripColumn {
    /// Column of the file, the stop names being column 0
    pub index: usize,
    /// One entry per stop row, `None` when the vehicle does not stop there
    pub times: Vec<Option<u32>>,
}

impl TripColumn {
    pub fn present_times(&self) -> usize {
        self.times.iter().filter(|t| t.is_some()).count()
    }
}

struct Row {
    line: usize,
    cells: Vec<String>,
}

impl Row {
    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// Number of cells up to the last non empty one
    fn width(&self) -> usize {
        self.cells
            .iter()
            .rposition(|c| !c.is_empty())
            .map_or(0, |i| i + 1)
    }
}

impl Timetable {
    pub fn from_path(path: &Path, route_name: &str) -> Result<Self> {
        let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let file = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(route_name);
        Self::from_reader(route_name, file, content.as_slice())
    }

    /// Parses a headerless timetable
    ///
    /// `file` is only used to locate errors.
    pub fn from_reader<R: std::io::Read>(
        route_name: &str,
        file: &str,
        mut reader: R,
    ) -> Result<Self> {
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| Error::io(Path::new(file), e))?;
        let content = content.strip_prefix(&UTF8_BOM).unwrap_or(&content);

        let mut rows = read_rows(file, content)?;
        while rows.last().map_or(false, Row::is_blank) {
            rows.pop();
        }
        if rows.is_empty() {
            return Err(Error::input_format(file, 1, 1, "the timetable has no stop rows"));
        }

        let mut stops = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.is_blank() {
                return Err(Error::input_format(
                    file,
                    row.line,
                    1,
                    "empty row in the middle of the timetable",
                ));
            }
            if row.cells[0].is_empty() {
                return Err(Error::input_format(file, row.line, 1, "blank stop name"));
            }
            stops.push(row.cells[0].clone());
        }

        // spreadsheets pad every row up to the widest one
        let width = rows.iter().map(Row::width).max().unwrap_or(1);
        let mut trips = Vec::with_capacity(width.saturating_sub(1));
        for index in 1..width {
            let times = rows
                .iter()
                .map(|row| parse_cell(file, row, index))
                .collect::<Result<Vec<_>>>()?;
            trips.push(TripColumn { index, times });
        }

        if trips.is_empty() {
            log::warn!("{}: no trip column, the route will have no trips", file);
        }
        Ok(Timetable {
            route_name: route_name.to_owned(),
            stops,
            trips,
        })
    }
}

fn read_rows(file: &str, content: &[u8]) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line() as usize);
            Error::input_format(file, line, 1, e.to_string())
        })?;
        let line = record.position().map_or(rows.len() + 1, |p| p.line() as usize);
        rows.push(Row {
            line,
            cells: record.iter().map(str::to_owned).collect(),
        });
    }
    Ok(rows)
}

fn parse_cell(file: &str, row: &Row, index: usize) -> Result<Option<u32>> {
    match row.cells.get(index).map(String::as_str) {
        None | Some("") | Some(ABSENT_MARKER) => Ok(None),
        Some(cell) => parse_time(cell)
            .map(Some)
            .map_err(|e| Error::input_format(file, row.line, index + 1, e.to_string())),
    }
}
