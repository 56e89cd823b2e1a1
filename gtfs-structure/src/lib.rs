/*! The [General Transit Feed Specification](https://gtfs.org/) (GTFS) is a commonly used model to represent public transit data.

This crate brings [serde](https://serde.rs) structures of the static tables that `timetable2gtfs` produces,
helpers to read them back, and a writer that serializes them to a directory or a zip archive.

To get started, see [RawGtfs] and [GtfsWriter].

## What is GTFS

A Gtfs feed is a collection of CSV files (often bundled as a zip file).
Each file represents a collection of one type (stops, routes, etc.) that have relationships through unique identifiers.

## Design decisions

### One representation

The [RawGtfs] representation holds the objects as close as possible to their CSV representation, one `Vec` per table,
in the order the rows are written. [RawGtfs::check_references] verifies the relationships before a feed is written.

### Only the produced fields

Each object only carries the fields a hand maintained timetable can fill: the mandatory fields of the
reference plus `shape_id` on trips. The header of every file is therefore stable.

### Renaming

We kept some names even if they can be confusing (a [Calendar] will be referenced by `service_id`), but we strip the object type (`route_long_name` is [Route::long_name]).

*/
#![warn(missing_docs)]

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

mod enums;
pub mod error;
mod gtfs_reader;
mod gtfs_writer;
pub(crate) mod objects;
mod raw_gtfs;
mod serde_helpers;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use gtfs_reader::GtfsReader;
pub use gtfs_writer::{GtfsWriter, SerializedTable};
pub use objects::*;
pub use raw_gtfs::RawGtfs;
pub use serde_helpers::{format_time, parse_time};
