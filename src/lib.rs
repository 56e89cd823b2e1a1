/*! Converts hand maintained timetables into a [GTFS](https://gtfs.org/) feed.

Each route is a headerless CSV file: the first column holds the stop names in
the order they appear on the sheet, every other column is a trip. A TOML
configuration groups route files into services (the calendar) and describes
the agency:

```toml
folder_input = "timetables"
folder_output = "output"
stops = "stops.csv"
agency_id = "ACME"
agency_name = "Acme Transit"
agency_url = "https://acme.example"
agency_timezone = "Europe/Paris"

[[services]]
service_id = "weekday"
monday = true
start_date = "20240101"
end_date = "20241231"
routes = ["line1", "line2"]
```

[build_feed] turns a [Config] into a [Feed], and [write_feed] stores it as
`gtfs.zip` and `gtfs_shapes.zip`. Stops unknown to the catalog get a stable
id derived from their name ([mint_stop_id]) and placeholder coordinates;
everything needing a human eye ends up in the [ReviewReport].
*/

pub mod app;
pub mod configuration;
pub mod error;
pub mod feed;
pub mod output;
pub mod review;
pub mod shape;
pub mod stop_registry;
pub mod stop_times;
pub mod timetable;
pub mod trips;

#[cfg(test)]
mod tests;

pub use configuration::Config;
pub use error::Error;
pub use feed::{build_feed, Feed, FeedBuilder, ReviewReport};
pub use output::{write_feed, OutputOptions, WrittenFiles};
pub use stop_registry::{mint_stop_id, StopRegistry};
