use crate::configuration::Config;
use crate::error::Result;
use crate::feed::build_feed;
use crate::output::{write_feed, OutputOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Converts spreadsheet timetables (one file per route, one row per stop, one column per trip) into a GTFS feed
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub op: Operation,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Operation {
    /// build the GTFS archives
    Convert {
        /// configuration file listing the agency, the services and their routes
        #[arg(short, long)]
        config: PathBuf,

        /// write the archives here instead of the folder_output of the configuration
        #[arg(short, long)]
        output_directory: Option<PathBuf>,

        /// also write the tables as .txt files next to the archives
        #[arg(long)]
        unpacked: bool,

        /// also write a GeoJSON of the stops and shapes to review them on a map
        #[arg(long)]
        geojson: bool,
    },
    /// validate the configuration and parse every timetable without writing anything
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Operation {
    pub fn run(&self) -> Result<()> {
        match self {
            Operation::Convert {
                config,
                output_directory,
                unpacked,
                geojson,
            } => {
                let config = Config::from_file(config)?;
                let feed = build_feed(&config)?;
                let output = output_directory.as_ref().unwrap_or(&config.paths.output);
                let options = OutputOptions {
                    unpacked: *unpacked,
                    geojson: *geojson,
                };
                let written = write_feed(&feed, output, &config.archive_name, options)?;
                feed.print_stats();
                println!("Written: {}", written.archive.display());
                println!("Written: {}", written.shapes_archive.display());
                Ok(())
            }
            Operation::Check { config } => {
                let config = Config::from_file(config)?;
                let feed = build_feed(&config)?;
                feed.print_stats();
                if !feed.review.is_empty() {
                    log::warn!(
                        "the feed can be written but needs a review, see the warnings above"
                    );
                }
                Ok(())
            }
        }
    }
}
