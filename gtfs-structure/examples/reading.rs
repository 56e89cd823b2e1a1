use gtfs_structures::RawGtfs;

/// prints some stats about the feed given as a cli argument, a zip archive or a directory
fn main() {
    let file_path = std::env::args()
        .nth(1)
        .expect("you should put the path of the feed to load");

    println!("reading feed {}", &file_path);
    match RawGtfs::from_path(&file_path) {
        Ok(gtfs) => {
            gtfs.print_stats();
            match gtfs.check_references() {
                Ok(()) => println!("all references are valid"),
                Err(e) => eprintln!("invalid feed: {}", e),
            }
        }
        Err(e) => eprintln!("error: {:?}", e),
    }
}
