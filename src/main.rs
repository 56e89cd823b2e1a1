use anyhow::Context;
use clap::Parser;
use timetable2gtfs::app::App;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = App::parse();
    args.op
        .run()
        .with_context(|| format!("{:?} failed", args.op))
}
