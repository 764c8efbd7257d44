use std::env;

use anyhow::Result;
use chrono::Utc;

use timetable_ics::fetch::HttpFetcher;
use timetable_ics::{cli, sync};

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "timetable_ics=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}

fn main() -> Result<()> {
    let config = cli::parse(env::args().skip(1).collect());

    setup_logging();

    let fetcher = HttpFetcher::new()?;
    sync::run(&config, &fetcher, Utc::now())?;

    Ok(())
}
