use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use getopts::{Matches, Options};

use crate::config::{
    Config, Format, DEFAULT_FILE_TIMEOUT, DEFAULT_GROUP, DEFAULT_OUTPUT, DEFAULT_PAGE_TIMEOUT,
    DEFAULT_SITE_ROOT, DEFAULT_WEEKS,
};

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "g",
        "group",
        &format!("Student group identifier [Default: {DEFAULT_GROUP}]"),
        "GROUP_ID",
    );
    opts.optopt(
        "w",
        "weeks",
        &format!("Number of weeks to fetch, starting with the current [Default: {DEFAULT_WEEKS}]"),
        "COUNT",
    );
    opts.optopt(
        "s",
        "site-root",
        &format!("Timetable site root [Default: {DEFAULT_SITE_ROOT}]"),
        "URL",
    );
    opts.optopt(
        "o",
        "output",
        &format!("File to write the calendar to [Default: {DEFAULT_OUTPUT}]"),
        "PATH",
    );
    opts.optopt(
        "",
        "page-timeout",
        &format!(
            "Timeout for listing pages [Default: {}]",
            DEFAULT_PAGE_TIMEOUT.as_secs()
        ),
        "SECONDS",
    );
    opts.optopt(
        "",
        "file-timeout",
        &format!(
            "Timeout for spreadsheet downloads [Default: {}]",
            DEFAULT_FILE_TIMEOUT.as_secs()
        ),
        "SECONDS",
    );
    opts.optflag(
        "j",
        "json",
        "Write the events as JSON instead of iCalendar [Default: false]",
    );
    opts
}

fn seconds(matches: &Matches, name: &str, default: Duration) -> Result<Duration, String> {
    matches
        .opt_get_default(name, default.as_secs())
        .map(Duration::from_secs)
        .map_err(|err| format!("Provided value for option '{name}' is invalid: {err}"))
}

fn config(matches: &Matches) -> Result<Config, String> {
    let defaults = Config::default();

    let weeks = matches
        .opt_get_default("weeks", defaults.weeks)
        .map_err(|err| format!("Provided value for option 'weeks' is invalid: {err}"))?;

    let site_root = matches.opt_str("site-root").unwrap_or(defaults.site_root);
    url::Url::parse(&site_root)
        .map_err(|err| format!("Provided value for option 'site-root' is invalid: {err}"))?;

    Ok(Config {
        group: matches.opt_str("group").unwrap_or(defaults.group),
        weeks,
        site_root,
        output: matches
            .opt_str("output")
            .map(PathBuf::from)
            .unwrap_or(defaults.output),
        page_timeout: seconds(matches, "page-timeout", defaults.page_timeout)?,
        file_timeout: seconds(matches, "file-timeout", defaults.file_timeout)?,
        format: if matches.opt_present("json") {
            Format::Json
        } else {
            Format::Ics
        },
    })
}

/// Parses arguments (without the program name), exiting on `--help` or invalid input.
pub fn parse(args: Vec<String>) -> Config {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
        process::exit(0);
    }

    match config(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
