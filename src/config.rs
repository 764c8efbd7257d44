use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GROUP: &str = "427997";
pub const DEFAULT_WEEKS: usize = 16;
pub const DEFAULT_SITE_ROOT: &str = "https://timetable.spbu.ru";
pub const DEFAULT_OUTPUT: &str = "schedule.ics";
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_FILE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Ics,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub group: String,
    pub weeks: usize,
    pub site_root: String,
    pub output: PathBuf,
    pub page_timeout: Duration,
    pub file_timeout: Duration,
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP.into(),
            weeks: DEFAULT_WEEKS,
            site_root: DEFAULT_SITE_ROOT.into(),
            output: DEFAULT_OUTPUT.into(),
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            file_timeout: DEFAULT_FILE_TIMEOUT,
            format: Format::default(),
        }
    }
}

impl Config {
    /// Listing page of the configured group for the week starting at `monday`.
    pub fn week_url(&self, monday: chrono::NaiveDate) -> String {
        format!(
            "{}/EARTH/StudentGroupEvents/Primary/{}/{}",
            self.site_root.trim_end_matches('/'),
            self.group,
            monday.format("%Y-%m-%d")
        )
    }
}
