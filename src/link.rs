use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

macro_rules! selector {
    ($query:expr) => {{
        static SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse($query).unwrap());
        &SELECTOR
    }};
}

const SPREADSHEET_EXTENSION: &str = ".xls";
const DOWNLOAD_WORDS: [&str; 2] = ["скачать", "download"];

/// Finds the first anchor on a listing page that points at a schedule spreadsheet.
///
/// An anchor matches when its `href` contains a spreadsheet extension, or when its
/// `href` or visible text contains a "download" word. The match is resolved against
/// `base_url`. `None` means the page has nothing to download.
pub fn find_download_link(document: &Html, base_url: &Url) -> Option<Url> {
    for anchor in document.select(selector!("a[href]")) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let href_lower = href.to_lowercase();
        let text_lower = anchor.text().collect::<String>().to_lowercase();

        let matches = href_lower.contains(SPREADSHEET_EXTENSION)
            || DOWNLOAD_WORDS
                .iter()
                .any(|word| href_lower.contains(word) || text_lower.contains(word));

        if !matches {
            continue;
        }

        match base_url.join(href.trim()) {
            Ok(url) => return Some(url),
            Err(err) => log::debug!("Ignoring unresolvable link {href:?}: {err}"),
        }
    }

    None
}
