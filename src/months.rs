/// Maps a Russian month name in the genitive case ("сентября") to its number.
///
/// Expects lower-case input.
pub fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "января" => 1,
        "февраля" => 2,
        "марта" => 3,
        "апреля" => 4,
        "мая" => 5,
        "июня" => 6,
        "июля" => 7,
        "августа" => 8,
        "сентября" => 9,
        "октября" => 10,
        "ноября" => 11,
        "декабря" => 12,
        _ => return None,
    };

    Some(month)
}
