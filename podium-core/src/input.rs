//! Normalising what people type before it is compared with page text.

use chrono::{Datelike, Local};
use regex::Regex;
use std::sync::LazyLock;

pub const EARLIEST_YEAR: i32 = 1800;

/// The country part of a flag file name, which must be followed by an extension.
static FLAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Flag_of_([a-zA-Z_\-%289]+)\.").expect("valid regex"));

/// Capitalise `s` word by word, or only its first word when `only_first`.
///
/// Capitalised words have the rest of their letters lowercased; words after
/// the first are left untouched in `only_first` mode. Runs of whitespace
/// collapse to one space.
pub fn capitalize(s: &str, only_first: bool) -> String {
    s.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            if only_first && i > 0 {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Country names are capitalised on every word: "great britain" -> "Great Britain".
pub fn normalize_country(s: &str) -> String {
    capitalize(s, false)
}

/// Sport names only on the first: "modern pentathlon" -> "Modern pentathlon".
pub fn normalize_sport(s: &str) -> String {
    capitalize(s, true)
}

/// Four digits naming a year between 1800 and this year.
pub fn is_valid_year(s: &str) -> bool {
    parse_year(s).is_some()
}

pub fn parse_year(s: &str) -> Option<i32> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s.parse().ok()?;
    (EARLIEST_YEAR..=Local::now().year()).contains(&year).then_some(year)
}

/// File stem for a flag image URL: the part after `Flag_of_`, lowercased,
/// with dashes and spaces turned into underscores and encoded parentheses
/// dropped. `unknown` when the URL does not name a flag.
pub fn flag_file_stem(url: &str) -> String {
    FLAG_NAME
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|name| {
            name.as_str()
                .replace(' ', "_")
                .replace('-', "_")
                .replace("%28", "")
                .replace("%29", "")
                .to_lowercase()
        })
        .unwrap_or_else(|| "unknown".to_string())
}
