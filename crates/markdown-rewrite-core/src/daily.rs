//! Daily-note navigation: `2024-02-28.md` → `2024-02-29.md`.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate};
use markdown_rewrite_config::DailySettings;
use regex::Regex;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    fn step(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Direction::Next => date.checked_add_days(Days::new(1)),
            Direction::Previous => date.checked_sub_days(Days::new(1)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Next => "next",
            Direction::Previous => "previous",
        })
    }
}

fn date_key() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date key pattern is valid")
    })
}

/// Parse a strict `YYYY-MM-DD` base name into a calendar date.
///
/// Names matching the shape but naming no real day (`2023-02-29`) yield `None`.
pub fn parse_date_key(base_name: &str) -> Option<NaiveDate> {
    if !date_key().is_match(base_name) {
        return None;
    }
    NaiveDate::parse_from_str(base_name, DATE_FORMAT).ok()
}

/// File name of the day after or before `file_name`, using the default `.md` suffix.
pub fn resolve(file_name: &str, direction: Direction) -> Option<String> {
    resolve_with(file_name, direction, &DailySettings::default())
}

/// File name of the day after or before `file_name`.
///
/// The configured suffix is stripped (if present) before matching and always
/// appended to the result. No check is made that the target exists.
pub fn resolve_with(
    file_name: &str,
    direction: Direction,
    settings: &DailySettings,
) -> Option<String> {
    let suffix = settings.suffix();
    let base_name = file_name.strip_suffix(suffix.as_str()).unwrap_or(file_name);

    let Some(date) = parse_date_key(base_name) else {
        tracing::debug!(file_name, "not a daily note name");
        return None;
    };

    let target = direction.step(date)?;
    if !(0..=9999).contains(&target.year()) {
        tracing::debug!(file_name, "adjacent day has no four-digit year");
        return None;
    }
    Some(format!("{}{suffix}", target.format(DATE_FORMAT)))
}
