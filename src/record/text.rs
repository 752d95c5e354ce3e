//! Text cleanup for API field values.

use chrono::{Datelike, Local};
use scraper::Html;
use serde_json::Value;

use crate::source::{is_present, value_text};

/// Oldest age accepted when deriving an age from a date of birth.
const MAX_AGE: i32 = 120;

/// Strips HTML markup and collapses runs of whitespace into single spaces.
///
/// Entities are decoded; adjacent text nodes are separated by a space, so
/// `"a<br>b"` becomes `"a b"`.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if !raw.contains(['<', '&']) {
        return collapse_whitespace(raw);
    }

    let fragment = Html::parse_fragment(&format!("<div>{raw}</div>"));
    let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&joined)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First value of a field that may be a list, a stringified list
/// (`"['BRO', 'BLA']"`), or a scalar, cleaned.
#[must_use]
pub fn first_list_value(value: &Value) -> String {
    if !is_present(value) {
        return String::new();
    }
    if let Value::Array(items) = value {
        return items.first().map(|item| clean_text(&value_text(item))).unwrap_or_default();
    }

    let text = value_text(value);
    let trimmed = text.trim();
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let inner = inner.trim().trim_matches(['\'', '"']);
        let first = match inner.split_once(',') {
            Some((head, _)) => head.trim_matches(['\'', '"', ' ']),
            None => inner,
        };
        return clean_text(first);
    }
    clean_text(trimmed)
}

/// Age in whole years derived from the leading `YYYY` of a date of birth.
///
/// Returns `None` when the date has no four-digit year prefix or the result
/// falls outside `0..=120`.
#[must_use]
pub fn age_in_year(dob: &str, current_year: i32) -> Option<u8> {
    let year = dob.get(..4)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let age = current_year - year.parse::<i32>().ok()?;
    if (0..=MAX_AGE).contains(&age) {
        u8::try_from(age).ok()
    } else {
        None
    }
}

/// [`age_in_year`] against the local calendar year.
#[must_use]
pub fn age_from_dob(dob: &str) -> Option<u8> {
    age_in_year(dob, Local::now().year())
}
