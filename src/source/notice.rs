//! Loosely-typed notice payloads.
//!
//! The search API returns JSON objects whose field types drift between
//! records (strings, numbers, lists, nulls). [`Notice`] keeps the raw object
//! and offers the few lenient accessors the collection and merge stages need.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw notice object, either a search summary or a detail record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notice(Map<String, Value>);

impl Notice {
    /// Wraps a JSON value, returning `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Raw field access.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the field only when it holds a non-empty value.
    #[must_use]
    pub fn present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| is_present(value))
    }

    /// Field rendered as text, or an empty string when absent or empty.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.present(key).map(value_text).unwrap_or_default()
    }

    /// First present field among `keys`, rendered as text.
    #[must_use]
    pub fn text_any(&self, keys: &[&str]) -> String {
        keys.iter()
            .find_map(|key| self.present(key))
            .map(value_text)
            .unwrap_or_default()
    }

    /// Entity identifier (`entity_id`, falling back to `id`), trimmed.
    #[must_use]
    pub fn entity_id(&self) -> String {
        self.text_any(&["entity_id", "id"]).trim().to_string()
    }

    /// Explicit record identifier (`notice_id`), trimmed.
    #[must_use]
    pub fn notice_id(&self) -> String {
        self.text("notice_id").trim().to_string()
    }

    /// Detail URL from `_links.self`, which is either `{ "href": ... }` or a bare string.
    #[must_use]
    pub fn self_link(&self) -> String {
        let Some(Value::Object(links)) = self.get("_links") else {
            return String::new();
        };
        match links.get("self") {
            Some(Value::Object(link)) => link
                .get("href")
                .filter(|href| is_present(href))
                .map(value_text)
                .unwrap_or_default()
                .trim()
                .to_string(),
            Some(Value::String(href)) => href.trim().to_string(),
            _ => String::new(),
        }
    }

    /// Object entries of a list-valued field; non-object entries are skipped.
    pub fn objects<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
        let items = match self.get(key) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        };
        items.iter().filter_map(Value::as_object)
    }
}

impl From<Map<String, Value>> for Notice {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Returns false for null, empty strings, zero, `false`, and empty containers.
#[must_use]
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Renders a scalar as plain text; containers fall back to compact JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Total match count as reported by the API (may be approximate or zero).
    pub reported_total: u64,
    /// Notices embedded in this page.
    pub notices: Vec<Notice>,
}

impl SearchPage {
    /// Interprets a search response body.
    ///
    /// Accepts `total` as a number or numeric string; reads notices from
    /// `_embedded.notices`, ignoring non-object entries. Returns `None` if the
    /// body is not a JSON object.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut body) = value else {
            return None;
        };
        let reported_total = match body.get("total") {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };
        let notices = match body.remove("_embedded") {
            Some(Value::Object(mut embedded)) => match embedded.remove("notices") {
                Some(Value::Array(items)) => {
                    items.into_iter().filter_map(Notice::from_value).collect()
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Some(Self {
            reported_total,
            notices,
        })
    }

    /// Match count with the observed-results fallback applied.
    ///
    /// Some partitions report `total: 0` while still returning notices; the
    /// larger of the two numbers is used.
    #[must_use]
    pub fn effective_total(&self) -> u64 {
        self.reported_total.max(self.notices.len() as u64)
    }
}
