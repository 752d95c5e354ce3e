//! Normalization of a summary plus optional detail into one flat output row.
//!
//! [`merge_record`] applies a fixed precedence per field: identity fields come
//! from the summary, physical descriptors prefer the detail, and country
//! codes are rendered through [`countries::display_name`].

pub mod classify;
pub mod countries;
pub mod text;

use serde::Serialize;
use serde_json::Value;

use crate::source::{Notice, is_present, value_text};
use classify::classify_offense;
use text::{age_from_dob, clean_text, first_list_value};

/// Column order of the output file.
pub const FIELD_NAMES: [&str; 18] = [
    "name",
    "forename",
    "date_of_birth",
    "age",
    "sex",
    "place_of_birth",
    "nationality",
    "height",
    "weight",
    "hair_color",
    "eye_color",
    "distinguishing_marks",
    "languages",
    "entity_id",
    "notice_id",
    "warrant_country",
    "url",
    "infractions",
];

/// One flat output row. Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub name: String,
    pub forename: String,
    pub date_of_birth: String,
    pub age: String,
    pub sex: String,
    pub place_of_birth: String,
    pub nationality: String,
    pub height: String,
    pub weight: String,
    pub hair_color: String,
    pub eye_color: String,
    pub distinguishing_marks: String,
    pub languages: String,
    pub entity_id: String,
    pub notice_id: String,
    pub warrant_country: String,
    pub url: String,
    pub infractions: String,
}

/// Merges a search summary with its detail record, if one was fetched.
#[must_use]
pub fn merge_record(summary: &Notice, detail: Option<&Notice>) -> OutputRecord {
    let from_detail = |key: &str| detail.map(|d| d.text(key)).unwrap_or_default();

    let date_of_birth = non_empty_or(summary.text("date_of_birth").trim().to_string(), || {
        from_detail("date_of_birth").trim().to_string()
    });
    let age = age_from_dob(&date_of_birth).map(|age| age.to_string()).unwrap_or_default();

    let sex = non_empty_or(clean_text(&summary.text_any(&["sex_id", "sex"])), || {
        detail.map(|d| clean_text(&d.text_any(&["sex_id", "sex"]))).unwrap_or_default()
    });
    let place_of_birth = non_empty_or(clean_text(&summary.text("place_of_birth")), || {
        clean_text(&from_detail("place_of_birth"))
    });
    let height = non_empty_or(clean_text(&from_detail("height")), || {
        clean_text(&summary.text("height"))
    });
    let weight = non_empty_or(clean_text(&from_detail("weight")), || {
        clean_text(&summary.text("weight"))
    });

    OutputRecord {
        name: clean_text(&summary.text("name")),
        forename: clean_text(&summary.text("forename")),
        date_of_birth,
        age,
        sex,
        place_of_birth,
        nationality: nationality(summary, detail),
        height,
        weight,
        hair_color: descriptor(summary, detail, &["hairs_id", "hair_color"]),
        eye_color: descriptor(summary, detail, &["eyes_colors_id", "eye_color"]),
        distinguishing_marks: clean_text(&from_detail("distinguishing_marks")),
        languages: languages(detail),
        entity_id: summary.entity_id(),
        notice_id: summary.notice_id(),
        warrant_country: warrant_country(summary, detail),
        url: summary.self_link(),
        infractions: infractions(summary, detail),
    }
}

fn non_empty_or(primary: String, fallback: impl FnOnce() -> String) -> String {
    if primary.is_empty() { fallback() } else { primary }
}

/// First present key of the detail, then of the summary, as a list value.
fn descriptor(summary: &Notice, detail: Option<&Notice>, keys: &[&str]) -> String {
    detail
        .into_iter()
        .chain(std::iter::once(summary))
        .flat_map(|notice| keys.iter().filter_map(move |key| notice.present(key)))
        .next()
        .map(first_list_value)
        .unwrap_or_default()
}

fn languages(detail: Option<&Notice>) -> String {
    let Some(detail) = detail else {
        return String::new();
    };
    let Some(value) = detail
        .present("languages_spoken_ids")
        .or_else(|| detail.present("languages_spoken"))
    else {
        return String::new();
    };
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| clean_text(&value_text(item)))
            .collect::<Vec<_>>()
            .join(", "),
        other => clean_text(&value_text(other)),
    }
}

/// Display name of the first nationality; the summary may also carry a bare
/// code, the detail only counts when it holds a list.
fn nationality(summary: &Notice, detail: Option<&Notice>) -> String {
    let code = match summary.present("nationalities") {
        Some(Value::Array(items)) => items.first().map(value_text),
        Some(other) => Some(value_text(other)),
        None => None,
    }
    .map(|code| clean_text(&code))
    .filter(|code| !code.is_empty())
    .or_else(|| match detail?.present("nationalities") {
        Some(Value::Array(items)) => items.first().map(|item| clean_text(&value_text(item))),
        _ => None,
    });
    code.map(|code| countries::display_name(&code)).unwrap_or_default()
}

fn warrant_country(summary: &Notice, detail: Option<&Notice>) -> String {
    std::iter::once(summary)
        .chain(detail)
        .flat_map(|notice| notice.objects("arrest_warrants"))
        .find_map(|warrant| {
            ["issuing_country_id", "issuing_country"]
                .iter()
                .find_map(|key| warrant.get(*key).filter(|value| is_present(value)))
        })
        .map(|code| countries::display_name(&clean_text(&value_text(code))))
        .unwrap_or_default()
}

/// Classified charges of every arrest warrant, summary first, deduplicated in
/// first-seen order.
fn infractions(summary: &Notice, detail: Option<&Notice>) -> String {
    let mut labels: Vec<&'static str> = Vec::new();
    let mut push = |text: &str| {
        let label = classify_offense(text);
        if !label.is_empty() && !labels.contains(&label) {
            labels.push(label);
        }
    };

    for warrant in std::iter::once(summary)
        .chain(detail)
        .flat_map(|notice| notice.objects("arrest_warrants"))
    {
        if let Some(charge) = warrant.get("charge").filter(|v| is_present(v)) {
            push(&value_text(charge));
        }
        if let Some(Value::Array(charges)) = warrant.get("charges") {
            for charge in charges {
                push(&value_text(charge));
            }
        }
        if let Some(translation) = warrant
            .get("charge_translation")
            .filter(|v| is_present(v))
        {
            push(&value_text(translation));
        }
    }
    labels.join(" | ")
}
