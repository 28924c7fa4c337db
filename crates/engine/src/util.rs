//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Longest description accepted for assets and categories.
pub(crate) const MAX_DESCRIPTION_LEN: usize = 2048;

/// Longest stored tag list, separators included.
pub(crate) const MAX_TAGS_LEN: usize = 4096;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidField(format!("invalid {label} id")))
}

/// Split a comma separated tag list, dropping blanks.
pub(crate) fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Storage form of a tag list.
pub(crate) fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Trim the tags and drop blanks, rejecting what the stored form cannot
/// give back unchanged.
pub(crate) fn normalize_tags(tags: Vec<String>) -> ResultEngine<Vec<String>> {
    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect();
    if let Some(tag) = tags.iter().find(|t| t.contains(',')) {
        return Err(EngineError::InvalidField(format!(
            "tag \"{tag}\" must not contain ','"
        )));
    }
    if join_tags(&tags).chars().count() > MAX_TAGS_LEN {
        return Err(EngineError::InvalidField(format!(
            "tags longer than {MAX_TAGS_LEN} characters"
        )));
    }
    Ok(tags)
}

/// `[start, end)` of the calendar month (UTC) containing `now`.
pub(crate) fn month_bounds(now: DateTime<Utc>) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single();
    let end = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).single();
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(EngineError::InvalidField("invalid month".to_string())),
    }
}
