//! One-time rewrites of legacy row shapes.
//!
//! Early portfolio rows used `name` instead of `title` and `image_url` or
//! `thumbnail_url` instead of `cover_url`, and `next_window` was once stored as
//! `{ "date": "YYYY-MM-DD" }`. The application only reads the canonical shape;
//! these helpers compute the patches the CLI applies once.

use serde_json::{Map, Value};

const LEGACY_COVER_FIELDS: [&str; 2] = ["image_url", "thumbnail_url"];

fn text<'a>(row: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    row.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Patch that fills empty canonical portfolio columns from legacy ones.
///
/// Returns `None` when the row needs no change. Canonical values are never
/// overwritten.
#[must_use]
pub fn portfolio_patch(row: &Map<String, Value>) -> Option<Map<String, Value>> {
    let mut patch = Map::new();

    if text(row, "title").is_none()
        && let Some(name) = text(row, "name")
    {
        patch.insert("title".to_owned(), Value::from(name));
    }

    if text(row, "cover_url").is_none()
        && let Some(cover) = LEGACY_COVER_FIELDS
            .iter()
            .find_map(|field| text(row, field))
    {
        patch.insert("cover_url".to_owned(), Value::from(cover));
    }

    (!patch.is_empty()).then_some(patch)
}

/// Canonical string form of a legacy `next_window` value.
///
/// Returns `None` when the value is already canonical or unusable.
#[must_use]
pub fn next_window_value(value: &Value) -> Option<Value> {
    value
        .as_object()
        .and_then(|obj| obj.get("date"))
        .and_then(Value::as_str)
        .map(|date| Value::from(date.trim()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_portfolio_patch_fills_from_legacy_fields() {
        let patch = portfolio_patch(&obj(json!({
            "id": "x",
            "name": "Old Civic",
            "title": null,
            "thumbnail_url": "https://cdn/t.jpg",
        })))
        .unwrap();
        assert_eq!(patch["title"], "Old Civic");
        assert_eq!(patch["cover_url"], "https://cdn/t.jpg");
    }

    #[test]
    fn test_portfolio_patch_prefers_image_url() {
        let patch = portfolio_patch(&obj(json!({
            "title": "Keep me",
            "image_url": "https://cdn/i.jpg",
            "thumbnail_url": "https://cdn/t.jpg",
        })))
        .unwrap();
        assert!(!patch.contains_key("title"));
        assert_eq!(patch["cover_url"], "https://cdn/i.jpg");
    }

    #[test]
    fn test_canonical_row_needs_no_patch() {
        assert!(
            portfolio_patch(&obj(json!({
                "title": "A",
                "cover_url": "https://cdn/a.jpg",
                "name": "ignored",
            })))
            .is_none()
        );
    }

    #[test]
    fn test_next_window_value() {
        assert_eq!(
            next_window_value(&json!({ "date": "2026-11-03" })),
            Some(json!("2026-11-03"))
        );
        assert_eq!(next_window_value(&json!("2026-11-03")), None);
        assert_eq!(next_window_value(&json!({ "when": "soon" })), None);
    }
}
