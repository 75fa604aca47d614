//! Lenient field decoders for backend rows.
//!
//! PostgREST happily returns `null` for columns we treat as required, and
//! `#[serde(default)]` only covers missing keys. These helpers keep a single
//! odd row from failing a whole list.

use serde::{Deserialize, Deserializer};

/// Decode `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode an optional value through `FromStr`, dropping anything unparsable.
pub(crate) fn lenient_parse<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "null_as_default")]
        count: i64,
        #[serde(default, deserialize_with = "null_as_default")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "lenient_parse")]
        day: Option<u8>,
    }

    #[test]
    fn test_null_and_missing_fall_back() {
        let row: Row = serde_json::from_value(json!({"count": null, "tags": null})).unwrap();
        assert_eq!(row.count, 0);
        assert!(row.tags.is_empty());
        assert!(row.day.is_none());
    }

    #[test]
    fn test_present_values_are_kept() {
        let row: Row =
            serde_json::from_value(json!({"count": 3, "tags": ["a"], "day": "7"})).unwrap();
        assert_eq!(row.count, 3);
        assert_eq!(row.tags, ["a"]);
        assert_eq!(row.day, Some(7));
    }

    #[test]
    fn test_unparsable_string_becomes_none() {
        let row: Row = serde_json::from_value(json!({"day": "monday"})).unwrap();
        assert!(row.day.is_none());
        let row: Row = serde_json::from_value(json!({"day": 7})).unwrap();
        assert!(row.day.is_none());
    }

    #[test]
    fn test_wrong_type_still_errors() {
        assert!(serde_json::from_value::<Row>(json!({"count": "many"})).is_err());
    }
}
