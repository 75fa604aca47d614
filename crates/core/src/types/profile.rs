//! Customer profiles (`profiles` table, keyed by auth user id).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Patch applied by the account form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileUpdate {
    /// Trim both fields; blank values clear the column.
    #[must_use]
    pub fn from_form(display_name: &str, city: &str, now: DateTime<Utc>) -> Self {
        let clean = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_owned())
        };
        Self {
            display_name: clean(display_name),
            city: clean(city),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_become_null() {
        let update = ProfileUpdate::from_form("  Ana ", "   ", Utc::now());
        assert_eq!(update.display_name.as_deref(), Some("Ana"));
        assert!(update.city.is_none());
    }
}
