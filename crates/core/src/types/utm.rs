//! UTM campaign parameters.

use serde::{Deserialize, Serialize};

/// Query parameter names captured from landing URLs.
pub const UTM_KEYS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
];

const MAX_VALUE_LEN: usize = 200;

/// The UTM set attached to leads and analytics events.
///
/// Serialized flat into the owning row, so absent values are skipped rather
/// than written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
}

impl Utm {
    /// Collect UTM values from query pairs, ignoring unrelated and blank keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut utm = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            let value: String = value.chars().take(MAX_VALUE_LEN).collect();
            match key.as_ref() {
                "utm_source" => utm.utm_source = Some(value),
                "utm_medium" => utm.utm_medium = Some(value),
                "utm_campaign" => utm.utm_campaign = Some(value),
                "utm_content" => utm.utm_content = Some(value),
                "utm_term" => utm.utm_term = Some(value),
                _ => {}
            }
        }
        utm
    }

    /// True when no UTM parameter was present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.utm_source.is_none()
            && self.utm_medium.is_none()
            && self.utm_campaign.is_none()
            && self.utm_content.is_none()
            && self.utm_term.is_none()
    }

    /// Event source tag: the campaign source, or `direct`.
    #[must_use]
    pub fn source_or_direct(&self) -> &str {
        self.utm_source.as_deref().unwrap_or("direct")
    }
}
