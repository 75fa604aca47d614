//! Runtime site settings stored in `site_settings`.
//!
//! The table is a plain key/value store with JSON values. The public site
//! reads a fixed key set and resolves it against hardcoded defaults; the admin
//! settings form validates and writes the same keys.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::whatsapp::digits_only;

pub const DEFAULT_CAPACITY_MONTHLY: i64 = 40;
pub const DEFAULT_CAPACITY_REMAINING: i64 = 12;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Keys read by the site and written by the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    WhatsappNumber,
    CapacityMonthly,
    CapacityRemaining,
    NextWindow,
}

impl SettingKey {
    pub const ALL: [Self; 4] = [
        Self::CapacityMonthly,
        Self::CapacityRemaining,
        Self::NextWindow,
        Self::WhatsappNumber,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WhatsappNumber => "whatsapp_number",
            Self::CapacityMonthly => "capacity_monthly",
            Self::CapacityRemaining => "capacity_remaining",
            Self::NextWindow => "next_window",
        }
    }

    /// Validate a raw form value and convert it to the stored JSON shape.
    ///
    /// Capacities are stored as non-negative numbers, everything else as
    /// strings.
    ///
    /// # Errors
    ///
    /// Returns the user-facing validation message.
    pub fn validate(self, raw: &str) -> Result<Value, &'static str> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("Obrigatório.");
        }
        match self {
            Self::CapacityMonthly | Self::CapacityRemaining => {
                capacity_input(raw).ok_or("Informe um número válido.")
            }
            Self::WhatsappNumber => {
                if raw.chars().all(|c| c.is_ascii_digit()) {
                    Ok(Value::from(raw))
                } else {
                    Err("Use apenas números.")
                }
            }
            Self::NextWindow => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(|date| Value::from(date.format(DATE_FORMAT).to_string()))
                .map_err(|_| "Data inválida."),
        }
    }
}

impl std::str::FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown setting key: {s}"))
    }
}

/// A row of `site_settings`; also the upsert payload (conflict on `key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRow {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Settings as used by the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub whatsapp_number: String,
    pub capacity_monthly: i64,
    pub capacity_remaining: i64,
    pub next_window: Option<NaiveDate>,
}

impl SiteSettings {
    /// Hardcoded defaults used before, or instead of, the remote values.
    #[must_use]
    pub fn defaults(fallback_whatsapp: &str) -> Self {
        Self {
            whatsapp_number: digits_only(fallback_whatsapp),
            capacity_monthly: DEFAULT_CAPACITY_MONTHLY,
            capacity_remaining: DEFAULT_CAPACITY_REMAINING,
            next_window: None,
        }
    }

    /// Overlay stored rows on the defaults, key by key.
    ///
    /// A key that is missing or holds an unusable value keeps its default.
    #[must_use]
    pub fn resolve(defaults: Self, rows: &[SettingRow]) -> Self {
        let values: HashMap<&str, &Value> = rows
            .iter()
            .map(|row| (row.key.as_str(), &row.value))
            .collect();
        let get = |key: SettingKey| values.get(key.as_str()).copied();

        Self {
            whatsapp_number: get(SettingKey::WhatsappNumber)
                .and_then(phone_value)
                .unwrap_or(defaults.whatsapp_number),
            capacity_monthly: get(SettingKey::CapacityMonthly)
                .and_then(capacity_value)
                .unwrap_or(defaults.capacity_monthly),
            capacity_remaining: get(SettingKey::CapacityRemaining)
                .and_then(capacity_value)
                .unwrap_or(defaults.capacity_remaining),
            next_window: get(SettingKey::NextWindow)
                .and_then(date_value)
                .or(defaults.next_window),
        }
    }

    /// Slots already taken this month, within `0..=capacity_monthly`.
    #[must_use]
    pub fn capacity_used(&self) -> i64 {
        let monthly = self.capacity_monthly.max(0);
        monthly
            .saturating_sub(self.capacity_remaining.max(0))
            .clamp(0, monthly)
    }

    /// `next_window` formatted for display (`dd/mm/yyyy`).
    #[must_use]
    pub fn next_window_label(&self) -> Option<String> {
        self.next_window
            .map(|date| date.format("%d/%m/%Y").to_string())
    }
}

fn phone_value(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let digits = digits_only(&raw);
    (!digits.is_empty()).then_some(digits)
}

/// Stored capacity as a whole count. Fractions are truncated; negative or
/// non-finite values are unusable.
#[allow(clippy::cast_possible_truncation)]
fn capacity_value(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return (n >= 0).then_some(n);
    }
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (number.is_finite() && number >= 0.0).then(|| number.trunc() as i64)
}

/// Form capacity as JSON: whole numbers stay integers, decimals are kept.
fn capacity_input(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return (n >= 0).then(|| Value::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

fn date_value(value: &Value) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}

/// Raw settings form values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsInput {
    #[serde(default)]
    pub whatsapp_number: String,
    #[serde(default)]
    pub capacity_monthly: String,
    #[serde(default)]
    pub capacity_remaining: String,
    #[serde(default)]
    pub next_window: String,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsErrors {
    pub whatsapp_number: Option<&'static str>,
    pub capacity_monthly: Option<&'static str>,
    pub capacity_remaining: Option<&'static str>,
    pub next_window: Option<&'static str>,
}

impl SettingsErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.whatsapp_number.is_none()
            && self.capacity_monthly.is_none()
            && self.capacity_remaining.is_none()
            && self.next_window.is_none()
    }
}

impl SettingsInput {
    /// Prefill the form from stored rows, rendering JSON values as text.
    #[must_use]
    pub fn from_rows(rows: &[SettingRow]) -> Self {
        let mut input = Self::default();
        for row in rows {
            let text = match &row.value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            match row.key.parse::<SettingKey>() {
                Ok(SettingKey::WhatsappNumber) => input.whatsapp_number = text,
                Ok(SettingKey::CapacityMonthly) => input.capacity_monthly = text,
                Ok(SettingKey::CapacityRemaining) => input.capacity_remaining = text,
                Ok(SettingKey::NextWindow) => input.next_window = text,
                Err(_) => {}
            }
        }
        input
    }

    /// Validate every field; rows are produced only when all pass.
    ///
    /// # Errors
    ///
    /// Returns the messages for each failing field.
    pub fn validate(&self) -> Result<Vec<SettingRow>, SettingsErrors> {
        let whatsapp = SettingKey::WhatsappNumber.validate(&self.whatsapp_number);
        let monthly = SettingKey::CapacityMonthly.validate(&self.capacity_monthly);
        let remaining = SettingKey::CapacityRemaining.validate(&self.capacity_remaining);
        let window = SettingKey::NextWindow.validate(&self.next_window);

        match (whatsapp, monthly, remaining, window) {
            (Ok(whatsapp), Ok(monthly), Ok(remaining), Ok(window)) => Ok(vec![
                row(SettingKey::CapacityMonthly, monthly),
                row(SettingKey::CapacityRemaining, remaining),
                row(SettingKey::NextWindow, window),
                row(SettingKey::WhatsappNumber, whatsapp),
            ]),
            (whatsapp, monthly, remaining, window) => Err(SettingsErrors {
                whatsapp_number: whatsapp.err(),
                capacity_monthly: monthly.err(),
                capacity_remaining: remaining.err(),
                next_window: window.err(),
            }),
        }
    }
}

fn row(key: SettingKey, value: Value) -> SettingRow {
    SettingRow {
        key: key.as_str().to_owned(),
        value,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rows(pairs: &[(&str, Value)]) -> Vec<SettingRow> {
        pairs
            .iter()
            .map(|(key, value)| SettingRow {
                key: (*key).to_owned(),
                value: value.clone(),
            })
            .collect()
    }

    #[test]
    fn test_defaults() {
        let defaults = SiteSettings::defaults("+55 (11) 99999-9999");
        assert_eq!(defaults.whatsapp_number, "5511999999999");
        assert_eq!(defaults.capacity_monthly, 40);
        assert_eq!(defaults.capacity_remaining, 12);
        assert!(defaults.next_window.is_none());
    }

    #[test]
    fn test_resolve_overlays_present_keys() {
        let resolved = SiteSettings::resolve(
            SiteSettings::defaults("5511999999999"),
            &rows(&[
                ("capacity_remaining", json!(5)),
                ("whatsapp_number", json!("55 21 98888-7777")),
                ("next_window", json!("2026-11-03")),
            ]),
        );
        assert_eq!(resolved.capacity_remaining, 5);
        assert_eq!(resolved.capacity_monthly, 40);
        assert_eq!(resolved.whatsapp_number, "5521988887777");
        assert_eq!(resolved.next_window_label().as_deref(), Some("03/11/2026"));
    }

    #[test]
    fn test_resolve_ignores_unusable_values() {
        let resolved = SiteSettings::resolve(
            SiteSettings::defaults("5511999999999"),
            &rows(&[
                ("capacity_monthly", json!("lots")),
                ("capacity_remaining", json!(null)),
                ("whatsapp_number", json!("---")),
                ("next_window", json!("31/02/2026")),
            ]),
        );
        assert_eq!(resolved, SiteSettings::defaults("5511999999999"));
    }

    #[test]
    fn test_resolve_accepts_numeric_strings() {
        let resolved = SiteSettings::resolve(
            SiteSettings::defaults("1"),
            &rows(&[("capacity_monthly", json!("30")), ("whatsapp_number", json!(5511))]),
        );
        assert_eq!(resolved.capacity_monthly, 30);
        assert_eq!(resolved.whatsapp_number, "5511");
    }

    #[test]
    fn test_validate_accepts_good_input() {
        let input = SettingsInput {
            whatsapp_number: "5511999999999".to_owned(),
            capacity_monthly: "40".to_owned(),
            capacity_remaining: "7".to_owned(),
            next_window: "2026-12-01".to_owned(),
        };
        let rows = input.validate().unwrap();
        assert_eq!(rows.len(), 4);
        let remaining = rows.iter().find(|r| r.key == "capacity_remaining").unwrap();
        assert_eq!(remaining.value, json!(7));
        let number = rows.iter().find(|r| r.key == "whatsapp_number").unwrap();
        assert_eq!(number.value, json!("5511999999999"));
    }

    #[test]
    fn test_validate_reports_every_field() {
        let input = SettingsInput {
            whatsapp_number: "+55 11".to_owned(),
            capacity_monthly: String::new(),
            capacity_remaining: "doze".to_owned(),
            next_window: "2026-13-01".to_owned(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.whatsapp_number, Some("Use apenas números."));
        assert_eq!(errors.capacity_monthly, Some("Obrigatório."));
        assert_eq!(errors.capacity_remaining, Some("Informe um número válido."));
        assert_eq!(errors.next_window, Some("Data inválida."));
    }

    #[test]
    fn test_resolve_rejects_negative_capacities() {
        let resolved = SiteSettings::resolve(
            SiteSettings::defaults("5511999999999"),
            &rows(&[
                ("capacity_monthly", json!(-3)),
                ("capacity_remaining", json!(-1e300)),
            ]),
        );
        assert_eq!(resolved.capacity_monthly, DEFAULT_CAPACITY_MONTHLY);
        assert_eq!(resolved.capacity_remaining, DEFAULT_CAPACITY_REMAINING);
    }

    #[test]
    fn test_resolve_truncates_decimal_capacity() {
        let resolved = SiteSettings::resolve(
            SiteSettings::defaults("1"),
            &rows(&[("capacity_remaining", json!(12.5)), ("capacity_monthly", json!("40.0"))]),
        );
        assert_eq!(resolved.capacity_remaining, 12);
        assert_eq!(resolved.capacity_monthly, 40);
    }

    #[test]
    fn test_validate_capacity_numbers() {
        assert_eq!(SettingKey::CapacityMonthly.validate("12.5"), Ok(json!(12.5)));
        assert_eq!(SettingKey::CapacityMonthly.validate(" 40 "), Ok(json!(40)));
        assert_eq!(SettingKey::CapacityRemaining.validate("0"), Ok(json!(0)));
        for bad in ["-1", "-0.5", "inf", "NaN", "1e400"] {
            assert_eq!(
                SettingKey::CapacityRemaining.validate(bad),
                Err("Informe um número válido."),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_capacity_used_stays_in_range() {
        let mut settings = SiteSettings::defaults("1");
        assert_eq!(settings.capacity_used(), 28);
        settings.capacity_remaining = 90;
        assert_eq!(settings.capacity_used(), 0);
        settings.capacity_monthly = i64::MAX;
        settings.capacity_remaining = i64::MIN;
        assert_eq!(settings.capacity_used(), i64::MAX);
        settings.capacity_monthly = i64::MIN;
        settings.capacity_remaining = i64::MAX;
        assert_eq!(settings.capacity_used(), 0);
    }

    #[test]
    fn test_from_rows_renders_text() {
        let input = SettingsInput::from_rows(&rows(&[
            ("capacity_monthly", json!(40)),
            ("next_window", json!("2026-12-01")),
            ("unrelated", json!(true)),
        ]));
        assert_eq!(input.capacity_monthly, "40");
        assert_eq!(input.next_window, "2026-12-01");
        assert!(input.whatsapp_number.is_empty());
    }
}
