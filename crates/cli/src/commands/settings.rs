//! `lummi settings show|set`.

use lummi_core::{SettingKey, SettingRow, SiteSettings};
use lummi_supabase::SupabaseClient;

use super::CliError;

/// Number shown when `whatsapp_number` has never been stored.
const FALLBACK_WHATSAPP: &str = "5511999999999";

/// Print the settings as the landing page resolves them.
///
/// # Errors
///
/// Returns error if the settings cannot be read.
#[allow(clippy::print_stdout)]
pub async fn show(client: &SupabaseClient) -> Result<(), CliError> {
    let rows = client.site_settings(&SettingKey::ALL, None).await?;
    let settings = SiteSettings::resolve(SiteSettings::defaults(FALLBACK_WHATSAPP), &rows);

    for key in SettingKey::ALL {
        let stored = rows.iter().any(|row| row.key == key.as_str());
        let origin = if stored { "" } else { " (default)" };
        println!("{:<20} {}{origin}", key.as_str(), display_value(&settings, key));
    }
    Ok(())
}

fn display_value(settings: &SiteSettings, key: SettingKey) -> String {
    match key {
        SettingKey::WhatsappNumber => settings.whatsapp_number.clone(),
        SettingKey::CapacityMonthly => settings.capacity_monthly.to_string(),
        SettingKey::CapacityRemaining => settings.capacity_remaining.to_string(),
        SettingKey::NextWindow => settings
            .next_window
            .map_or_else(|| "-".to_string(), |date| date.to_string()),
    }
}

/// Parse and validate one `key value` pair into the row to store.
fn parse_row(key: &str, raw: &str) -> Result<SettingRow, CliError> {
    let setting: SettingKey = key
        .parse()
        .map_err(|_| CliError::UnknownSetting(key.to_string()))?;
    let value = setting
        .validate(raw)
        .map_err(|message| CliError::InvalidValue {
            key: setting.as_str().to_string(),
            message,
        })?;
    Ok(SettingRow {
        key: setting.as_str().to_string(),
        value,
    })
}

/// Validate and upsert one setting.
///
/// # Errors
///
/// Returns error if the key is unknown, the value is invalid, or the write
/// is rejected.
pub async fn set(client: &SupabaseClient, key: &str, raw: &str) -> Result<(), CliError> {
    let row = parse_row(key, raw)?;
    client.upsert_settings(std::slice::from_ref(&row), None).await?;
    tracing::info!(key = %row.key, value = %row.value, "Setting saved");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_row_validates_like_admin_form() {
        let row = parse_row("capacity_remaining", " 3 ").unwrap();
        assert_eq!(row.key, "capacity_remaining");
        assert_eq!(row.value, json!(3));

        let err = parse_row("capacity_remaining", "três").unwrap_err();
        assert!(matches!(
            err,
            CliError::InvalidValue { message: "Informe um número válido.", .. }
        ));
    }

    #[test]
    fn test_parse_row_rejects_unknown_key() {
        assert!(matches!(
            parse_row("hero_title", "x"),
            Err(CliError::UnknownSetting(key)) if key == "hero_title"
        ));
    }

    #[test]
    fn test_display_value_uses_dash_for_missing_window() {
        let settings = SiteSettings::defaults(FALLBACK_WHATSAPP);
        assert_eq!(display_value(&settings, SettingKey::NextWindow), "-");
        assert_eq!(
            display_value(&settings, SettingKey::WhatsappNumber),
            FALLBACK_WHATSAPP
        );
    }
}
