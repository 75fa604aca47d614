//! One-time rewrites of legacy rows.
//!
//! # Usage
//!
//! ```bash
//! # Show what would change
//! lummi migrate portfolio-fields --dry-run
//!
//! # Apply
//! lummi migrate portfolio-fields
//! lummi migrate next-window
//! ```
//!
//! The row mappings live in `lummi_core::migrate`; this module only reads,
//! prints and patches.

use lummi_core::SettingKey;
use lummi_core::migrate::{next_window_value, portfolio_patch};
use lummi_supabase::{Query, SupabaseClient, tables};
use serde_json::{Map, Value};

use super::CliError;

/// A pending patch for one portfolio row.
#[derive(Debug, Clone, PartialEq)]
struct RowPatch {
    id: String,
    patch: Map<String, Value>,
}

/// Patches for every row that needs one. Rows without an id are skipped.
fn plan_portfolio(rows: &[Map<String, Value>]) -> Vec<RowPatch> {
    rows.iter()
        .filter_map(|row| {
            let id = row.get("id").and_then(Value::as_str)?;
            portfolio_patch(row).map(|patch| RowPatch {
                id: id.to_string(),
                patch,
            })
        })
        .collect()
}

/// Fill canonical portfolio columns from legacy ones.
///
/// # Errors
///
/// Returns error if reading or patching fails. Rows patched before the
/// failure stay patched; rerunning is safe because canonical values are
/// never overwritten.
#[allow(clippy::print_stdout)]
pub async fn portfolio_fields(client: &SupabaseClient, dry_run: bool) -> Result<(), CliError> {
    let query = Query::table(tables::PORTFOLIO_ITEMS).select("*");
    let rows: Vec<Map<String, Value>> = client.select(&query, None).await?;
    let plan = plan_portfolio(&rows);

    tracing::info!(rows = rows.len(), patches = plan.len(), "Portfolio rows scanned");

    for RowPatch { id, patch } in &plan {
        println!("{id}: {}", Value::Object(patch.clone()));
        if dry_run {
            continue;
        }
        let target = Query::table(tables::PORTFOLIO_ITEMS).eq("id", id);
        client.update(&target, patch, None).await?;
    }

    if dry_run {
        tracing::info!("Dry run: nothing written");
    } else {
        tracing::info!(patched = plan.len(), "Portfolio migration complete");
    }
    Ok(())
}

/// Rewrite a legacy `{ "date": ... }` next window into the plain string.
///
/// # Errors
///
/// Returns error if reading or writing the setting fails.
#[allow(clippy::print_stdout)]
pub async fn next_window(client: &SupabaseClient, dry_run: bool) -> Result<(), CliError> {
    let rows = client
        .site_settings(&[SettingKey::NextWindow], None)
        .await?;

    let Some(value) = rows.iter().find_map(|row| next_window_value(&row.value)) else {
        tracing::info!("next_window already canonical");
        return Ok(());
    };

    println!("{}: {value}", SettingKey::NextWindow.as_str());
    if dry_run {
        tracing::info!("Dry run: nothing written");
        return Ok(());
    }

    client
        .set_setting(SettingKey::NextWindow.as_str(), value, None)
        .await?;
    tracing::info!("next_window migrated");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rows(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_plan_only_includes_legacy_rows() {
        let plan = plan_portfolio(&rows(json!([
            { "id": "a", "title": "Civic", "cover_url": "https://cdn/a.jpg" },
            { "id": "b", "name": "Old R34", "image_url": "https://cdn/b.jpg" },
            { "name": "No id" },
        ])));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].id, "b");
        assert_eq!(plan[0].patch["title"], "Old R34");
        assert_eq!(plan[0].patch["cover_url"], "https://cdn/b.jpg");
    }
}
