//! Admin dashboard aggregates.
//!
//! Everything is computed by the `get_admin_dashboard(p_days)` procedure; this
//! module only fixes the canonical response schema and the display formatting.
//!
//! ```text
//! {
//!   "summary": { "page_views", "leads_submitted", "whatsapp_clicks",
//!                "lead_rate", "whatsapp_rate" },
//!   "whatsapp_by_source": [{ "source", "count" }],
//!   "events_by_source":   [{ "source", "count" }],
//!   "leads_by_status":    [{ "status", "count" }]
//! }
//! ```

use serde::Deserialize;

use super::serde_ext::null_as_default;

/// Number of source rows shown for the events breakdown.
pub const TOP_SOURCES: usize = 10;

/// Time windows offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardWindow {
    #[default]
    Week,
    Month,
}

impl DashboardWindow {
    pub const ALL: [Self; 2] = [Self::Week, Self::Month];

    /// Parse a `days` value; anything but 30 means the 7-day window.
    #[must_use]
    pub const fn from_days(days: Option<i64>) -> Self {
        match days {
            Some(30) => Self::Month,
            _ => Self::Week,
        }
    }

    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Week => "7 dias",
            Self::Month => "30 dias",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_views: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub leads_submitted: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub whatsapp_clicks: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lead_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub whatsapp_rate: f64,
}

/// One row of a breakdown table.
///
/// Source breakdowns name the column `source`, the status breakdown names it
/// `status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BreakdownRow {
    #[serde(default, alias = "source", alias = "status")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: i64,
}

impl BreakdownRow {
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or("(não informado)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: DashboardSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub whatsapp_by_source: Vec<BreakdownRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events_by_source: Vec<BreakdownRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub leads_by_status: Vec<BreakdownRow>,
}

impl DashboardReport {
    /// The events breakdown limited to the top sources.
    #[must_use]
    pub fn top_event_sources(&self) -> &[BreakdownRow] {
        let end = self.events_by_source.len().min(TOP_SOURCES);
        self.events_by_source.get(..end).unwrap_or_default()
    }
}

/// Integer with pt-BR thousands grouping (`12.345`).
#[must_use]
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

/// Conversion rate as a pt-BR percentage with one decimal.
///
/// The procedure may return either a fraction (`0.125`) or a percentage
/// (`12.5`); values above 1 are taken as already being percentages.
#[must_use]
pub fn format_rate(value: f64) -> String {
    if !value.is_finite() {
        return "0,0%".to_owned();
    }
    let percent = if value > 1.0 { value } else { value * 100.0 };
    format!("{percent:.1}%").replace('.', ",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_window_parsing() {
        assert_eq!(DashboardWindow::from_days(Some(30)), DashboardWindow::Month);
        assert_eq!(DashboardWindow::from_days(Some(90)), DashboardWindow::Week);
        assert_eq!(DashboardWindow::from_days(None).days(), 7);
    }

    #[test]
    fn test_report_mapping() {
        let report: DashboardReport = serde_json::from_value(serde_json::json!({
            "summary": { "page_views": 1200, "leads_submitted": 30, "whatsapp_clicks": 90,
                         "lead_rate": 0.025, "whatsapp_rate": 7.5 },
            "whatsapp_by_source": [{ "source": "instagram", "count": 40 }],
            "leads_by_status": [{ "status": "new", "count": 12 }, { "status": null, "count": 1 }]
        }))
        .unwrap();
        assert_eq!(report.summary.page_views, 1200);
        assert_eq!(report.whatsapp_by_source[0].display_label(), "instagram");
        assert_eq!(report.leads_by_status[1].display_label(), "(não informado)");
        assert!(report.events_by_source.is_empty());
    }

    #[test]
    fn test_empty_window_with_nulls() {
        let report: DashboardReport = serde_json::from_value(serde_json::json!({
            "summary": { "page_views": 0, "leads_submitted": 0, "whatsapp_clicks": null,
                         "lead_rate": null, "whatsapp_rate": null },
            "whatsapp_by_source": null,
            "events_by_source": [{ "source": "direct", "count": null }],
            "leads_by_status": null
        }))
        .unwrap();
        assert_eq!(report.summary.whatsapp_clicks, 0);
        assert_eq!(format_rate(report.summary.lead_rate), "0,0%");
        assert_eq!(format_rate(report.summary.whatsapp_rate), "0,0%");
        assert!(report.whatsapp_by_source.is_empty());
        assert!(report.leads_by_status.is_empty());
        assert_eq!(report.events_by_source[0].count, 0);
    }

    #[test]
    fn test_null_summary_is_zeroed() {
        let report: DashboardReport =
            serde_json::from_value(serde_json::json!({ "summary": null })).unwrap();
        assert_eq!(report, DashboardReport::default());
    }

    #[test]
    fn test_top_event_sources_is_capped() {
        let rows: Vec<_> = (0..15)
            .map(|i| serde_json::json!({ "source": format!("s{i}"), "count": i }))
            .collect();
        let report: DashboardReport =
            serde_json::from_value(serde_json::json!({ "events_by_source": rows })).unwrap();
        assert_eq!(report.top_event_sources().len(), TOP_SOURCES);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1234), "1.234");
        assert_eq!(format_count(1_234_567), "1.234.567");
        assert_eq!(format_count(-4500), "-4.500");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.125), "12,5%");
        assert_eq!(format_rate(12.5), "12,5%");
        assert_eq!(format_rate(1.0), "100,0%");
        assert_eq!(format_rate(f64::NAN), "0,0%");
    }
}
