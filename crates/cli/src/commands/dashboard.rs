//! `lummi dashboard --days N`.

use lummi_core::types::dashboard::{format_count, format_rate};
use lummi_core::{BreakdownRow, DashboardReport, DashboardWindow};
use lummi_supabase::SupabaseClient;

use super::CliError;

/// Print the summary and breakdowns for the window.
///
/// # Errors
///
/// Returns error if the procedure call fails.
#[allow(clippy::print_stdout)]
pub async fn summary(client: &SupabaseClient, days: i64) -> Result<(), CliError> {
    let window = DashboardWindow::from_days(Some(days));
    let report = client.admin_dashboard(window, None).await?;
    for line in report_lines(window, &report) {
        println!("{line}");
    }
    Ok(())
}

fn report_lines(window: DashboardWindow, report: &DashboardReport) -> Vec<String> {
    let summary = &report.summary;
    let mut lines = vec![
        format!("Últimos {}", window.label()),
        format!("  Visualizações        {}", format_count(summary.page_views)),
        format!(
            "  Leads                {} ({})",
            format_count(summary.leads_submitted),
            format_rate(summary.lead_rate)
        ),
        format!(
            "  Cliques no WhatsApp  {} ({})",
            format_count(summary.whatsapp_clicks),
            format_rate(summary.whatsapp_rate)
        ),
    ];

    let sections: [(&str, &[BreakdownRow]); 3] = [
        ("WhatsApp por origem", &report.whatsapp_by_source),
        ("Eventos por origem", report.top_event_sources()),
        ("Leads por status", &report.leads_by_status),
    ];
    for (title, rows) in sections {
        if rows.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(title.to_string());
        lines.extend(
            rows.iter()
                .map(|row| format!("  {:<20} {}", row.display_label(), format_count(row.count))),
        );
    }
    lines
}
