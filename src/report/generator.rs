//! Markdown, JSON, and CSV report rendering.
//!
//! Turns a [`CrmReport`] into Markdown for humans, JSON for machines,
//! and CSV bucket rows for spreadsheet hand-off. All display formatting
//! happens here; the report surfaces only carry raw numbers.

use crate::analysis::aggregator::Bucket;
use crate::analysis::stats::scale_unit;
use crate::config::Config;
use crate::filter::Filter;
use crate::format::{
    format_bar, format_count, format_currency, format_hours, format_minutes, format_percent,
};
use crate::reports::{ActivityReport, CrmReport, HelpdeskReport, LeadReport, PipelineReport};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &CrmReport, config: &Config) -> String {
    let mut output = String::new();

    output.push_str("# CRM Report\n\n");
    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_activity_section(&report.activity, config));
    output.push_str(&generate_pipeline_section(&report.pipeline));
    output.push_str(&generate_leads_section(&report.leads, config));
    output.push_str(&generate_helpdesk_section(&report.helpdesk, config));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &CrmReport) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Scope:** {}\n",
        describe_filter(&report.filter)
    ));
    section.push_str(&format!(
        "- **Records:** {}\n",
        format_count(report.summary.total)
    ));
    section.push('\n');

    section
}

/// One line summing up the filter the report was built under.
fn describe_filter(filter: &Filter) -> String {
    let mut parts = Vec::new();

    if let Some(start) = filter.start {
        parts.push(format!("from {}", start.format("%Y-%m-%d")));
    }
    if let Some(end) = filter.end {
        parts.push(format!("to {}", end.format("%Y-%m-%d")));
    }
    if let Some(ref owner) = filter.owner {
        parts.push(format!("owner {}", owner));
    }
    if let Some(kind) = filter.kind {
        parts.push(format!("kind {}", kind));
    }
    if let Some(status) = filter.status {
        parts.push(format!("status {}", status));
    }
    if let Some(entity_type) = filter.related_type {
        parts.push(format!("related to a {}", entity_type));
    }
    if let Some(min) = filter.min_value {
        parts.push(format!("value >= {}", min));
    }
    if let Some(max) = filter.max_value {
        parts.push(format!("value <= {}", max));
    }

    if parts.is_empty() {
        "all records".to_string()
    } else {
        parts.join(", ")
    }
}

/// Generate the record mix and status tables.
fn generate_summary_section(report: &CrmReport) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    if !report.summary.by_kind.is_empty() {
        section.push_str("### Record Mix\n\n");
        section.push_str("| Kind | Count | Share |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for entry in &report.summary.by_kind {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                entry.kind,
                entry.count,
                format_percent(entry.percent)
            ));
        }
        section.push('\n');
    }

    if !report.summary.by_status.is_empty() {
        section.push_str("### By Status\n\n");
        section.push_str("| Status | Count |\n");
        section.push_str("|:---|:---:|\n");
        for entry in &report.summary.by_status {
            section.push_str(&format!("| {} | {} |\n", entry.status, entry.count));
        }
        section.push('\n');
    }

    section
}

/// Generate the sales activity section.
fn generate_activity_section(activity: &ActivityReport, config: &Config) -> String {
    let mut section = String::new();

    section.push_str("## Sales Activity\n\n");
    section.push_str(&format!(
        "- **Activities:** {}\n",
        format_count(activity.total)
    ));
    section.push_str(&format!(
        "- **Completion Rate:** {}\n",
        format_percent(activity.completion_rate)
    ));
    section.push_str(&format!(
        "- **Time Logged:** {} total, {} average\n",
        format_minutes(activity.total_minutes),
        format_minutes(activity.average_minutes)
    ));
    if let (Some(day), Some(hour)) = (&activity.busiest_day, &activity.busiest_hour) {
        section.push_str(&format!("- **Busiest:** {} around {}\n", day, hour));
    }
    section.push('\n');

    if !activity.mix.is_empty() {
        section.push_str("### Mix\n\n");
        section.push_str("| Kind | Count | Share |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for entry in &activity.mix {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                entry.kind,
                entry.count,
                format_percent(entry.percent)
            ));
        }
        section.push('\n');
    }

    if activity.by_day.iter().any(|b| b.count > 0) {
        section.push_str("### By Day\n\n");
        section.push_str(&distribution_table(
            "Day",
            &activity.by_day,
            config.report.bar_width,
        ));
    }

    if !activity.top_owners.is_empty() {
        section.push_str("### Top Owners\n\n");
        section.push_str("| Owner | Activities |\n");
        section.push_str("|:---|:---:|\n");
        for owner in &activity.top_owners {
            section.push_str(&format!("| {} | {} |\n", owner.label, owner.count));
        }
        section.push('\n');
    }

    section
}

/// Generate the deal pipeline section.
fn generate_pipeline_section(pipeline: &PipelineReport) -> String {
    let mut section = String::new();

    section.push_str("## Deal Pipeline\n\n");
    section.push_str(&format!(
        "- **Deals:** {} ({} open, {} won, {} lost)\n",
        format_count(pipeline.total_deals),
        pipeline.open_deals,
        pipeline.won_deals,
        pipeline.lost_deals
    ));
    section.push_str(&format!(
        "- **Win Rate:** {}\n",
        format_percent(pipeline.win_rate)
    ));
    section.push_str(&format!(
        "- **Open Value:** {} ({} weighted)\n",
        format_currency(pipeline.open_value),
        format_currency(pipeline.weighted_open_value)
    ));
    section.push_str(&format!(
        "- **Won Value:** {}\n",
        format_currency(pipeline.won_value)
    ));
    section.push_str(&format!(
        "- **Average Deal Size:** {}\n",
        format_currency(pipeline.average_deal_size)
    ));
    section.push('\n');

    if pipeline.total_deals > 0 {
        section.push_str("### Funnel\n\n");
        section.push_str("| Stage | Deals | Value |\n");
        section.push_str("|:---|:---:|---:|\n");
        for slice in &pipeline.stages {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                slice.stage,
                slice.count,
                format_currency(slice.value)
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the lead conversion section.
fn generate_leads_section(leads: &LeadReport, config: &Config) -> String {
    let mut section = String::new();

    section.push_str("## Leads\n\n");
    section.push_str(&format!(
        "- **Leads:** {} ({} converted, {} lost)\n",
        format_count(leads.total_leads),
        leads.converted,
        leads.lost
    ));
    section.push_str(&format!(
        "- **Conversion Rate:** {}\n",
        format_percent(leads.conversion_rate)
    ));
    if let Some(stats) = &leads.score_stats {
        section.push_str(&format!(
            "- **Scores:** mean {:.1}, min {:.1}, max {:.1}\n",
            stats.mean, stats.min, stats.max
        ));
    }
    section.push('\n');

    if leads.score_bands.iter().any(|b| b.count > 0) {
        section.push_str("### Temperature\n\n");
        section.push_str("| Band | Leads | Share | |\n");
        section.push_str("|:---|:---:|:---:|:---|\n");
        for band in &leads.score_bands {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                band.band,
                band.count,
                format_percent(band.percent),
                format_bar(band.percent / 100.0, config.report.bar_width)
            ));
        }
        section.push('\n');
    }

    if !leads.top_converters.is_empty() {
        section.push_str("### Top Converters\n\n");
        section.push_str("| Owner | Leads | Converted | Rate |\n");
        section.push_str("|:---|:---:|:---:|:---:|\n");
        for entry in &leads.top_converters {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                entry.owner,
                entry.leads,
                entry.converted,
                format_percent(entry.conversion_rate)
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the helpdesk and SLA section.
fn generate_helpdesk_section(helpdesk: &HelpdeskReport, config: &Config) -> String {
    let mut section = String::new();

    section.push_str("## Helpdesk\n\n");
    section.push_str(&format!(
        "- **Tickets:** {}\n",
        format_count(helpdesk.total_tickets)
    ));
    section.push_str(&format!("- **Open Backlog:** {}\n", helpdesk.open_backlog));
    if let Some(resolution) = &helpdesk.resolution {
        section.push_str(&format!(
            "- **Resolution:** mean {}, median {}, p90 {} ({} resolved)\n",
            format_hours(resolution.mean_hours),
            format_hours(resolution.median_hours),
            format_hours(resolution.p90_hours),
            resolution.sample
        ));
    }
    section.push('\n');

    if helpdesk.by_priority.iter().any(|p| p.count > 0) {
        section.push_str("### By Priority\n\n");
        section.push_str("| Priority | Tickets |\n");
        section.push_str("|:---|:---:|\n");
        for entry in &helpdesk.by_priority {
            section.push_str(&format!("| {} | {} |\n", entry.priority, entry.count));
        }
        section.push('\n');
    }

    if helpdesk.sla.iter().any(|row| row.resolved > 0) {
        section.push_str("### SLA Attainment\n\n");
        section.push_str("| Priority | Target | Resolved | Within | Attainment |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
        for row in &helpdesk.sla {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.priority,
                format_hours(row.target_hours),
                row.resolved,
                row.within_target,
                format_percent(row.attainment)
            ));
        }
        section.push('\n');
    }

    if helpdesk.tranches.iter().any(|t| t.count > 0) {
        section.push_str("### Resolution Distribution\n\n");
        section.push_str("| Tranche | Tickets | Share | |\n");
        section.push_str("|:---|:---:|:---:|:---|\n");
        for tranche in &helpdesk.tranches {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                tranche.label,
                tranche.count,
                format_percent(tranche.percent),
                format_bar(tranche.percent / 100.0, config.report.bar_width)
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by crmetrics*\n");

    footer
}

/// Renders a bucket list as a table with min-max scaled text bars.
///
/// A flat distribution scales to zero-length bars; the counts column
/// still tells the story.
fn distribution_table(header: &str, buckets: &[Bucket], bar_width: usize) -> String {
    let mut table = String::new();

    table.push_str(&format!("| {} | Count | |\n", header));
    table.push_str("|:---|:---:|:---|\n");

    let counts: Vec<f64> = buckets.iter().map(|b| b.count as f64).collect();
    let scaled = scale_unit(&counts);
    for (bucket, fraction) in buckets.iter().zip(scaled) {
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            bucket.label,
            bucket.count,
            format_bar(fraction, bar_width)
        ));
    }
    table.push('\n');

    table
}

/// Render a bucket list as CSV rows for spreadsheet export.
pub fn generate_csv_buckets(buckets: &[Bucket]) -> String {
    let mut output = String::from("label,count,value\n");

    for bucket in buckets {
        output.push_str(&format!(
            "{},{},{}\n",
            csv_field(&bucket.label),
            bucket.count,
            bucket.value
        ));
    }

    output
}

/// Quotes a CSV field when it would otherwise break the row.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &CrmReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write the Markdown report to a file.
pub fn write_report(report: &CrmReport, config: &Config, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report, config);

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

/// Write a JSON report to a file.
pub fn write_json_report(report: &CrmReport, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}
