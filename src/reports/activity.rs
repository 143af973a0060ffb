//! Sales activity report.
//!
//! Answers the questions the activity dashboard asks: how much work was
//! logged, what the call/email/meeting/task mix looks like, when the
//! team is busiest, and who logs the most.

use crate::analysis::aggregator::{
    bucketize, filter_records, hour_label, summarize, Bucket, GroupKey, KindCount, Metric,
    DAY_LABELS,
};
use crate::analysis::stats::{mean, pct};
use crate::config::Config;
use crate::errors::ReportResult;
use crate::filter::Filter;
use crate::models::{Record, RecordStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Computed numbers behind the activity dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Activities that survived the filter.
    pub total: usize,
    /// Call/email/meeting/task mix, largest share first.
    pub mix: Vec<KindCount>,
    /// Share of activities completed, as a percentage.
    pub completion_rate: f64,
    /// Minutes logged across all activities that carry a duration.
    pub total_minutes: f64,
    /// Mean minutes per activity carrying a duration.
    pub average_minutes: f64,
    /// Activity counts per weekday, Monday first.
    pub by_day: Vec<Bucket>,
    /// Activity counts per hour of day.
    pub by_hour: Vec<Bucket>,
    /// Owners with the most logged activities.
    pub top_owners: Vec<Bucket>,
    /// Label of the weekday with the most activity, if any was logged.
    pub busiest_day: Option<String>,
    /// Label of the hour with the most activity, if any was logged.
    pub busiest_hour: Option<String>,
}

/// Builds the activity report over the records matching `filter`.
///
/// Only activity kinds (calls, emails, meetings, tasks) participate;
/// deals, leads, and tickets in the input are ignored here.
pub fn build_activity_report(
    records: &[Record],
    filter: &Filter,
    config: &Config,
) -> ReportResult<ActivityReport> {
    let survivors: Vec<&Record> = filter_records(records, filter)?
        .into_iter()
        .filter(|r| r.kind.is_activity())
        .collect();

    let summary = summarize(&survivors);
    let completed = summary.count_of(RecordStatus::Completed);

    let minutes: Vec<f64> = survivors.iter().filter_map(|r| r.value).collect();

    let mut by_day = bucketize(&survivors, GroupKey::DayOfWeek, Metric::Count);
    let mut by_hour = bucketize(&survivors, GroupKey::HourOfDay, Metric::Count);
    if config.report.include_empty_buckets {
        by_day = pad_day_buckets(by_day);
        by_hour = pad_hour_buckets(by_hour);
    }

    let mut top_owners = bucketize(&survivors, GroupKey::Owner, Metric::Count);
    top_owners.truncate(config.report.top_limit);

    let report = ActivityReport {
        total: summary.total,
        completion_rate: pct(completed, summary.total),
        total_minutes: minutes.iter().sum(),
        average_minutes: mean(&minutes),
        busiest_day: peak_label(&by_day),
        busiest_hour: peak_label(&by_hour),
        mix: summary.by_kind,
        by_day,
        by_hour,
        top_owners,
    };

    debug!(
        total = report.total,
        completion_rate = report.completion_rate,
        "built activity report"
    );
    Ok(report)
}

/// Fills in zero-count weekdays so the axis always runs Monday to Sunday.
fn pad_day_buckets(observed: Vec<Bucket>) -> Vec<Bucket> {
    DAY_LABELS
        .iter()
        .map(|label| pick_or_empty(&observed, label))
        .collect()
}

/// Fills in zero-count hours so the axis always runs 00:00 to 23:00.
fn pad_hour_buckets(observed: Vec<Bucket>) -> Vec<Bucket> {
    (0..24)
        .map(|hour| pick_or_empty(&observed, &hour_label(hour)))
        .collect()
}

fn pick_or_empty(observed: &[Bucket], label: &str) -> Bucket {
    observed
        .iter()
        .find(|b| b.label == label)
        .cloned()
        .unwrap_or_else(|| Bucket {
            label: label.to_string(),
            count: 0,
            value: 0.0,
        })
}

/// Label of the fullest bucket; `None` when every bucket is empty.
fn peak_label(buckets: &[Bucket]) -> Option<String> {
    buckets
        .iter()
        .filter(|b| b.count > 0)
        .max_by_key(|b| b.count)
        .map(|b| b.label.clone())
}
