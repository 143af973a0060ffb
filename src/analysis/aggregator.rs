//! Record aggregation.
//!
//! This module implements the filter-then-fold pipeline behind every
//! dashboard view: select records with a [`Filter`], fold the survivors
//! into per-kind and per-status summaries, and bucket them along a
//! grouping dimension for charting. Aggregation is pure: inputs are never
//! mutated and the same inputs always produce the same output.

use crate::analysis::stats::{apportion_percents, pct, ValueStats};
use crate::errors::{ReportError, ReportResult};
use crate::filter::Filter;
use crate::models::{PipelineStage, Record, RecordKind, RecordStatus};
use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Bucket labels for day-of-week grouping, Monday first.
pub(crate) const DAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Bucket label for hour-of-day grouping.
pub(crate) fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Dimension records are grouped along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// One bucket per record kind.
    Kind,
    /// One bucket per owning user.
    Owner,
    /// One bucket per lifecycle status.
    Status,
    /// Monday through Sunday, by creation time.
    DayOfWeek,
    /// 00:00 through 23:00, by creation time.
    HourOfDay,
    /// One bucket per pipeline stage; records without a stage are skipped.
    Stage,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Kind => write!(f, "kind"),
            GroupKey::Owner => write!(f, "owner"),
            GroupKey::Status => write!(f, "status"),
            GroupKey::DayOfWeek => write!(f, "day_of_week"),
            GroupKey::HourOfDay => write!(f, "hour_of_day"),
            GroupKey::Stage => write!(f, "stage"),
        }
    }
}

impl FromStr for GroupKey {
    type Err = ReportError;

    /// Parses a dimension name, accepting camel, snake, and kebab case
    /// (`dayOfWeek`, `day_of_week`, `day-of-week`). `category` is an alias
    /// for `kind` kept for callers of the old dashboard API.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();
        match normalized.as_str() {
            "kind" | "category" => Ok(GroupKey::Kind),
            "owner" => Ok(GroupKey::Owner),
            "status" => Ok(GroupKey::Status),
            "dayofweek" | "day" => Ok(GroupKey::DayOfWeek),
            "hourofday" | "hour" => Ok(GroupKey::HourOfDay),
            "stage" | "pipelinestage" => Ok(GroupKey::Stage),
            _ => Err(ReportError::UnknownGroupKey(s.to_string())),
        }
    }
}

/// What each bucket measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Number of records in the bucket.
    #[default]
    Count,
    /// Sum of record values.
    Sum,
    /// Mean of record values; records without a value are left out.
    Average,
    /// Share of the bucket in the given status, as a percentage.
    Rate(RecordStatus),
}

/// Count of survivors of one record kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindCount {
    /// The record kind.
    pub kind: RecordKind,
    /// Number of surviving records of this kind.
    pub count: usize,
    /// One-decimal share of the surviving set; shares across a summary
    /// total exactly 100.
    pub percent: f64,
}

/// Count of survivors in one status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    /// The lifecycle status.
    pub status: RecordStatus,
    /// Number of surviving records in this status.
    pub count: usize,
}

/// Headline numbers for a filtered record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of records that survived the filter.
    pub total: usize,
    /// Per-kind counts, largest first.
    pub by_kind: Vec<KindCount>,
    /// Per-status counts, largest first.
    pub by_status: Vec<StatusCount>,
    /// Stats over record values, when any survivor carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_stats: Option<ValueStats>,
}

impl Summary {
    /// Number of survivors in the given status.
    pub fn count_of(&self, status: RecordStatus) -> usize {
        self.by_status
            .iter()
            .find(|s| s.status == status)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    /// Share of survivors in the given status, as a percentage.
    ///
    /// Returns 0.0 for an empty survivor set.
    pub fn rate_of(&self, status: RecordStatus) -> f64 {
        pct(self.count_of(status), self.total)
    }
}

/// One slice of a grouped aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Display label of the slice.
    pub label: String,
    /// Number of surviving records that mapped to this slice.
    pub count: usize,
    /// Metric value of the slice.
    pub value: f64,
}

/// Result of [`aggregate`]: headline summary plus grouped buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Summary over the surviving records.
    pub summary: Summary,
    /// Buckets along the requested dimension, in deterministic order.
    pub buckets: Vec<Bucket>,
}

/// Selects the records matching `filter`, rejecting impossible ranges.
pub fn filter_records<'a>(records: &'a [Record], filter: &Filter) -> ReportResult<Vec<&'a Record>> {
    filter.validate()?;
    Ok(records.iter().filter(|r| filter.matches(r)).collect())
}

/// Filters `records` and folds the survivors into a summary plus buckets
/// along `group_by`.
///
/// Bucket order is deterministic: calendar order for days, 00-23 for
/// hours, funnel order for stages, declaration order for kinds and
/// statuses, and descending count (label as tiebreak) for owners. Only
/// observed keys produce buckets, so a day-of-week grouping yields at
/// most seven.
pub fn aggregate(
    records: &[Record],
    filter: &Filter,
    group_by: GroupKey,
    metric: Metric,
) -> ReportResult<Aggregation> {
    let survivors = filter_records(records, filter)?;
    let summary = summarize(&survivors);
    let buckets = bucketize(&survivors, group_by, metric);

    debug!(
        total = summary.total,
        buckets = buckets.len(),
        group_by = %group_by,
        "aggregated records"
    );

    Ok(Aggregation { summary, buckets })
}

/// Folds survivors into totals, per-kind counts, and per-status counts.
///
/// Kind shares are one-decimal percentages apportioned so they total
/// exactly 100 for a non-empty set.
pub fn summarize(records: &[&Record]) -> Summary {
    let total = records.len();

    let mut kind_counts: HashMap<RecordKind, usize> = HashMap::new();
    let mut status_counts: HashMap<RecordStatus, usize> = HashMap::new();
    let mut values = Vec::new();

    for record in records {
        *kind_counts.entry(record.kind).or_insert(0) += 1;
        *status_counts.entry(record.status).or_insert(0) += 1;
        if let Some(value) = record.value {
            values.push(value);
        }
    }

    let mut kind_counts: Vec<(RecordKind, usize)> = kind_counts.into_iter().collect();
    kind_counts.sort_by_key(|&(kind, count)| (Reverse(count), kind));
    let shares = apportion_percents(
        &kind_counts.iter().map(|&(_, count)| count).collect::<Vec<_>>(),
        total,
    );
    let by_kind: Vec<KindCount> = kind_counts
        .into_iter()
        .zip(shares)
        .map(|((kind, count), percent)| KindCount {
            kind,
            count,
            percent,
        })
        .collect();

    let mut by_status: Vec<StatusCount> = status_counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    by_status.sort_by_key(|c| (Reverse(c.count), c.status));

    Summary {
        total,
        by_kind,
        by_status,
        value_stats: ValueStats::from_values(&values),
    }
}

/// Per-bucket accumulator for one fold pass.
#[derive(Default)]
struct BucketAcc {
    count: usize,
    value_count: usize,
    value_sum: f64,
    status_hits: usize,
}

impl BucketAcc {
    fn observe(&mut self, record: &Record, metric: Metric) {
        self.count += 1;
        if let Some(value) = record.value {
            self.value_count += 1;
            self.value_sum += value;
        }
        if let Metric::Rate(status) = metric {
            if record.status == status {
                self.status_hits += 1;
            }
        }
    }

    fn metric_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Count => self.count as f64,
            Metric::Sum => self.value_sum,
            Metric::Average => {
                if self.value_count == 0 {
                    0.0
                } else {
                    self.value_sum / self.value_count as f64
                }
            }
            Metric::Rate(_) => pct(self.status_hits, self.count),
        }
    }
}

/// Folds survivors into buckets along `group_by`.
pub(crate) fn bucketize(records: &[&Record], group_by: GroupKey, metric: Metric) -> Vec<Bucket> {
    match group_by {
        GroupKey::Kind => keyed_buckets(records, metric, |r| Some(r.kind), |k| k.to_string()),
        GroupKey::Owner => owner_buckets(records, metric),
        GroupKey::Status => keyed_buckets(records, metric, |r| Some(r.status), |s| s.to_string()),
        GroupKey::DayOfWeek => keyed_buckets(
            records,
            metric,
            |r| Some(r.created_at.weekday().num_days_from_monday()),
            |day| DAY_LABELS[day as usize].to_string(),
        ),
        GroupKey::HourOfDay => {
            keyed_buckets(records, metric, |r| Some(r.created_at.hour()), hour_label)
        }
        GroupKey::Stage => keyed_buckets(records, metric, |r| r.stage, |s: PipelineStage| {
            s.to_string()
        }),
    }
}

/// Generic grouped fold for keys with an intrinsic order.
fn keyed_buckets<K, F, L>(records: &[&Record], metric: Metric, key: F, label: L) -> Vec<Bucket>
where
    K: Eq + std::hash::Hash + Ord + Copy,
    F: Fn(&Record) -> Option<K>,
    L: Fn(K) -> String,
{
    let mut grouped: HashMap<K, BucketAcc> = HashMap::new();
    for record in records {
        if let Some(k) = key(record) {
            grouped.entry(k).or_default().observe(record, metric);
        }
    }

    let mut keys: Vec<K> = grouped.keys().copied().collect();
    keys.sort();

    keys.into_iter()
        .map(|k| {
            let acc = &grouped[&k];
            Bucket {
                label: label(k),
                count: acc.count,
                value: acc.metric_value(metric),
            }
        })
        .collect()
}

/// Owner buckets form a leaderboard: biggest count first, then label.
fn owner_buckets(records: &[&Record], metric: Metric) -> Vec<Bucket> {
    let mut grouped: HashMap<&str, BucketAcc> = HashMap::new();
    for record in records {
        grouped
            .entry(record.owner.as_str())
            .or_default()
            .observe(record, metric);
    }

    let mut buckets: Vec<Bucket> = grouped
        .into_iter()
        .map(|(owner, acc)| Bucket {
            label: owner.to_string(),
            count: acc.count,
            value: acc.metric_value(metric),
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    buckets
}
