//! Helpdesk and SLA report.
//!
//! Ticket backlog and splits, resolution time statistics, per-priority
//! SLA attainment against the configured targets, and a resolution-time
//! distribution for charting.

use crate::analysis::aggregator::{filter_records, summarize, StatusCount};
use crate::analysis::stats::{apportion_percents, mean, pct, percentile, round1};
use crate::config::Config;
use crate::errors::ReportResult;
use crate::filter::Filter;
use crate::models::{Priority, Record, RecordKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tickets of one priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityCount {
    /// The ticket priority.
    pub priority: Priority,
    /// Tickets carrying this priority.
    pub count: usize,
}

/// Descriptive statistics over resolution times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// Mean hours to resolution.
    pub mean_hours: f64,
    /// Median hours to resolution.
    pub median_hours: f64,
    /// 90th percentile hours to resolution.
    pub p90_hours: f64,
    /// Resolved tickets the stats are computed over.
    pub sample: usize,
}

/// SLA attainment for one priority tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritySla {
    /// The ticket priority.
    pub priority: Priority,
    /// Resolution target for the tier, in hours.
    pub target_hours: f64,
    /// Resolved tickets in the tier.
    pub resolved: usize,
    /// Resolved tickets that met the target.
    pub within_target: usize,
    /// Met share of resolved tickets, as a percentage.
    pub attainment: f64,
}

/// Tickets resolved within one time tranche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tranche {
    /// Tranche label, e.g. `1-4h`.
    pub label: String,
    /// Resolved tickets in the tranche.
    pub count: usize,
    /// Share of resolved tickets, as a percentage.
    pub percent: f64,
}

/// Computed numbers behind the helpdesk dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpdeskReport {
    /// Tickets that survived the filter.
    pub total_tickets: usize,
    /// Tickets not yet in a terminal state.
    pub open_backlog: usize,
    /// Per-status counts, largest first.
    pub by_status: Vec<StatusCount>,
    /// Per-priority counts, most urgent first.
    pub by_priority: Vec<PriorityCount>,
    /// Resolution time stats; `None` until a ticket resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionStats>,
    /// SLA attainment per priority tier, most urgent first.
    pub sla: Vec<PrioritySla>,
    /// Resolution time distribution, fastest tranche first.
    pub tranches: Vec<Tranche>,
}

/// Builds the helpdesk report over the tickets matching `filter`.
///
/// A ticket is resolved once it has a close time no earlier than its
/// creation. Priority splits and SLA rows only cover tickets that carry
/// a priority; the backlog and status counts cover all tickets.
pub fn build_helpdesk_report(
    records: &[Record],
    filter: &Filter,
    config: &Config,
) -> ReportResult<HelpdeskReport> {
    let tickets: Vec<&Record> = filter_records(records, filter)?
        .into_iter()
        .filter(|r| r.kind == RecordKind::Ticket)
        .collect();

    let summary = summarize(&tickets);
    let open_backlog = tickets
        .iter()
        .filter(|t| !t.is_closed_state())
        .count();

    let by_priority: Vec<PriorityCount> = Priority::ALL
        .iter()
        .rev()
        .map(|&priority| PriorityCount {
            priority,
            count: tickets
                .iter()
                .filter(|t| t.priority == Some(priority))
                .count(),
        })
        .collect();

    let durations: Vec<f64> = tickets.iter().filter_map(|t| t.resolution_hours()).collect();
    let resolution = if durations.is_empty() {
        None
    } else {
        Some(ResolutionStats {
            mean_hours: round1(mean(&durations)),
            median_hours: round1(percentile(&durations, 50.0)),
            p90_hours: round1(percentile(&durations, 90.0)),
            sample: durations.len(),
        })
    };

    let report = HelpdeskReport {
        total_tickets: summary.total,
        open_backlog,
        by_status: summary.by_status,
        by_priority,
        resolution,
        sla: build_sla_rows(&tickets, config),
        tranches: build_tranches(&durations),
    };

    debug!(
        total = report.total_tickets,
        backlog = report.open_backlog,
        resolved = durations.len(),
        "built helpdesk report"
    );
    Ok(report)
}

/// Attainment per priority tier, most urgent first.
fn build_sla_rows(tickets: &[&Record], config: &Config) -> Vec<PrioritySla> {
    Priority::ALL
        .iter()
        .rev()
        .map(|&priority| {
            let target = config.sla.target_hours(priority);
            let mut resolved = 0;
            let mut within = 0;
            for ticket in tickets {
                if ticket.priority != Some(priority) {
                    continue;
                }
                if let Some(hours) = ticket.resolution_hours() {
                    resolved += 1;
                    if hours <= target {
                        within += 1;
                    }
                }
            }
            PrioritySla {
                priority,
                target_hours: target,
                resolved,
                within_target: within,
                attainment: pct(within, resolved),
            }
        })
        .collect()
}

/// Distribution of resolution times over fixed tranches.
///
/// Tranche shares are apportioned so they total exactly 100 once any
/// ticket has resolved.
fn build_tranches(durations: &[f64]) -> Vec<Tranche> {
    const BOUNDS: [(&str, f64); 4] = [
        ("< 1h", 1.0),
        ("1-4h", 4.0),
        ("4-24h", 24.0),
        ("1-3d", 72.0),
    ];

    let mut counts = [0usize; 5];
    for &hours in durations {
        let slot = BOUNDS
            .iter()
            .position(|(_, upper)| hours < *upper)
            .unwrap_or(4);
        counts[slot] += 1;
    }

    let shares = apportion_percents(&counts, durations.len());
    BOUNDS
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once("> 3d"))
        .zip(counts)
        .zip(shares)
        .map(|((label, count), percent)| Tranche {
            label: label.to_string(),
            count,
            percent,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordStatus;
    use chrono::{TimeZone, Utc};

    fn ticket(id: &str, priority: Priority, status: RecordStatus, hours: Option<f64>) -> Record {
        let created = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        Record {
            priority: Some(priority),
            closed_at: hours
                .map(|h| created + chrono::Duration::seconds((h * 3600.0).round() as i64)),
            ..Record::new(id, RecordKind::Ticket, "dana", status, created)
        }
    }

    fn sample_tickets() -> Vec<Record> {
        vec![
            ticket("t-1", Priority::Urgent, RecordStatus::Resolved, Some(2.0)),
            ticket("t-2", Priority::Urgent, RecordStatus::Resolved, Some(6.0)),
            ticket("t-3", Priority::High, RecordStatus::Closed, Some(7.0)),
            ticket("t-4", Priority::Normal, RecordStatus::Resolved, Some(30.0)),
            ticket("t-5", Priority::Normal, RecordStatus::Open, None),
            ticket("t-6", Priority::Low, RecordStatus::InProgress, None),
            ticket("t-7", Priority::Low, RecordStatus::Resolved, Some(100.0)),
        ]
    }

    #[test]
    fn test_backlog_and_splits() {
        let report =
            build_helpdesk_report(&sample_tickets(), &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.total_tickets, 7);
        assert_eq!(report.open_backlog, 2);

        let priorities: Vec<(Priority, usize)> = report
            .by_priority
            .iter()
            .map(|p| (p.priority, p.count))
            .collect();
        assert_eq!(
            priorities,
            vec![
                (Priority::Urgent, 2),
                (Priority::High, 1),
                (Priority::Normal, 2),
                (Priority::Low, 2),
            ]
        );
    }

    #[test]
    fn test_resolution_stats() {
        let report =
            build_helpdesk_report(&sample_tickets(), &Filter::new(), &Config::default()).unwrap();

        let stats = report.resolution.unwrap();
        assert_eq!(stats.sample, 5);
        // Durations: 2, 6, 7, 30, 100.
        assert_eq!(stats.mean_hours, 29.0);
        assert_eq!(stats.median_hours, 7.0);
        assert_eq!(stats.p90_hours, 72.0);
    }

    #[test]
    fn test_sla_attainment_per_tier() {
        let report =
            build_helpdesk_report(&sample_tickets(), &Filter::new(), &Config::default()).unwrap();

        // Urgent target 4h: one of two resolved within.
        let urgent = &report.sla[0];
        assert_eq!(urgent.priority, Priority::Urgent);
        assert_eq!(urgent.resolved, 2);
        assert_eq!(urgent.within_target, 1);
        assert_eq!(urgent.attainment, 50.0);

        // High target 8h: the 7h ticket makes it.
        let high = &report.sla[1];
        assert_eq!(high.within_target, 1);
        assert_eq!(high.attainment, 100.0);

        // Low target 72h: the 100h ticket breaches.
        let low = &report.sla[3];
        assert_eq!(low.resolved, 1);
        assert_eq!(low.attainment, 0.0);
    }

    #[test]
    fn test_tranche_distribution() {
        let report =
            build_helpdesk_report(&sample_tickets(), &Filter::new(), &Config::default()).unwrap();

        let tranches: Vec<(&str, usize)> = report
            .tranches
            .iter()
            .map(|t| (t.label.as_str(), t.count))
            .collect();
        assert_eq!(
            tranches,
            vec![
                ("< 1h", 0),
                ("1-4h", 1),
                ("4-24h", 2),
                ("1-3d", 1),
                ("> 3d", 1),
            ]
        );
        let percent_total: f64 = report.tranches.iter().map(|t| t.percent).sum();
        assert!((percent_total - 100.0).abs() <= 0.1);
    }

    #[test]
    fn test_tranche_percents_total_one_hundred() {
        // Three resolved tickets across three tranches; thirds do not
        // round cleanly on their own.
        let records = vec![
            ticket("t-1", Priority::Normal, RecordStatus::Resolved, Some(0.5)),
            ticket("t-2", Priority::Normal, RecordStatus::Resolved, Some(2.0)),
            ticket("t-3", Priority::Normal, RecordStatus::Resolved, Some(10.0)),
        ];

        let report =
            build_helpdesk_report(&records, &Filter::new(), &Config::default()).unwrap();

        let percents: Vec<f64> = report.tranches.iter().map(|t| t.percent).collect();
        assert_eq!(percents, vec![33.4, 33.3, 33.3, 0.0, 0.0]);
        let total: f64 = percents.iter().sum();
        assert!((total - 100.0).abs() <= 0.1);
    }

    #[test]
    fn test_unprioritized_tickets_stay_out_of_sla() {
        let created = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let records = vec![Record {
            closed_at: Some(created + chrono::Duration::hours(2)),
            ..Record::new("t-1", RecordKind::Ticket, "dana", RecordStatus::Resolved, created)
        }];

        let report =
            build_helpdesk_report(&records, &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.total_tickets, 1);
        assert!(report.sla.iter().all(|row| row.resolved == 0));
        // It still shows up in the overall resolution stats.
        assert_eq!(report.resolution.unwrap().sample, 1);
    }

    #[test]
    fn test_empty_input() {
        let report = build_helpdesk_report(&[], &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.total_tickets, 0);
        assert_eq!(report.open_backlog, 0);
        assert!(report.by_status.is_empty());
        assert_eq!(report.resolution, None);
        assert!(report.sla.iter().all(|row| row.attainment == 0.0));
        assert!(report.tranches.iter().all(|t| t.count == 0));
    }
}
