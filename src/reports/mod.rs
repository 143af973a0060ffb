//! Report surfaces.
//!
//! One module per dashboard: activity, pipeline, leads, helpdesk. Each
//! exposes a plain struct of computed numbers and a `build_*` function
//! over a record slice. [`build_crm_report`] assembles all four from a
//! single fetch.

pub mod activity;
pub mod helpdesk;
pub mod leads;
pub mod pipeline;

pub use activity::{build_activity_report, ActivityReport};
pub use helpdesk::{build_helpdesk_report, HelpdeskReport};
pub use leads::{build_lead_report, LeadReport};
pub use pipeline::{build_pipeline_report, PipelineReport};

use crate::analysis::aggregator::{filter_records, summarize, Summary};
use crate::config::Config;
use crate::errors::ReportResult;
use crate::filter::Filter;
use crate::models::Record;
use crate::source::RecordSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// The complete CRM report: every dashboard's numbers in one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmReport {
    /// When the report was computed.
    pub generated_at: DateTime<Utc>,
    /// The filter the report was built under.
    pub filter: Filter,
    /// Headline numbers over everything in scope.
    pub summary: Summary,
    /// Sales activity section.
    pub activity: ActivityReport,
    /// Deal pipeline section.
    pub pipeline: PipelineReport,
    /// Lead conversion section.
    pub leads: LeadReport,
    /// Helpdesk and SLA section.
    pub helpdesk: HelpdeskReport,
}

/// Fetches records once and builds every report section over them.
pub fn build_crm_report(
    source: &dyn RecordSource,
    filter: &Filter,
    config: &Config,
) -> ReportResult<CrmReport> {
    let records = source.fetch(filter)?;
    let report = build_crm_report_from(&records, filter, config)?;

    info!(
        records = records.len(),
        activities = report.activity.total,
        deals = report.pipeline.total_deals,
        leads = report.leads.total_leads,
        tickets = report.helpdesk.total_tickets,
        "built CRM report"
    );
    Ok(report)
}

/// Builds every report section over an already-fetched record slice.
///
/// Filtering is idempotent, so records fetched under `filter` pass
/// through unchanged when each section re-applies it.
pub fn build_crm_report_from(
    records: &[Record],
    filter: &Filter,
    config: &Config,
) -> ReportResult<CrmReport> {
    let survivors = filter_records(records, filter)?;

    Ok(CrmReport {
        generated_at: Utc::now(),
        filter: filter.clone(),
        summary: summarize(&survivors),
        activity: build_activity_report(records, filter, config)?,
        pipeline: build_pipeline_report(records, filter, config)?,
        leads: build_lead_report(records, filter, config)?,
        helpdesk: build_helpdesk_report(records, filter, config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PipelineStage, Priority, RecordKind, RecordStatus};
    use crate::source::{load_records, InMemorySource};
    use chrono::TimeZone;
    use std::path::Path;

    fn mixed_records() -> Vec<Record> {
        let created = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        vec![
            Record {
                value: Some(20.0),
                ..Record::new("c-1", RecordKind::Call, "alice", RecordStatus::Completed, created)
            },
            Record::new("e-1", RecordKind::Email, "bob", RecordStatus::Completed, created),
            Record {
                value: Some(9000.0),
                stage: Some(PipelineStage::Negotiation),
                ..Record::new("d-1", RecordKind::Deal, "alice", RecordStatus::Open, created)
            },
            Record {
                value: Some(61.0),
                ..Record::new("l-1", RecordKind::Lead, "bob", RecordStatus::Converted, created)
            },
            Record {
                priority: Some(Priority::Urgent),
                closed_at: Some(created + chrono::Duration::hours(3)),
                ..Record::new("t-1", RecordKind::Ticket, "dana", RecordStatus::Resolved, created)
            },
        ]
    }

    #[test]
    fn test_every_section_gets_its_records() {
        let source = InMemorySource::new(mixed_records());
        let report = build_crm_report(&source, &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.summary.total, 5);
        assert_eq!(report.activity.total, 2);
        assert_eq!(report.pipeline.total_deals, 1);
        assert_eq!(report.leads.total_leads, 1);
        assert_eq!(report.helpdesk.total_tickets, 1);
    }

    #[test]
    fn test_filter_applies_to_every_section() {
        let source = InMemorySource::new(mixed_records());
        let filter = Filter::new().with_owner("alice");
        let report = build_crm_report(&source, &filter, &Config::default()).unwrap();

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.activity.total, 1);
        assert_eq!(report.pipeline.total_deals, 1);
        assert_eq!(report.leads.total_leads, 0);
        assert_eq!(report.helpdesk.total_tickets, 0);
        assert_eq!(report.filter, filter);
    }

    #[test]
    fn test_invalid_filter_surfaces_before_any_section() {
        let source = InMemorySource::new(mixed_records());
        let filter = Filter {
            min_value: Some(100.0),
            max_value: Some(10.0),
            ..Filter::default()
        };
        assert!(build_crm_report(&source, &filter, &Config::default()).is_err());
    }

    #[test]
    fn test_report_over_fixture_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/records.json");
        let records = load_records(&path).unwrap();
        assert!(!records.is_empty());

        let report =
            build_crm_report_from(&records, &Filter::new(), &Config::default()).unwrap();
        assert_eq!(report.summary.total, records.len());
        let sectioned = report.activity.total
            + report.pipeline.total_deals
            + report.leads.total_leads
            + report.helpdesk.total_tickets;
        assert_eq!(sectioned, records.len());
    }
}
