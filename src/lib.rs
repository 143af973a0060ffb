//! crmetrics - CRM report aggregation engine
//!
//! An in-memory engine that turns flat CRM records (activities, deals,
//! leads, tickets) into the numbers behind dashboard reports: filtered
//! summaries, grouped buckets, full report sections, and Markdown, JSON,
//! and CSV rendering.
//!
//! The core is pure and synchronous. [`aggregate`] never mutates its
//! input and the same input always produces the same output, so callers
//! can cache results, retry freely, and fan work out across threads.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use crmetrics::{aggregate, Filter, GroupKey, Metric, Record, RecordKind, RecordStatus};
//!
//! let records = vec![
//!     Record::new(
//!         "call-1",
//!         RecordKind::Call,
//!         "alice",
//!         RecordStatus::Completed,
//!         Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap(),
//!     ),
//!     Record::new(
//!         "call-2",
//!         RecordKind::Call,
//!         "bob",
//!         RecordStatus::Open,
//!         Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap(),
//!     ),
//! ];
//!
//! let result = aggregate(&records, &Filter::new(), GroupKey::Owner, Metric::Count)?;
//! assert_eq!(result.summary.total, 2);
//! assert_eq!(result.buckets.len(), 2);
//! # Ok::<(), crmetrics::ReportError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod errors;
pub mod filter;
pub mod format;
pub mod logging;
pub mod models;
pub mod report;
pub mod reports;
pub mod source;

pub use analysis::aggregator::{
    aggregate, filter_records, summarize, Aggregation, Bucket, GroupKey, KindCount, Metric,
    StatusCount, Summary,
};
pub use analysis::stats::ValueStats;
pub use config::Config;
pub use errors::{ReportError, ReportResult};
pub use filter::Filter;
pub use models::{
    EntityType, PipelineStage, Priority, Record, RecordKind, RecordStatus, RelatedEntity,
};
pub use report::{generate_csv_buckets, generate_json_report, generate_markdown_report};
pub use reports::{build_crm_report, CrmReport};
pub use source::{load_records, InMemorySource, RecordSource};
