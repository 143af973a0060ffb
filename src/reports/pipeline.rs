//! Deal pipeline report.
//!
//! Funnel counts and value by stage, win rate over closed deals, and
//! the open pipeline's raw and probability-weighted value.

use crate::analysis::aggregator::filter_records;
use crate::analysis::stats::{mean, pct};
use crate::config::Config;
use crate::errors::ReportResult;
use crate::filter::Filter;
use crate::models::{PipelineStage, Record, RecordKind, RecordStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One stage of the funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSlice {
    /// The pipeline stage.
    pub stage: PipelineStage,
    /// Deals currently in this stage.
    pub count: usize,
    /// Combined value of those deals.
    pub value: f64,
}

/// Computed numbers behind the pipeline dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Deals that survived the filter.
    pub total_deals: usize,
    /// Every stage in funnel order, including empty ones.
    pub stages: Vec<StageSlice>,
    /// Deals still in play.
    pub open_deals: usize,
    /// Deals won.
    pub won_deals: usize,
    /// Deals lost.
    pub lost_deals: usize,
    /// Won share of closed deals, as a percentage.
    pub win_rate: f64,
    /// Combined value of open deals.
    pub open_value: f64,
    /// Open value weighted by per-stage win probability.
    pub weighted_open_value: f64,
    /// Combined value of won deals.
    pub won_value: f64,
    /// Mean value per deal carrying one.
    pub average_deal_size: f64,
}

/// Builds the pipeline report over the deals matching `filter`.
///
/// A deal is won or lost by its status; everything else counts as open.
/// The weighted value covers open deals that carry both a stage and a
/// value, scaled by the stage weights in `config`.
pub fn build_pipeline_report(
    records: &[Record],
    filter: &Filter,
    config: &Config,
) -> ReportResult<PipelineReport> {
    let deals: Vec<&Record> = filter_records(records, filter)?
        .into_iter()
        .filter(|r| r.kind == RecordKind::Deal)
        .collect();

    let mut stages: Vec<StageSlice> = PipelineStage::ALL
        .iter()
        .map(|&stage| StageSlice {
            stage,
            count: 0,
            value: 0.0,
        })
        .collect();

    let mut open_deals = 0;
    let mut won_deals = 0;
    let mut lost_deals = 0;
    let mut open_value = 0.0;
    let mut weighted_open_value = 0.0;
    let mut won_value = 0.0;
    let mut values = Vec::new();

    for deal in &deals {
        if let Some(stage) = deal.stage {
            let slice = &mut stages[stage as usize];
            slice.count += 1;
            slice.value += deal.value.unwrap_or(0.0);
        }

        match deal.status {
            RecordStatus::Won => {
                won_deals += 1;
                won_value += deal.value.unwrap_or(0.0);
            }
            RecordStatus::Lost => lost_deals += 1,
            _ => {
                open_deals += 1;
                if let Some(value) = deal.value {
                    open_value += value;
                    if let Some(stage) = deal.stage {
                        weighted_open_value += value * config.pipeline.stage_weight(stage);
                    }
                }
            }
        }

        if let Some(value) = deal.value {
            values.push(value);
        }
    }

    let report = PipelineReport {
        total_deals: deals.len(),
        stages,
        open_deals,
        won_deals,
        lost_deals,
        win_rate: pct(won_deals, won_deals + lost_deals),
        open_value,
        weighted_open_value,
        won_value,
        average_deal_size: mean(&values),
    };

    debug!(
        total = report.total_deals,
        win_rate = report.win_rate,
        open_value = report.open_value,
        "built pipeline report"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn deal(id: &str, stage: PipelineStage, status: RecordStatus, value: f64) -> Record {
        Record {
            stage: Some(stage),
            value: Some(value),
            ..Record::new(
                id,
                RecordKind::Deal,
                "alice",
                status,
                Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
            )
        }
    }

    fn sample_pipeline() -> Vec<Record> {
        vec![
            deal("d-1", PipelineStage::Prospecting, RecordStatus::Open, 1000.0),
            deal("d-2", PipelineStage::Proposal, RecordStatus::Open, 4000.0),
            deal("d-3", PipelineStage::Negotiation, RecordStatus::Open, 2000.0),
            deal("d-4", PipelineStage::ClosedWon, RecordStatus::Won, 8000.0),
            deal("d-5", PipelineStage::ClosedWon, RecordStatus::Won, 2000.0),
            deal("d-6", PipelineStage::ClosedLost, RecordStatus::Lost, 5000.0),
        ]
    }

    #[test]
    fn test_funnel_covers_every_stage() {
        let report =
            build_pipeline_report(&sample_pipeline(), &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.stages.len(), 6);
        assert_eq!(report.stages[0].stage, PipelineStage::Prospecting);
        assert_eq!(report.stages[0].count, 1);
        // No deal sits in qualification, the slice is still emitted.
        assert_eq!(report.stages[1].stage, PipelineStage::Qualification);
        assert_eq!(report.stages[1].count, 0);
        assert_eq!(report.stages[4].count, 2);
        assert_eq!(report.stages[4].value, 10_000.0);
    }

    #[test]
    fn test_win_rate_covers_closed_deals_only() {
        let report =
            build_pipeline_report(&sample_pipeline(), &Filter::new(), &Config::default()).unwrap();

        // 2 won of 3 closed; the 3 open deals play no part.
        assert_eq!(report.won_deals, 2);
        assert_eq!(report.lost_deals, 1);
        assert_eq!(report.win_rate, 66.7);
    }

    #[test]
    fn test_open_and_weighted_value() {
        let report =
            build_pipeline_report(&sample_pipeline(), &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.open_deals, 3);
        assert_eq!(report.open_value, 7000.0);
        // 1000*0.10 + 4000*0.50 + 2000*0.75 with the default weights.
        assert_eq!(report.weighted_open_value, 3600.0);
        assert_eq!(report.won_value, 10_000.0);
        assert_eq!(report.average_deal_size, 11_000.0 / 3.0);
    }

    #[test]
    fn test_stageless_deal_counts_but_has_no_slice() {
        let mut records = sample_pipeline();
        records.push(Record {
            stage: None,
            value: Some(600.0),
            ..deal("d-7", PipelineStage::Prospecting, RecordStatus::Open, 0.0)
        });

        let report =
            build_pipeline_report(&records, &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.total_deals, 7);
        assert_eq!(report.open_deals, 4);
        let staged: usize = report.stages.iter().map(|s| s.count).sum();
        assert_eq!(staged, 6);
        // Without a stage there is no weight, so only raw value moves.
        assert_eq!(report.open_value, 7600.0);
        assert_eq!(report.weighted_open_value, 3600.0);
    }

    #[test]
    fn test_no_closed_deals_has_zero_win_rate() {
        let records = vec![deal(
            "d-1",
            PipelineStage::Proposal,
            RecordStatus::Open,
            500.0,
        )];
        let report =
            build_pipeline_report(&records, &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.win_rate, 0.0);
    }

    #[test]
    fn test_empty_pipeline() {
        let report = build_pipeline_report(&[], &Filter::new(), &Config::default()).unwrap();

        assert_eq!(report.total_deals, 0);
        assert_eq!(report.win_rate, 0.0);
        assert_eq!(report.average_deal_size, 0.0);
        assert!(report.stages.iter().all(|s| s.count == 0));
    }
}
