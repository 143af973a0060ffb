//! Lead conversion report.
//!
//! Conversion outcomes, score statistics, cold/warm/hot banding, and a
//! per-owner conversion leaderboard.

use crate::analysis::aggregator::filter_records;
use crate::analysis::stats::{apportion_percents, pct, ValueStats};
use crate::config::Config;
use crate::errors::ReportResult;
use crate::filter::Filter;
use crate::models::{Record, RecordKind, RecordStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Leads falling into one temperature band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    /// Band label: `Cold`, `Warm`, or `Hot`.
    pub band: String,
    /// Scored leads in the band.
    pub count: usize,
    /// Share of all scored leads, as a percentage.
    pub percent: f64,
}

/// One owner's conversion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerConversion {
    /// The owning user.
    pub owner: String,
    /// Leads the owner holds.
    pub leads: usize,
    /// Leads the owner converted.
    pub converted: usize,
    /// Converted share of the owner's leads, as a percentage.
    pub conversion_rate: f64,
}

/// Computed numbers behind the lead dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadReport {
    /// Leads that survived the filter.
    pub total_leads: usize,
    /// Leads converted.
    pub converted: usize,
    /// Leads lost.
    pub lost: usize,
    /// Converted share of all leads, as a percentage.
    pub conversion_rate: f64,
    /// Stats over lead scores, when any lead is scored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_stats: Option<ValueStats>,
    /// Cold/warm/hot split of scored leads, coldest first.
    pub score_bands: Vec<ScoreBand>,
    /// Owners converting the most, best first.
    pub top_converters: Vec<OwnerConversion>,
}

/// Builds the lead report over the leads matching `filter`.
///
/// Score bands cover the leads that carry a score; band thresholds come
/// from `config`. The leaderboard ranks owners by converted count, then
/// by rate, and is cut to the configured length.
pub fn build_lead_report(
    records: &[Record],
    filter: &Filter,
    config: &Config,
) -> ReportResult<LeadReport> {
    let leads: Vec<&Record> = filter_records(records, filter)?
        .into_iter()
        .filter(|r| r.kind == RecordKind::Lead)
        .collect();

    let total = leads.len();
    let converted = leads
        .iter()
        .filter(|r| r.status == RecordStatus::Converted)
        .count();
    let lost = leads
        .iter()
        .filter(|r| r.status == RecordStatus::Lost)
        .count();

    let scores: Vec<f64> = leads.iter().filter_map(|r| r.value).collect();
    let score_bands = band_scores(&scores, config);

    let report = LeadReport {
        total_leads: total,
        converted,
        lost,
        conversion_rate: pct(converted, total),
        score_stats: ValueStats::from_values(&scores),
        score_bands,
        top_converters: rank_converters(&leads, config.report.top_limit),
    };

    debug!(
        total = report.total_leads,
        conversion_rate = report.conversion_rate,
        "built lead report"
    );
    Ok(report)
}

/// Splits scored leads into the three temperature bands.
///
/// Band shares are apportioned so they total exactly 100 when any lead
/// carries a score.
fn band_scores(scores: &[f64], config: &Config) -> Vec<ScoreBand> {
    let mut counts = [0usize; 3];
    for &score in scores {
        match config.leads.band(score) {
            "Hot" => counts[2] += 1,
            "Warm" => counts[1] += 1,
            _ => counts[0] += 1,
        }
    }

    let shares = apportion_percents(&counts, scores.len());
    ["Cold", "Warm", "Hot"]
        .iter()
        .zip(counts)
        .zip(shares)
        .map(|((band, count), percent)| ScoreBand {
            band: band.to_string(),
            count,
            percent,
        })
        .collect()
}

/// Ranks owners by converted leads, rate as tiebreak, label as final tiebreak.
fn rank_converters(leads: &[&Record], limit: usize) -> Vec<OwnerConversion> {
    let mut per_owner: HashMap<&str, (usize, usize)> = HashMap::new();
    for lead in leads {
        let entry = per_owner.entry(lead.owner.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if lead.status == RecordStatus::Converted {
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<OwnerConversion> = per_owner
        .into_iter()
        .map(|(owner, (leads, converted))| OwnerConversion {
            owner: owner.to_string(),
            leads,
            converted,
            conversion_rate: pct(converted, leads),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.converted
            .cmp(&a.converted)
            .then_with(|| {
                b.conversion_rate
                    .partial_cmp(&a.conversion_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.owner.cmp(&b.owner))
    });
    ranked.truncate(limit);
    ranked
}
