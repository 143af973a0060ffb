//! Configuration file handling.
//!
//! This module handles loading report tuning from `.crmetrics.toml`
//! files. Every knob has a default, so a missing file or a partial file
//! is always usable.

use crate::models::{PipelineStage, Priority};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Report shape settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Helpdesk SLA targets.
    #[serde(default)]
    pub sla: SlaConfig,

    /// Pipeline stage weighting.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Lead scoring bands.
    #[serde(default)]
    pub leads: LeadConfig,
}

/// Report shape settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Length of leaderboards (top owners, top converters).
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,

    /// Emit zero-count slots so day and hour axes stay complete.
    #[serde(default = "default_true")]
    pub include_empty_buckets: bool,

    /// Width of text bar charts in the markdown report, in characters.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_limit: default_top_limit(),
            include_empty_buckets: true,
            bar_width: default_bar_width(),
        }
    }
}

fn default_top_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_bar_width() -> usize {
    20
}

/// Resolution targets per ticket priority, in hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    /// Target for urgent tickets.
    #[serde(default = "default_urgent_hours")]
    pub urgent_hours: f64,

    /// Target for high priority tickets.
    #[serde(default = "default_high_hours")]
    pub high_hours: f64,

    /// Target for normal priority tickets.
    #[serde(default = "default_normal_hours")]
    pub normal_hours: f64,

    /// Target for low priority tickets.
    #[serde(default = "default_low_hours")]
    pub low_hours: f64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            urgent_hours: default_urgent_hours(),
            high_hours: default_high_hours(),
            normal_hours: default_normal_hours(),
            low_hours: default_low_hours(),
        }
    }
}

impl SlaConfig {
    /// Resolution target for the given priority.
    pub fn target_hours(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Urgent => self.urgent_hours,
            Priority::High => self.high_hours,
            Priority::Normal => self.normal_hours,
            Priority::Low => self.low_hours,
        }
    }
}

fn default_urgent_hours() -> f64 {
    4.0
}

fn default_high_hours() -> f64 {
    8.0
}

fn default_normal_hours() -> f64 {
    24.0
}

fn default_low_hours() -> f64 {
    72.0
}

/// Win-probability weights for open pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Weight for deals in prospecting.
    #[serde(default = "default_prospecting")]
    pub prospecting: f64,

    /// Weight for qualified deals.
    #[serde(default = "default_qualification")]
    pub qualification: f64,

    /// Weight for deals with a proposal out.
    #[serde(default = "default_proposal")]
    pub proposal: f64,

    /// Weight for deals in negotiation.
    #[serde(default = "default_negotiation")]
    pub negotiation: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            prospecting: default_prospecting(),
            qualification: default_qualification(),
            proposal: default_proposal(),
            negotiation: default_negotiation(),
        }
    }
}

impl PipelineConfig {
    /// Weight applied to a deal's value when forecasting.
    ///
    /// Closed stages are certainties: won weighs 1.0, lost weighs 0.0.
    pub fn stage_weight(&self, stage: PipelineStage) -> f64 {
        match stage {
            PipelineStage::Prospecting => self.prospecting,
            PipelineStage::Qualification => self.qualification,
            PipelineStage::Proposal => self.proposal,
            PipelineStage::Negotiation => self.negotiation,
            PipelineStage::ClosedWon => 1.0,
            PipelineStage::ClosedLost => 0.0,
        }
    }
}

fn default_prospecting() -> f64 {
    0.10
}

fn default_qualification() -> f64 {
    0.25
}

fn default_proposal() -> f64 {
    0.50
}

fn default_negotiation() -> f64 {
    0.75
}

/// Score thresholds for lead temperature bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadConfig {
    /// Scores at or above this are warm.
    #[serde(default = "default_warm_score")]
    pub warm_score: f64,

    /// Scores at or above this are hot.
    #[serde(default = "default_hot_score")]
    pub hot_score: f64,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            warm_score: default_warm_score(),
            hot_score: default_hot_score(),
        }
    }
}

impl LeadConfig {
    /// Band label for a lead score.
    pub fn band(&self, score: f64) -> &'static str {
        if score >= self.hot_score {
            "Hot"
        } else if score >= self.warm_score {
            "Warm"
        } else {
            "Cold"
        }
    }
}

fn default_warm_score() -> f64 {
    40.0
}

fn default_hot_score() -> f64 {
    70.0
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the current directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.crmetrics.toml` from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(".crmetrics.toml");

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
