//! Data models for CRM reporting.
//!
//! This module contains all the core data structures used throughout
//! the crate for representing records, their lifecycle, and the
//! entities they are attached to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of CRM record a row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Logged phone call - value holds the duration in minutes
    Call,
    /// Sent or received email
    Email,
    /// Scheduled meeting - value holds the duration in minutes
    Meeting,
    /// To-do item assigned to an owner
    Task,
    /// Sales opportunity - value holds the deal amount
    Deal,
    /// Unqualified prospect - value holds the lead score
    Lead,
    /// Support ticket
    Ticket,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Call => write!(f, "Call"),
            RecordKind::Email => write!(f, "Email"),
            RecordKind::Meeting => write!(f, "Meeting"),
            RecordKind::Task => write!(f, "Task"),
            RecordKind::Deal => write!(f, "Deal"),
            RecordKind::Lead => write!(f, "Lead"),
            RecordKind::Ticket => write!(f, "Ticket"),
        }
    }
}

impl RecordKind {
    /// All kinds in display order.
    pub const ALL: [RecordKind; 7] = [
        RecordKind::Call,
        RecordKind::Email,
        RecordKind::Meeting,
        RecordKind::Task,
        RecordKind::Deal,
        RecordKind::Lead,
        RecordKind::Ticket,
    ];

    /// Returns true for the activity kinds (calls, emails, meetings, tasks).
    pub fn is_activity(&self) -> bool {
        matches!(
            self,
            RecordKind::Call | RecordKind::Email | RecordKind::Meeting | RecordKind::Task
        )
    }
}

/// Lifecycle status shared across record kinds.
///
/// Activities move through `Open`/`InProgress`/`Completed`, deals end in
/// `Won`/`Lost`, leads in `Converted`/`Lost`, tickets in `Resolved`/`Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Newly created, not yet worked
    Open,
    /// Actively being worked
    InProgress,
    /// Activity finished
    Completed,
    /// Deal closed in our favor
    Won,
    /// Deal or lead closed against us
    Lost,
    /// Lead turned into a deal or contact
    Converted,
    /// Ticket fixed, awaiting confirmation
    Resolved,
    /// Ticket confirmed done
    Closed,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Open => write!(f, "Open"),
            RecordStatus::InProgress => write!(f, "In Progress"),
            RecordStatus::Completed => write!(f, "Completed"),
            RecordStatus::Won => write!(f, "Won"),
            RecordStatus::Lost => write!(f, "Lost"),
            RecordStatus::Converted => write!(f, "Converted"),
            RecordStatus::Resolved => write!(f, "Resolved"),
            RecordStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl RecordStatus {
    /// All statuses in display order.
    pub const ALL: [RecordStatus; 8] = [
        RecordStatus::Open,
        RecordStatus::InProgress,
        RecordStatus::Completed,
        RecordStatus::Won,
        RecordStatus::Lost,
        RecordStatus::Converted,
        RecordStatus::Resolved,
        RecordStatus::Closed,
    ];

    /// Returns true once a record has reached a final state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordStatus::Open | RecordStatus::InProgress)
    }
}

/// Stage of a deal in the sales pipeline, ordered from first contact to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Initial outreach
    Prospecting,
    /// Fit and budget confirmed
    Qualification,
    /// Offer sent
    Proposal,
    /// Terms being discussed
    Negotiation,
    /// Deal won
    ClosedWon,
    /// Deal lost
    ClosedLost,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Prospecting => write!(f, "Prospecting"),
            PipelineStage::Qualification => write!(f, "Qualification"),
            PipelineStage::Proposal => write!(f, "Proposal"),
            PipelineStage::Negotiation => write!(f, "Negotiation"),
            PipelineStage::ClosedWon => write!(f, "Closed Won"),
            PipelineStage::ClosedLost => write!(f, "Closed Lost"),
        }
    }
}

impl PipelineStage {
    /// All stages in funnel order.
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::Prospecting,
        PipelineStage::Qualification,
        PipelineStage::Proposal,
        PipelineStage::Negotiation,
        PipelineStage::ClosedWon,
        PipelineStage::ClosedLost,
    ];

    /// Returns true while the deal is still in play.
    pub fn is_open(&self) -> bool {
        !matches!(self, PipelineStage::ClosedWon | PipelineStage::ClosedLost)
    }
}

/// Ticket priority, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait
    Low,
    /// Default service level
    Normal,
    /// Needs attention soon
    High,
    /// Drop everything
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Normal => write!(f, "Normal"),
            Priority::High => write!(f, "High"),
            Priority::Urgent => write!(f, "Urgent"),
        }
    }
}

impl Priority {
    /// All priorities from least to most urgent.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Urgent,
    ];
}

/// Kind of entity a record can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Contact,
    Company,
    Deal,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Contact => write!(f, "Contact"),
            EntityType::Company => write!(f, "Company"),
            EntityType::Deal => write!(f, "Deal"),
        }
    }
}

/// Link from a record to the CRM entity it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEntity {
    /// Kind of the linked entity.
    pub entity_type: EntityType,
    /// Identifier of the linked entity.
    pub id: String,
}

/// A single CRM record: one activity, deal, lead, or ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier of the record.
    pub id: String,
    /// Kind of record.
    pub kind: RecordKind,
    /// Login of the user who owns the record.
    pub owner: String,
    /// Entity this record is attached to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<RelatedEntity>,
    /// Magnitude of the record: deal amount, activity minutes, or lead score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Current lifecycle status.
    pub status: RecordStatus,
    /// Service priority, carried by tickets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Pipeline stage, carried by deals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record reached a terminal state, if it has.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Creates a record with the required fields; optional fields start empty.
    pub fn new(
        id: impl Into<String>,
        kind: RecordKind,
        owner: impl Into<String>,
        status: RecordStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            owner: owner.into(),
            related: None,
            value: None,
            status,
            priority: None,
            stage: None,
            created_at,
            closed_at: None,
        }
    }

    /// Returns true once the record has reached a terminal status.
    pub fn is_closed_state(&self) -> bool {
        self.status.is_terminal()
    }

    /// Hours between creation and close.
    ///
    /// Returns `None` while the record is open or when `closed_at`
    /// precedes `created_at` (clock skew in the source system).
    pub fn resolution_hours(&self) -> Option<f64> {
        let closed = self.closed_at?;
        let seconds = closed.signed_duration_since(self.created_at).num_seconds();
        if seconds < 0 {
            return None;
        }
        Some(seconds as f64 / 3600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::Normal < Priority::High);
        assert!(Priority::High < Priority::Urgent);
    }

    #[test]
    fn test_stage_ordering() {
        assert!(PipelineStage::Prospecting < PipelineStage::Qualification);
        assert!(PipelineStage::Negotiation < PipelineStage::ClosedWon);
        assert!(PipelineStage::ClosedWon.is_open() == false);
        assert!(PipelineStage::Proposal.is_open());
    }

    #[test]
    fn test_activity_kinds() {
        assert!(RecordKind::Call.is_activity());
        assert!(RecordKind::Task.is_activity());
        assert!(!RecordKind::Deal.is_activity());
        assert!(!RecordKind::Ticket.is_activity());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!RecordStatus::Open.is_terminal());
        assert!(!RecordStatus::InProgress.is_terminal());
        assert!(RecordStatus::Completed.is_terminal());
        assert!(RecordStatus::Won.is_terminal());
        assert!(RecordStatus::Resolved.is_terminal());

        let created = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let open = Record::new("t-1", RecordKind::Ticket, "dana", RecordStatus::Open, created);
        assert!(!open.is_closed_state());
        let resolved = Record {
            status: RecordStatus::Resolved,
            ..open
        };
        assert!(resolved.is_closed_state());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RecordStatus::InProgress.to_string(), "In Progress");
        assert_eq!(PipelineStage::ClosedWon.to_string(), "Closed Won");
        assert_eq!(RecordKind::Meeting.to_string(), "Meeting");
    }

    #[test]
    fn test_resolution_hours() {
        let created = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let record = Record {
            closed_at: Some(Utc.with_ymd_and_hms(2024, 3, 4, 15, 30, 0).unwrap()),
            ..Record::new("t-1", RecordKind::Ticket, "dana", RecordStatus::Resolved, created)
        };
        assert_eq!(record.resolution_hours(), Some(6.5));

        let open = Record::new("t-2", RecordKind::Ticket, "dana", RecordStatus::Open, created);
        assert_eq!(open.resolution_hours(), None);

        let skewed = Record {
            closed_at: Some(Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()),
            ..record.clone()
        };
        assert_eq!(skewed.resolution_hours(), None);
    }
}
