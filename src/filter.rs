//! Record filtering.
//!
//! A [`Filter`] is a conjunction of optional predicates. Every field left
//! unset matches all records, so the default filter passes everything
//! through. Filtering never mutates records and applying the same filter
//! twice yields the same survivors.

use crate::errors::{ReportError, ReportResult};
use crate::models::{EntityType, Record, RecordKind, RecordStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Criteria for selecting the records a report is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Keep records created at or after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// Keep records created at or before this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Keep records owned by this user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Keep records of this kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    /// Keep records in this status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
    /// Keep records attached to this kind of entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_type: Option<EntityType>,
    /// Keep records whose value is at least this much.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Keep records whose value is at most this much.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl Filter {
    /// Creates a filter that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the filter to records created within `[start, end]`.
    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Restricts the filter to a single owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Restricts the filter to a single record kind.
    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts the filter to a single status.
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the filter to records attached to one kind of entity.
    pub fn with_related_type(mut self, entity_type: EntityType) -> Self {
        self.related_type = Some(entity_type);
        self
    }

    /// Restricts the filter to records whose value lies in `[min, max]`.
    pub fn with_value_range(mut self, min: f64, max: f64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    /// Returns true when no predicate is set.
    pub fn is_unconstrained(&self) -> bool {
        *self == Filter::default()
    }

    /// Rejects ranges that can never match anything.
    pub fn validate(&self) -> ReportResult<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ReportError::InvalidFilter {
                    reason: format!("start {} is after end {}", start, end),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(ReportError::InvalidFilter {
                    reason: format!("min_value {} exceeds max_value {}", min, max),
                });
            }
        }
        Ok(())
    }

    /// Returns true when the record satisfies every predicate that is set.
    ///
    /// Both ends of the date range are inclusive. Value bounds only match
    /// records that carry a value.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(start) = self.start {
            if record.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if record.created_at > end {
                return false;
            }
        }
        if let Some(owner) = &self.owner {
            if record.owner != *owner {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(entity_type) = self.related_type {
            match &record.related {
                Some(related) if related.entity_type == entity_type => {}
                _ => return false,
            }
        }
        if self.min_value.is_some() || self.max_value.is_some() {
            let value = match record.value {
                Some(v) => v,
                None => return false,
            };
            if let Some(min) = self.min_value {
                if value < min {
                    return false;
                }
            }
            if let Some(max) = self.max_value {
                if value > max {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelatedEntity;
    use chrono::TimeZone;

    fn test_record(id: &str) -> Record {
        Record::new(
            id,
            RecordKind::Call,
            "alice",
            RecordStatus::Completed,
            Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&test_record("a-1")));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap();
        let filter = Filter::new().with_date_range(start, end);

        // Created exactly at the start boundary.
        assert!(filter.matches(&test_record("a-1")));

        let late = Record {
            created_at: Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 1).unwrap(),
            ..test_record("a-2")
        };
        assert!(!filter.matches(&late));
    }

    #[test]
    fn test_owner_and_kind_predicates() {
        let filter = Filter::new().with_owner("alice").with_kind(RecordKind::Call);
        assert!(filter.matches(&test_record("a-1")));

        let other_owner = Record {
            owner: "bob".to_string(),
            ..test_record("a-2")
        };
        assert!(!filter.matches(&other_owner));

        let other_kind = Record {
            kind: RecordKind::Email,
            ..test_record("a-3")
        };
        assert!(!filter.matches(&other_kind));
    }

    #[test]
    fn test_status_predicate() {
        let filter = Filter::new().with_status(RecordStatus::Completed);
        assert!(filter.matches(&test_record("a-1")));

        let open = Record {
            status: RecordStatus::Open,
            ..test_record("a-2")
        };
        assert!(!filter.matches(&open));
    }

    #[test]
    fn test_related_type_requires_a_link() {
        let filter = Filter::new().with_related_type(EntityType::Company);

        // No related entity at all fails the predicate.
        assert!(!filter.matches(&test_record("a-1")));

        let linked = Record {
            related: Some(RelatedEntity {
                entity_type: EntityType::Company,
                id: "co-9".to_string(),
            }),
            ..test_record("a-2")
        };
        assert!(filter.matches(&linked));

        let wrong_type = Record {
            related: Some(RelatedEntity {
                entity_type: EntityType::Contact,
                id: "ct-1".to_string(),
            }),
            ..test_record("a-3")
        };
        assert!(!filter.matches(&wrong_type));
    }

    #[test]
    fn test_value_bounds_require_a_value() {
        let filter = Filter::new().with_value_range(100.0, 500.0);

        // Records without a value never satisfy value bounds.
        assert!(!filter.matches(&test_record("a-1")));

        let in_range = Record {
            value: Some(250.0),
            ..test_record("a-2")
        };
        assert!(filter.matches(&in_range));

        let below = Record {
            value: Some(99.9),
            ..test_record("a-3")
        };
        assert!(!filter.matches(&below));
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let filter = Filter::new().with_date_range(start, end);
        assert!(matches!(
            filter.validate(),
            Err(ReportError::InvalidFilter { .. })
        ));

        let inverted_values = Filter {
            min_value: Some(500.0),
            max_value: Some(100.0),
            ..Filter::default()
        };
        assert!(inverted_values.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_equal_bounds() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let filter = Filter::new()
            .with_date_range(instant, instant)
            .with_value_range(50.0, 50.0);
        assert!(filter.validate().is_ok());
        assert!(filter.matches(&Record {
            value: Some(50.0),
            ..test_record("a-1")
        }));
    }
}
