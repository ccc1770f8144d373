//! Relative date window predicate.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventAdapter;
use crate::vocab::{vocabulary_impls, Keyword, Vocabulary};

use super::{Condition, MatchContext};

/// Which event timestamp a date filter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateAttribute {
    /// Item creation time.
    CreatedAt,
    /// Last update time.
    UpdatedAt,
}

impl Vocabulary for DateAttribute {
    const ALL: &'static [Self] = &[Self::CreatedAt, Self::UpdatedAt];
    const FIELD: &'static str = "date:attribute";

    fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

vocabulary_impls!(DateAttribute);

/// Direction of the window relative to `now - interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateCondition {
    /// The timestamp is before the threshold.
    OlderThan,
    /// The timestamp is after the threshold.
    NewerThan,
}

impl Vocabulary for DateCondition {
    const ALL: &'static [Self] = &[Self::OlderThan, Self::NewerThan];
    const FIELD: &'static str = "date:condition";

    fn as_str(self) -> &'static str {
        match self {
            Self::OlderThan => "older_than",
            Self::NewerThan => "newer_than",
        }
    }
}

vocabulary_impls!(DateCondition);

/// Unit of a relative date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateIntervalType {
    /// Calendar days.
    Days,
    /// Seven-day weeks.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl Vocabulary for DateIntervalType {
    const ALL: &'static [Self] = &[Self::Days, Self::Weeks, Self::Months, Self::Years];
    const FIELD: &'static str = "date:intervalType";

    fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

vocabulary_impls!(DateIntervalType);

impl DateIntervalType {
    /// `now` moved back by `n` units, or `None` if out of range.
    #[must_use]
    pub fn before(self, now: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
        match self {
            Self::Days => now.checked_sub_signed(TimeDelta::try_days(n)?),
            Self::Weeks => now.checked_sub_signed(TimeDelta::try_weeks(n)?),
            Self::Months => now.checked_sub_months(Months::new(u32::try_from(n).ok()?)),
            Self::Years => {
                let months = u32::try_from(n).ok()?.checked_mul(12)?;
                now.checked_sub_months(Months::new(months))
            }
        }
    }
}

/// `attribute` must be `condition` `interval` `interval_type` relative to
/// the match context's clock, e.g. `created_at older_than 3 days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DateFilter {
    /// Which timestamp to compare.
    pub attribute: Keyword<DateAttribute>,
    /// Direction of the comparison.
    pub condition: Keyword<DateCondition>,
    /// Unit of `interval`.
    pub interval_type: Keyword<DateIntervalType>,
    /// Number of units; must be at least 1.
    pub interval: i64,
}

impl DateFilter {
    /// A filter from known keywords.
    #[must_use]
    pub fn new(
        attribute: DateAttribute,
        condition: DateCondition,
        interval_type: DateIntervalType,
        interval: i64,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            condition: condition.into(),
            interval_type: interval_type.into(),
            interval,
        }
    }
}

impl Condition for DateFilter {
    fn condition_met(&self, event: &dyn EventAdapter, ctx: &MatchContext) -> bool {
        let (Some(attribute), Some(relation), Some(unit)) = (
            self.attribute.known(),
            self.condition.known(),
            self.interval_type.known(),
        ) else {
            return false;
        };
        if self.interval < 1 {
            return false;
        }
        let stamp = match attribute {
            DateAttribute::CreatedAt => event.created_at(),
            DateAttribute::UpdatedAt => event.updated_at(),
        };
        let (Some(stamp), Some(threshold)) = (stamp, unit.before(ctx.now, self.interval)) else {
            return false;
        };
        match relation {
            DateCondition::OlderThan => stamp < threshold,
            DateCondition::NewerThan => stamp >= threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MergeRequestEvent, WikiPageEvent};
    use chrono::TimeZone;

    fn ctx() -> MatchContext {
        MatchContext::at(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
    }

    fn created(at: DateTime<Utc>) -> MergeRequestEvent {
        let mut ev = MergeRequestEvent::new(1, 1);
        ev.object_attributes.created_at = Some(at);
        ev
    }

    #[test]
    fn older_than_days() {
        let filter = DateFilter::new(
            DateAttribute::CreatedAt,
            DateCondition::OlderThan,
            DateIntervalType::Days,
            3,
        );
        let old = created(Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap());
        let fresh = created(Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap());
        assert!(filter.condition_met(&old, &ctx()));
        assert!(!filter.condition_met(&fresh, &ctx()));
    }

    #[test]
    fn newer_than_includes_the_boundary() {
        let filter = DateFilter::new(
            DateAttribute::CreatedAt,
            DateCondition::NewerThan,
            DateIntervalType::Weeks,
            1,
        );
        let boundary = created(Utc.with_ymd_and_hms(2024, 6, 8, 12, 0, 0).unwrap());
        assert!(filter.condition_met(&boundary, &ctx()));
    }

    #[test]
    fn months_are_calendar_months() {
        let now = ctx().now;
        assert_eq!(
            DateIntervalType::Months.before(now, 2),
            Some(Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap())
        );
        assert_eq!(
            DateIntervalType::Years.before(now, 1),
            Some(Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn missing_timestamp_fails() {
        let filter = DateFilter::new(
            DateAttribute::UpdatedAt,
            DateCondition::OlderThan,
            DateIntervalType::Days,
            1,
        );
        assert!(!filter.condition_met(&MergeRequestEvent::new(1, 1), &ctx()));
        assert!(!filter.condition_met(&WikiPageEvent::new(1, "x"), &ctx()));
    }

    #[test]
    fn unknown_keywords_never_match() {
        let mut filter = DateFilter::new(
            DateAttribute::CreatedAt,
            DateCondition::OlderThan,
            DateIntervalType::Days,
            1,
        );
        filter.attribute = Keyword::Unknown("closed_at".to_string());
        let old = created(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert!(!filter.condition_met(&old, &ctx()));
    }

    #[test]
    fn decodes_policy_spelling() {
        let filter: DateFilter = serde_yaml::from_str(
            "{attribute: updated_at, condition: newer_than, intervalType: months, interval: 2}",
        )
        .unwrap();
        assert_eq!(
            filter,
            DateFilter::new(
                DateAttribute::UpdatedAt,
                DateCondition::NewerThan,
                DateIntervalType::Months,
                2
            )
        );
    }
}
