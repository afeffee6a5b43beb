//! Provides logic for narrowing an inventory by name and by timestamps.

use super::{CoreError, FilteredSet, RecordHandle, Result};
use chrono::{DateTime, Local, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the name dimension matches a record's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NameMatch {
    /// The name contains `name_query` verbatim (case-sensitive).
    #[default]
    Contains,
    /// The name contains one of the `yyyyMMdd` tokens for the days from
    /// `start` to `end` inclusive.
    DayToken,
}

/// How the creation and modification dimensions compare a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeMatch {
    /// Local date within `start..=end`.
    #[default]
    DateRange,
    /// Local date equal to `on`.
    SameDay,
    /// Instant strictly later than `after`.
    After,
}

/// A full snapshot of the user's filter input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub name_query: Option<String>,
    pub name_match: NameMatch,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub on: Option<NaiveDate>,
    pub after: Option<DateTime<Local>>,
    pub time_match: TimeMatch,
    pub by_name: bool,
    pub by_created: bool,
    pub by_modified: bool,
}

impl FilterCriteria {
    /// Rejects an end date earlier than the start date.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                return Err(CoreError::InvalidRange { start, end });
            }
        }
        Ok(())
    }

    pub fn any_enabled(&self) -> bool {
        self.by_name || self.by_created || self.by_modified
    }

    /// Resolves the enabled dimensions into predicates. `None` means the
    /// criteria are unusable and filtering falls back to the whole inventory.
    fn compile(&self) -> Option<CompiledFilter> {
        if !self.any_enabled() {
            return None;
        }

        let name = if self.by_name {
            Some(self.name_predicate()?)
        } else {
            None
        };
        let time = if self.by_created || self.by_modified {
            Some(self.time_predicate()?)
        } else {
            None
        };

        Some(CompiledFilter {
            name,
            created: time.clone().filter(|_| self.by_created),
            modified: time.filter(|_| self.by_modified),
        })
    }

    fn name_predicate(&self) -> Option<NamePredicate> {
        match self.name_match {
            NameMatch::Contains => self
                .name_query
                .as_deref()
                .filter(|q| !q.is_empty())
                .map(|q| NamePredicate::Contains(q.to_string())),
            NameMatch::DayToken => Some(NamePredicate::DayRange(self.start?, self.end?)),
        }
    }

    fn time_predicate(&self) -> Option<TimePredicate> {
        match self.time_match {
            TimeMatch::DateRange => Some(TimePredicate::Range(self.start?, self.end?)),
            TimeMatch::SameDay => self.on.map(TimePredicate::SameDay),
            TimeMatch::After => self.after.map(TimePredicate::After),
        }
    }
}

/// Every valid calendar date spelled as eight consecutive `yyyyMMdd` digits
/// somewhere in `name`, overlapping runs included.
///
/// A name contains the `yyyyMMdd` token of a day in `start..=end` exactly when
/// one of these dates lies in that range, so the day-token mode never has to
/// enumerate the days of a range.
fn embedded_dates(name: &str) -> impl Iterator<Item = NaiveDate> + '_ {
    let bytes = name.as_bytes();
    (0..bytes.len().saturating_sub(7)).filter_map(move |i| {
        let window = &bytes[i..i + 8];
        if !window.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let digits = std::str::from_utf8(window).ok()?;
        NaiveDate::from_ymd_opt(
            digits[..4].parse().ok()?,
            digits[4..6].parse().ok()?,
            digits[6..].parse().ok()?,
        )
    })
}

#[derive(Debug, Clone)]
enum NamePredicate {
    Contains(String),
    DayRange(NaiveDate, NaiveDate),
}

impl NamePredicate {
    fn matches(&self, name: &str) -> bool {
        match self {
            NamePredicate::Contains(query) => name.contains(query.as_str()),
            NamePredicate::DayRange(start, end) => {
                embedded_dates(name).any(|day| *start <= day && day <= *end)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum TimePredicate {
    Range(NaiveDate, NaiveDate),
    SameDay(NaiveDate),
    After(DateTime<Local>),
}

impl TimePredicate {
    /// A missing timestamp never matches.
    fn matches(&self, timestamp: Option<DateTime<Local>>) -> bool {
        let Some(ts) = timestamp else {
            return false;
        };
        match self {
            TimePredicate::Range(start, end) => {
                let day = ts.date_naive();
                *start <= day && day <= *end
            }
            TimePredicate::SameDay(on) => ts.date_naive() == *on,
            TimePredicate::After(threshold) => ts > *threshold,
        }
    }
}

#[derive(Debug)]
struct CompiledFilter {
    name: Option<NamePredicate>,
    created: Option<TimePredicate>,
    modified: Option<TimePredicate>,
}

impl CompiledFilter {
    fn matches(&self, record: &RecordHandle) -> bool {
        self.name.as_ref().map_or(true, |p| p.matches(record.name()))
            && self.created.as_ref().map_or(true, |p| p.matches(record.created()))
            && self.modified.as_ref().map_or(true, |p| p.matches(record.modified()))
    }
}

/// A stateless utility for filtering inventories.
pub struct FilterEngine;

impl FilterEngine {
    /// Produces the filtered view of `inventory` for `criteria`.
    ///
    /// The result keeps the inventory's order and shares record identity with
    /// it. With no enabled dimension, or when an enabled dimension lacks the
    /// input it needs, the whole inventory is returned.
    pub fn apply(inventory: &[RecordHandle], criteria: &FilterCriteria) -> Result<FilteredSet> {
        criteria.validate()?;

        let records = match criteria.compile() {
            None => {
                tracing::debug!("No usable filter criteria, keeping all {} files", inventory.len());
                inventory.to_vec()
            }
            Some(filter) => inventory
                .par_iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect(),
        };

        tracing::info!("Filter kept {} of {} files", records.len(), inventory.len());
        Ok(FilteredSet::from_records(records))
    }
}
