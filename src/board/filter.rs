//! Filter bar for the board: services, interest, days open, max closing date.

use chrono::{DateTime, NaiveDate, Utc};

use super::models::{Opportunity, Temperature};

/// "All" or an explicit set of values.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection<T> {
    #[default]
    All,
    Only(Vec<T>),
}

impl<T: PartialEq> Selection<T> {
    /// An empty list means no restriction.
    pub fn from_values(values: Vec<T>) -> Self {
        if values.is_empty() {
            Self::All
        } else {
            Self::Only(values)
        }
    }

    pub fn allows(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(values) => values.contains(value),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub services: Selection<String>,
    pub temperatures: Selection<Temperature>,
    /// Keep records opened at most this many days ago.
    pub max_days_open: Option<u32>,
    /// Keep records whose close target is on or before this date.
    pub max_closing_date: Option<NaiveDate>,
}

impl OpportunityFilter {
    pub fn is_empty(&self) -> bool {
        matches!(self.services, Selection::All)
            && matches!(self.temperatures, Selection::All)
            && self.max_days_open.is_none()
            && self.max_closing_date.is_none()
    }

    pub fn matches(&self, opp: &Opportunity, now: DateTime<Utc>) -> bool {
        let service_ok = match &self.services {
            Selection::All => true,
            Selection::Only(values) => opp
                .service
                .as_ref()
                .is_some_and(|s| values.iter().any(|v| v.eq_ignore_ascii_case(s))),
        };
        if !service_ok || !self.temperatures.allows(&opp.temperature_or_unknown()) {
            return false;
        }
        if let Some(max_days) = self.max_days_open {
            if (now - opp.create_date).num_days() > i64::from(max_days) {
                return false;
            }
        }
        if let (Some(limit), Some(target)) = (self.max_closing_date, opp.estimate_close_target) {
            if target.date_naive() > limit {
                return false;
            }
        }
        true
    }

    /// Keep matching records in their original order.
    pub fn apply(&self, opportunities: &[Opportunity], now: DateTime<Utc>) -> Vec<Opportunity> {
        opportunities
            .iter()
            .filter(|opp| self.matches(opp, now))
            .cloned()
            .collect()
    }
}
