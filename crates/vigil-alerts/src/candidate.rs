// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized alert candidates produced by the sources.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use vigil_core::types::{AlertSubject, CategorySlug, CategoryType};

use crate::registry;

/// One condition a source found for a tenant. Lives for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertCandidateItem {
    /// Id of the record the condition is about (exam, training, equipment or employee).
    pub source_id: String,
    pub category: CategorySlug,
    pub title: String,
    pub description: Option<String>,
    /// Absent for presence/absence conditions.
    pub expiry_date: Option<NaiveDate>,
    pub subject: AlertSubject,
    /// Whole days from today to `expiry_date`; negative when overdue.
    pub days_remaining: Option<i64>,
}

impl AlertCandidateItem {
    pub fn category_type(&self) -> CategoryType {
        registry::entry(self.category).category_type
    }

    pub fn related_entity_type(&self) -> &'static str {
        registry::entry(self.category).related_entity_type
    }
}

/// Inputs shared by every source call of one tenant run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceParams {
    pub today: NaiveDate,
    pub thresholds: BTreeSet<i64>,
}

impl SourceParams {
    pub fn new(today: NaiveDate, thresholds: BTreeSet<i64>) -> Self {
        Self { today, thresholds }
    }

    /// Latest expiry date any threshold can still match.
    pub fn horizon(&self) -> NaiveDate {
        let max = self
            .thresholds
            .iter()
            .next_back()
            .copied()
            .unwrap_or(0)
            .max(0);
        let days = u64::try_from(max).unwrap_or(0);
        self.today
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Calendar days from today until `date`.
    pub fn days_until(&self, date: NaiveDate) -> i64 {
        (date - self.today).num_days()
    }

    /// Exact threshold hit, or overdue.
    pub fn qualifies(&self, days_remaining: i64) -> bool {
        days_remaining <= 0 || self.thresholds.contains(&days_remaining)
    }
}
