// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run-scoped duplicate detection against a tenant's open alerts.
//!
//! Seeded once per tenant run from the `active` alerts, then extended with
//! every alert the run inserts, so candidates colliding within one run are
//! caught as well.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use vigil_core::types::{Alert, AlertSubject, CategoryType, parse_timestamp};

use crate::candidate::AlertCandidateItem;

#[derive(Debug, Clone)]
struct OpenEntry {
    expiry_date: Option<NaiveDate>,
    /// `None` when the stored timestamp could not be parsed.
    created_at: Option<DateTime<Utc>>,
}

/// Open alerts indexed by coarse type and subject.
#[derive(Debug, Clone)]
pub struct DedupSet {
    entries: HashMap<(CategoryType, AlertSubject), Vec<OpenEntry>>,
    renotify_window: TimeDelta,
}

impl DedupSet {
    pub fn new(renotify_window: TimeDelta) -> Self {
        Self {
            entries: HashMap::new(),
            renotify_window,
        }
    }

    /// Seed from the tenant's open alerts. Rows naming neither a subject nor
    /// an item cannot match any candidate and are left out.
    pub fn from_open_alerts(alerts: &[Alert], renotify_window: TimeDelta) -> Self {
        let mut set = Self::new(renotify_window);
        for alert in alerts {
            let subject = match (&alert.subject_name, &alert.item_name) {
                (Some(name), _) => AlertSubject::Employee(name.clone()),
                (None, Some(name)) => AlertSubject::Equipment(name.clone()),
                (None, None) => continue,
            };
            set.insert(
                alert.category_type,
                subject,
                OpenEntry {
                    expiry_date: alert.expiry_date,
                    created_at: parse_timestamp(&alert.created_at),
                },
            );
        }
        set
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `candidate` restates a condition that already has an open alert.
    ///
    /// Dated candidates match an open alert with the same expiry date.
    /// Undated candidates match an undated open alert created within the
    /// renotify window before `now`; dated alerts describe a different
    /// condition and never suppress them.
    pub fn is_duplicate(&self, candidate: &AlertCandidateItem, now: DateTime<Utc>) -> bool {
        let key = (candidate.category_type(), candidate.subject.clone());
        let Some(open) = self.entries.get(&key) else {
            return false;
        };

        match candidate.expiry_date {
            Some(expiry) => open.iter().any(|e| e.expiry_date == Some(expiry)),
            None => open
                .iter()
                .filter(|e| e.expiry_date.is_none())
                .any(|e| match e.created_at {
                    Some(created_at) => {
                        now.signed_duration_since(created_at) < self.renotify_window
                    }
                    None => true,
                }),
        }
    }

    /// Record an alert inserted during this run.
    pub fn record(&mut self, candidate: &AlertCandidateItem, created_at: DateTime<Utc>) {
        self.insert(
            candidate.category_type(),
            candidate.subject.clone(),
            OpenEntry {
                expiry_date: candidate.expiry_date,
                created_at: Some(created_at),
            },
        );
    }

    fn insert(&mut self, category_type: CategoryType, subject: AlertSubject, entry: OpenEntry) {
        self.entries
            .entry((category_type, subject))
            .or_default()
            .push(entry);
    }
}
