//! Alert lifecycle store.
//!
//! Freshly classified alerts are merged into the log by their stable id, so
//! an operator's resolution outlives the next poll. A resolved alert only
//! reopens after its condition has cleared and then fired again.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AlertLogError;
use crate::models::{Alert, AlertKind, AlertStatus};

#[derive(Debug, Clone, Serialize)]
pub struct AlertEntry {
    pub record_id: Uuid,
    pub alert: Alert,
    pub first_seen: NaiveDateTime,
    pub last_seen: NaiveDateTime,
    pub occurrences: u32,
    /// Condition was absent from the most recent batch.
    pub cleared: bool,
}

impl AlertEntry {
    fn is_live(&self) -> bool {
        self.alert.status == AlertStatus::Active && !self.cleared
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertFilter {
    All,
    Danger,
    Warning,
    Resolved,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub active: usize,
    pub danger: usize,
    pub warning: usize,
    pub resolved: usize,
    /// Still unresolved, but the condition no longer holds.
    pub cleared: usize,
}

#[derive(Debug, Default)]
pub struct AlertLog {
    entries: HashMap<String, AlertEntry>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AlertEntry> {
        self.entries.get(id)
    }

    /// Merges one classifier batch. Returns how many alerts were opened or
    /// reopened.
    pub fn ingest(&mut self, alerts: &[Alert], at: NaiveDateTime) -> usize {
        let mut opened = 0;
        let present: HashSet<&str> = alerts.iter().map(|a| a.id.as_str()).collect();

        for entry in self.entries.values_mut() {
            if entry.alert.kind != AlertKind::Info && !present.contains(entry.alert.id.as_str()) {
                entry.cleared = true;
            }
        }

        for alert in alerts {
            match self.entries.get_mut(&alert.id) {
                Some(entry) => {
                    if entry.cleared && entry.alert.status == AlertStatus::Resolved {
                        entry.alert.status = AlertStatus::Active;
                        entry.first_seen = at;
                        entry.occurrences = 0;
                        opened += 1;
                    }
                    entry.alert.message = alert.message.clone();
                    entry.alert.timestamp = alert.timestamp;
                    entry.last_seen = at;
                    entry.occurrences += 1;
                    entry.cleared = false;
                }
                None => {
                    self.entries.insert(alert.id.clone(), new_entry(alert.clone(), at));
                    opened += 1;
                }
            }
        }

        opened
    }

    /// Records a notice that is not produced by the classifier, such as a
    /// scheduled closure. Posting an existing id replaces it.
    pub fn post(&mut self, alert: Alert) {
        let at = alert.timestamp;
        self.entries.insert(alert.id.clone(), new_entry(alert, at));
    }

    pub fn resolve(&mut self, id: &str) -> Result<(), AlertLogError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| AlertLogError::UnknownAlert(id.to_string()))?;
        entry.alert.status = AlertStatus::Resolved;
        Ok(())
    }

    /// Entries matching `filter`, newest first. The danger and warning
    /// filters only show active alerts whose condition still holds.
    pub fn filtered(&self, filter: AlertFilter) -> Vec<&AlertEntry> {
        let mut matches: Vec<&AlertEntry> = self
            .entries
            .values()
            .filter(|entry| {
                let alert = &entry.alert;
                match filter {
                    AlertFilter::All => true,
                    AlertFilter::Danger => entry.is_live() && alert.kind == AlertKind::Danger,
                    AlertFilter::Warning => entry.is_live() && alert.kind == AlertKind::Warning,
                    AlertFilter::Resolved => alert.status == AlertStatus::Resolved,
                }
            })
            .collect();
        matches.sort_by(|a, b| {
            b.alert
                .timestamp
                .cmp(&a.alert.timestamp)
                .then_with(|| a.alert.id.cmp(&b.alert.id))
        });
        matches
    }

    pub fn counts(&self) -> AlertCounts {
        let mut counts = AlertCounts::default();
        for entry in self.entries.values() {
            match entry.alert.status {
                AlertStatus::Resolved => counts.resolved += 1,
                AlertStatus::Active if entry.cleared => counts.cleared += 1,
                AlertStatus::Active => {
                    counts.active += 1;
                    match entry.alert.kind {
                        AlertKind::Danger => counts.danger += 1,
                        AlertKind::Warning => counts.warning += 1,
                        AlertKind::Info => {}
                    }
                }
            }
        }
        counts
    }
}

fn new_entry(alert: Alert, at: NaiveDateTime) -> AlertEntry {
    AlertEntry {
        record_id: Uuid::new_v4(),
        alert,
        first_seen: at,
        last_seen: at,
        occurrences: 1,
        cleared: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::generate_alerts;
    use crate::models::{Difficulty, Trail};
    use chrono::{Duration, NaiveDate};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap()
    }

    fn trail(id: &str, current_count: u32) -> Trail {
        Trail {
            id: id.to_string(),
            name: id.to_string(),
            short_name: id.to_string(),
            capacity: 100,
            current_count,
            distance_km: 1.0,
            difficulty: Difficulty::Medium,
            description: String::new(),
            path: Vec::new(),
        }
    }

    fn poll(log: &mut AlertLog, counts: &[(&str, u32)], at: NaiveDateTime) -> usize {
        let snapshot: Vec<Trail> = counts.iter().map(|&(id, c)| trail(id, c)).collect();
        log.ingest(&generate_alerts(&snapshot, at), at)
    }

    #[test]
    fn repeated_polls_merge_by_id() {
        let mut log = AlertLog::new();
        assert_eq!(poll(&mut log, &[("a", 110), ("b", 85)], t0()), 2);
        assert_eq!(poll(&mut log, &[("a", 105), ("b", 90)], t0() + Duration::seconds(30)), 0);

        assert_eq!(log.len(), 2);
        let entry = log.get("alert-a-overcapacity").unwrap();
        assert_eq!(entry.occurrences, 2);
        assert_eq!(entry.first_seen, t0());
        assert_eq!(entry.last_seen, t0() + Duration::seconds(30));
    }

    #[test]
    fn resolution_survives_next_poll() {
        let mut log = AlertLog::new();
        poll(&mut log, &[("a", 110)], t0());
        log.resolve("alert-a-overcapacity").unwrap();
        poll(&mut log, &[("a", 115)], t0() + Duration::seconds(30));

        let entry = log.get("alert-a-overcapacity").unwrap();
        assert_eq!(entry.alert.status, AlertStatus::Resolved);
        assert_eq!(log.counts().resolved, 1);
        assert_eq!(log.counts().active, 0);
    }

    #[test]
    fn cleared_then_recurring_alert_reopens() {
        let mut log = AlertLog::new();
        poll(&mut log, &[("a", 110)], t0());
        log.resolve("alert-a-overcapacity").unwrap();
        poll(&mut log, &[("a", 40)], t0() + Duration::minutes(1));
        assert!(log.get("alert-a-overcapacity").unwrap().cleared);

        let reopened = poll(&mut log, &[("a", 120)], t0() + Duration::minutes(2));
        assert_eq!(reopened, 1);
        let entry = log.get("alert-a-overcapacity").unwrap();
        assert_eq!(entry.alert.status, AlertStatus::Active);
        assert_eq!(entry.occurrences, 1);
        assert!(!entry.cleared);
    }

    #[test]
    fn resolving_unknown_id_fails() {
        let mut log = AlertLog::new();
        assert_eq!(
            log.resolve("alert-missing-warning"),
            Err(AlertLogError::UnknownAlert("alert-missing-warning".to_string()))
        );
    }

    #[test]
    fn filters_and_counts() {
        let mut log = AlertLog::new();
        poll(&mut log, &[("a", 110), ("b", 85), ("c", 90)], t0());
        log.post(Alert {
            id: "notice-jungbong-maintenance".to_string(),
            trail_id: "jungbong".to_string(),
            trail_name: "Jungbong Course".to_string(),
            kind: AlertKind::Info,
            message: "Scheduled maintenance closure".to_string(),
            timestamp: t0() - Duration::hours(3),
            status: AlertStatus::Active,
        });
        log.resolve("alert-c-warning").unwrap();

        assert_eq!(
            log.counts(),
            AlertCounts {
                active: 3,
                danger: 1,
                warning: 1,
                resolved: 1,
                cleared: 0,
            }
        );
        assert_eq!(log.filtered(AlertFilter::All).len(), 4);
        assert_eq!(log.filtered(AlertFilter::Danger)[0].alert.trail_id, "a");
        assert_eq!(log.filtered(AlertFilter::Warning)[0].alert.trail_id, "b");
        assert_eq!(log.filtered(AlertFilter::Resolved)[0].alert.trail_id, "c");
        // Notice is oldest, so it sorts last.
        assert_eq!(
            log.filtered(AlertFilter::All).last().unwrap().alert.kind,
            AlertKind::Info
        );
    }

    #[test]
    fn cleared_conditions_leave_active_counts() {
        let mut log = AlertLog::new();
        poll(&mut log, &[("a", 110), ("b", 85)], t0());
        poll(&mut log, &[("a", 10), ("b", 88)], t0() + Duration::minutes(1));

        assert_eq!(
            log.counts(),
            AlertCounts {
                active: 1,
                danger: 0,
                warning: 1,
                resolved: 0,
                cleared: 1,
            }
        );
        assert!(log.filtered(AlertFilter::Danger).is_empty());
        assert_eq!(log.filtered(AlertFilter::Warning).len(), 1);
        assert_eq!(log.filtered(AlertFilter::All).len(), 2);
    }

    #[test]
    fn notices_are_not_cleared_by_polls() {
        let mut log = AlertLog::new();
        log.post(Alert {
            id: "notice-1".to_string(),
            trail_id: "wonhyo".to_string(),
            trail_name: "Wonhyosa Course".to_string(),
            kind: AlertKind::Info,
            message: "Trail work".to_string(),
            timestamp: t0(),
            status: AlertStatus::Active,
        });
        poll(&mut log, &[("wonhyo", 10)], t0() + Duration::minutes(5));
        assert!(!log.get("notice-1").unwrap().cleared);
    }
}
