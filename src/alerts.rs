//! Crowd level classification and threshold alerts.
//!
//! Classification is stateless: each call looks only at the trails it is
//! given. Lifecycle tracking across polls lives in [`crate::alert_log`].

use chrono::NaiveDateTime;
use tracing::warn;

use crate::config::Thresholds;
use crate::models::{occupancy_ratio, Alert, AlertKind, AlertStatus, CrowdLevel, Trail};

/// Crowd level for a count against a capacity, using the default thresholds.
pub fn classify(current_count: u32, capacity: u32) -> CrowdLevel {
    Thresholds::default().level(current_count, capacity)
}

/// Alerts for every trail over the default thresholds.
pub fn generate_alerts(snapshot: &[Trail], at: NaiveDateTime) -> Vec<Alert> {
    generate_alerts_with(&Thresholds::default(), snapshot, at)
}

/// Emits at most one alert per trail: danger at or over `alert_danger`,
/// warning at or over `alert_warning`, nothing below.
pub fn generate_alerts_with(
    thresholds: &Thresholds,
    snapshot: &[Trail],
    at: NaiveDateTime,
) -> Vec<Alert> {
    snapshot
        .iter()
        .filter_map(|trail| check_trail(thresholds, trail, at))
        .collect()
}

fn check_trail(thresholds: &Thresholds, trail: &Trail, at: NaiveDateTime) -> Option<Alert> {
    let ratio = occupancy_ratio(trail.current_count, trail.capacity);

    let (kind, condition, message) = if ratio >= thresholds.alert_danger {
        warn!(
            trail = %trail.id,
            count = trail.current_count,
            capacity = trail.capacity,
            "Trail over capacity"
        );
        (
            AlertKind::Danger,
            "overcapacity",
            format!("{} over capacity — immediate dispersal required", trail.name),
        )
    } else if ratio >= thresholds.alert_warning {
        (
            AlertKind::Warning,
            "warning",
            format!(
                "{} reached {:.0}% congestion — dispersal recommended",
                trail.name,
                thresholds.alert_warning * 100.0
            ),
        )
    } else {
        return None;
    };

    Some(Alert {
        id: alert_id(&trail.id, condition),
        trail_id: trail.id.clone(),
        trail_name: trail.name.clone(),
        kind,
        message,
        timestamp: at,
        status: AlertStatus::Active,
    })
}

/// Stable id for a trail and condition class, independent of when it fired.
pub fn alert_id(trail_id: &str, condition: &str) -> String {
    format!("alert-{trail_id}-{condition}")
}
