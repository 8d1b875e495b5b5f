use chrono::{Datelike, NaiveDateTime, Timelike};
use rand::Rng;
use tracing::debug;

use crate::config::Catalog;
use crate::models::Trail;

/// Hour of day (0-23) and day of week (0 = Sunday) for a wall-clock instant.
pub fn time_slot(at: NaiveDateTime) -> (usize, usize) {
    (
        at.hour() as usize,
        at.weekday().num_days_from_sunday() as usize,
    )
}

/// Expected visitors on a trail for a given base multiplier and noise factor.
pub fn expected_count(capacity: u32, base: f64, popularity: f64, noise: f64) -> u32 {
    let raw = (capacity as f64 * base * popularity * noise).round();
    if raw <= 0.0 {
        0
    } else {
        raw as u32
    }
}

/// Highest live count a trail can report.
pub fn count_ceiling(capacity: u32, overload_ceiling: f64) -> u32 {
    (capacity as f64 * overload_ceiling).round() as u32
}

/// Returns a copy of every catalog trail, in catalog order, with
/// `current_count` set to a fresh noisy reading for `at`.
pub fn generate_snapshot<R: Rng + ?Sized>(
    catalog: &Catalog,
    at: NaiveDateTime,
    rng: &mut R,
) -> Vec<Trail> {
    let config = catalog.config();
    let (hour, day) = time_slot(at);
    let base = catalog.base_multiplier(hour, day);

    let snapshot: Vec<Trail> = catalog
        .trails()
        .iter()
        .map(|entry| {
            let noise = config.snapshot_noise.sample(rng);
            let count = expected_count(entry.trail.capacity, base, entry.popularity, noise);
            let ceiling = count_ceiling(entry.trail.capacity, config.overload_ceiling);
            Trail {
                current_count: count.min(ceiling),
                ..entry.trail.clone()
            }
        })
        .collect();

    debug!(
        %at,
        hour,
        day,
        base,
        total = snapshot.iter().map(|t| t.current_count).sum::<u32>(),
        "Generated crowd snapshot"
    );
    snapshot
}
