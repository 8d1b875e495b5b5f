use serde::Serialize;

use crate::config::Thresholds;
use crate::models::{CrowdLevel, ForecastPoint, Trail};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub total_visitors: u32,
    pub total_capacity: u32,
    pub levels: LevelCounts,
    /// Trail with the lowest occupancy ratio, the one to recommend.
    pub quietest_trail: Option<String>,
    pub danger_alerts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrailPeak {
    pub trail_id: String,
    pub time: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastSummary {
    pub peak: ForecastPoint,
    pub quietest: ForecastPoint,
    pub trail_peaks: Vec<TrailPeak>,
}

pub fn summarize_snapshot(snapshot: &[Trail], thresholds: &Thresholds) -> SnapshotSummary {
    let mut levels = LevelCounts::default();
    for trail in snapshot {
        match thresholds.level(trail.current_count, trail.capacity) {
            CrowdLevel::Low => levels.low += 1,
            CrowdLevel::Medium => levels.medium += 1,
            CrowdLevel::High => levels.high += 1,
        }
    }

    let quietest_trail = snapshot
        .iter()
        .fold(None::<&Trail>, |best, trail| match best {
            Some(current) if current.occupancy_ratio() <= trail.occupancy_ratio() => Some(current),
            _ => Some(trail),
        })
        .map(|trail| trail.id.clone());

    let danger_alerts = snapshot
        .iter()
        .filter(|trail| trail.occupancy_ratio() >= thresholds.alert_danger)
        .count();

    SnapshotSummary {
        total_visitors: snapshot.iter().map(|t| t.current_count).sum(),
        total_capacity: snapshot.iter().map(|t| t.capacity).sum(),
        levels,
        quietest_trail,
        danger_alerts,
    }
}

pub fn summarize_forecast(points: &[ForecastPoint]) -> Option<ForecastSummary> {
    let first = points.first()?;

    let mut peak = first;
    let mut quietest = first;
    for point in &points[1..] {
        if point.total > peak.total {
            peak = point;
        }
        if point.total < quietest.total {
            quietest = point;
        }
    }

    let trail_peaks = first
        .counts
        .iter()
        .map(|entry| {
            let mut best_time = first.time.clone();
            let mut best_count = entry.count;
            for point in &points[1..] {
                if let Some(count) = point.count_for(&entry.trail_id) {
                    if count > best_count {
                        best_count = count;
                        best_time = point.time.clone();
                    }
                }
            }
            TrailPeak {
                trail_id: entry.trail_id.clone(),
                time: best_time,
                count: best_count,
            }
        })
        .collect();

    Some(ForecastSummary {
        peak: peak.clone(),
        quietest: quietest.clone(),
        trail_peaks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, TrailCount};

    fn trail(id: &str, capacity: u32, current_count: u32) -> Trail {
        Trail {
            id: id.to_string(),
            name: id.to_string(),
            short_name: id.to_string(),
            capacity,
            current_count,
            distance_km: 2.0,
            difficulty: Difficulty::Hard,
            description: String::new(),
            path: Vec::new(),
        }
    }

    fn point(hour: usize, counts: &[(&str, u32)]) -> ForecastPoint {
        let counts: Vec<TrailCount> = counts
            .iter()
            .map(|&(trail_id, count)| TrailCount {
                trail_id: trail_id.to_string(),
                count,
            })
            .collect();
        ForecastPoint {
            hour,
            time: format!("{:02}:00", (hour + 9) % 24),
            total: counts.iter().map(|c| c.count).sum(),
            counts,
        }
    }

    #[test]
    fn snapshot_summary_counts_levels_and_picks_quietest() {
        let snapshot = vec![
            trail("seoseokdae", 500, 550),
            trail("jungbong", 300, 180),
            trail("wonhyo", 350, 70),
            trail("jeungsim", 450, 90),
        ];
        let summary = summarize_snapshot(&snapshot, &Thresholds::default());

        assert_eq!(summary.total_visitors, 890);
        assert_eq!(summary.total_capacity, 1600);
        assert_eq!(
            summary.levels,
            LevelCounts {
                low: 2,
                medium: 1,
                high: 1,
            }
        );
        // wonhyo and jeungsim are both at 20%; the first one wins.
        assert_eq!(summary.quietest_trail.as_deref(), Some("wonhyo"));
        assert_eq!(summary.danger_alerts, 1);
    }

    #[test]
    fn empty_snapshot_has_no_recommendation() {
        let summary = summarize_snapshot(&[], &Thresholds::default());
        assert_eq!(summary.total_visitors, 0);
        assert!(summary.quietest_trail.is_none());
    }

    #[test]
    fn forecast_summary_finds_peak_and_trough() {
        let points = vec![
            point(0, &[("a", 10), ("b", 40)]),
            point(1, &[("a", 60), ("b", 30)]),
            point(2, &[("a", 5), ("b", 45)]),
            point(3, &[("a", 2), ("b", 1)]),
        ];
        let summary = summarize_forecast(&points).unwrap();

        assert_eq!(summary.peak.hour, 1);
        assert_eq!(summary.quietest.hour, 3);
        assert_eq!(summary.trail_peaks[0].time, "10:00");
        assert_eq!(summary.trail_peaks[0].count, 60);
        assert_eq!(summary.trail_peaks[1].time, "11:00");
        assert_eq!(summary.trail_peaks[1].count, 45);
    }

    #[test]
    fn empty_forecast_has_no_summary() {
        assert!(summarize_forecast(&[]).is_none());
    }
}
