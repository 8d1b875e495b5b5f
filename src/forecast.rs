use chrono::NaiveDateTime;
use rand::Rng;
use tracing::debug;

use crate::config::Catalog;
use crate::models::{ForecastPoint, TrailCount};
use crate::signal::{expected_count, time_slot};

pub const DEFAULT_HORIZON_HOURS: usize = 24;

/// Projects hourly occupancy for `horizon_hours` hours starting at the hour
/// of `at`. Every point draws its own forecast-band noise, so consecutive
/// calls (and the live snapshot) do not agree with each other.
pub fn generate_forecast<R: Rng + ?Sized>(
    catalog: &Catalog,
    at: NaiveDateTime,
    horizon_hours: usize,
    rng: &mut R,
) -> Vec<ForecastPoint> {
    let config = catalog.config();
    let (start_hour, start_day) = time_slot(at);

    let points: Vec<ForecastPoint> = (0..horizon_hours)
        .map(|offset| {
            let absolute = start_hour + offset;
            let hour = absolute % 24;
            let day = (start_day + absolute / 24) % 7;
            let base = catalog.base_multiplier(hour, day);

            let counts: Vec<TrailCount> = catalog
                .trails()
                .iter()
                .map(|entry| TrailCount {
                    trail_id: entry.trail.id.clone(),
                    count: expected_count(
                        entry.trail.capacity,
                        base,
                        entry.popularity,
                        config.forecast_noise.sample(rng),
                    ),
                })
                .collect();
            let total = counts.iter().map(|entry| entry.count).sum();

            ForecastPoint {
                hour: offset,
                time: format!("{hour:02}:00"),
                counts,
                total,
            }
        })
        .collect();

    debug!(%at, horizon_hours, "Generated crowd forecast");
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn saturday_evening() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 24)
            .unwrap()
            .and_hms_opt(22, 30, 0)
            .unwrap()
    }

    #[test]
    fn full_day_has_24_points_with_summed_totals() {
        let catalog = Catalog::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let points = generate_forecast(&catalog, saturday_evening(), DEFAULT_HORIZON_HOURS, &mut rng);

        assert_eq!(points.len(), 24);
        for (offset, point) in points.iter().enumerate() {
            assert_eq!(point.hour, offset);
            assert_eq!(point.counts.len(), 5);
            assert_eq!(point.total, point.counts.iter().map(|c| c.count).sum::<u32>());
        }
    }

    #[test]
    fn labels_wrap_past_midnight() {
        let catalog = Catalog::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let points = generate_forecast(&catalog, saturday_evening(), 4, &mut rng);
        let labels: Vec<&str> = points.iter().map(|p| p.time.as_str()).collect();
        assert_eq!(labels, vec!["22:00", "23:00", "00:00", "01:00"]);
    }

    #[test]
    fn rolls_into_next_day_multiplier() {
        let catalog = Catalog::default();
        let mut rng = StepRng::new(0, 0);
        // Saturday 22:00 -> Sunday 11:00 at offset 13.
        let points = generate_forecast(&catalog, saturday_evening(), 14, &mut rng);
        let sunday_peak = &points[13];
        assert_eq!(sunday_peak.time, "11:00");
        // 450 * (1.0 * 1.2) * 1.0 * 0.9, not clamped
        assert_eq!(sunday_peak.count_for("jeungsim"), Some(486));
        // 500 * 1.2 * 1.4 * 0.9 = 756 exceeds 120% of capacity; forecasts are not clamped
        assert_eq!(sunday_peak.count_for("seoseokdae"), Some(756));
    }

    #[test]
    fn zero_horizon_is_empty() {
        let catalog = Catalog::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(generate_forecast(&catalog, saturday_evening(), 0, &mut rng).is_empty());
    }
}
