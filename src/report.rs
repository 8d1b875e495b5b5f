use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::config::Catalog;
use crate::models::{Alert, ForecastPoint, Trail};
use crate::summary::{summarize_forecast, summarize_snapshot};

pub fn build_report(
    catalog: &Catalog,
    at: NaiveDateTime,
    snapshot: &[Trail],
    alerts: &[Alert],
    forecast: &[ForecastPoint],
) -> String {
    let thresholds = catalog.thresholds();
    let summary = summarize_snapshot(snapshot, thresholds);

    let mut output = String::new();

    let _ = writeln!(output, "# Trail Congestion Report");
    let _ = writeln!(output, "Generated for {}", at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Current Occupancy");

    if snapshot.is_empty() {
        let _ = writeln!(output, "No trails in the catalog.");
    } else {
        let _ = writeln!(output, "| Trail | Visitors | Capacity | Occupancy | Level |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for trail in snapshot {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {}% | {} |",
                trail.name,
                trail.current_count,
                trail.capacity,
                trail.occupancy_percent(),
                thresholds.level(trail.current_count, trail.capacity).label()
            );
        }
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "{} visitors against a capacity of {} ({} quiet, {} moderate, {} congested).",
            summary.total_visitors,
            summary.total_capacity,
            summary.levels.low,
            summary.levels.medium,
            summary.levels.high
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Active Alerts");

    if alerts.is_empty() {
        let _ = writeln!(output, "No trails over the alert thresholds.");
    } else {
        for alert in alerts {
            let _ = writeln!(
                output,
                "- [{:?}] {} ({})",
                alert.kind,
                alert.message,
                alert.timestamp.format("%H:%M:%S")
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Forecast");

    match summarize_forecast(forecast) {
        None => {
            let _ = writeln!(output, "No forecast available.");
        }
        Some(outlook) => {
            let _ = writeln!(
                output,
                "- Busiest hour: {} (about {} visitors)",
                outlook.peak.time, outlook.peak.total
            );
            let _ = writeln!(
                output,
                "- Quietest hour: {} (about {} visitors)",
                outlook.quietest.time, outlook.quietest.total
            );
            for peak in &outlook.trail_peaks {
                let _ = writeln!(
                    output,
                    "- {} peaks at {} with {} visitors",
                    display_name(snapshot, &peak.trail_id),
                    peak.time,
                    peak.count
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendation");

    match summary.quietest_trail {
        Some(id) => {
            let _ = writeln!(
                output,
                "{} is currently the least crowded trail.",
                display_name(snapshot, &id)
            );
        }
        None => {
            let _ = writeln!(output, "No recommendation available.");
        }
    }

    output
}

fn display_name<'a>(snapshot: &'a [Trail], trail_id: &'a str) -> &'a str {
    snapshot
        .iter()
        .find(|trail| trail.id == trail_id)
        .map(|trail| trail.name.as_str())
        .unwrap_or(trail_id)
}

/// Writes the forecast as CSV: `hour,time,<trail ids...>,total`.
pub fn write_forecast_csv<W: std::io::Write>(
    writer: W,
    points: &[ForecastPoint],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if let Some(first) = points.first() {
        let mut header = vec!["hour".to_string(), "time".to_string()];
        header.extend(first.counts.iter().map(|entry| entry.trail_id.clone()));
        header.push("total".to_string());
        csv_writer.write_record(&header)?;
    }

    for point in points {
        let mut record = vec![point.hour.to_string(), point.time.clone()];
        record.extend(point.counts.iter().map(|entry| entry.count.to_string()));
        record.push(point.total.to_string());
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
