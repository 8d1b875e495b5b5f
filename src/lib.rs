//! Synthetic crowd signals for a park trail-congestion dashboard.
//!
//! Occupancy is derived from per-trail capacity, hour-of-day and
//! day-of-week multipliers, popularity weights and bounded noise. The three
//! entry points are [`signal::generate_snapshot`],
//! [`forecast::generate_forecast`] and [`alerts::generate_alerts`]; all of
//! them take the random source explicitly so callers can seed it.

pub mod alert_log;
pub mod alerts;
pub mod config;
pub mod error;
pub mod forecast;
pub mod models;
pub mod report;
pub mod signal;
pub mod summary;

pub use config::{Catalog, SignalConfig};
pub use error::{AlertLogError, CatalogError};
