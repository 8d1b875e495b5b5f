//! Trail catalog and signal model configuration.
//!
//! The built-in catalog describes the five Mudeungsan routes. An edited copy
//! can be written with `crowd-signal catalog` and loaded back with
//! `--config`; every catalog is validated once at load time so generators
//! never see a zero capacity or an unusable table.

use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;
use crate::models::{occupancy_ratio, Coordinate, CrowdLevel, Difficulty, Trail};

// Peaks at 11:00.
pub const HOURLY_MULTIPLIERS: [f64; 24] = [
    0.05, 0.02, 0.01, 0.01, 0.02, 0.05, // 00-05
    0.15, 0.35, 0.55, 0.75, 0.90, 1.00, // 06-11
    0.95, 0.85, 0.80, 0.70, 0.55, 0.40, // 12-17
    0.25, 0.15, 0.10, 0.08, 0.06, 0.05, // 18-23
];

// Sunday first.
pub const DAY_MULTIPLIERS: [f64; 7] = [1.2, 0.5, 0.5, 0.6, 0.6, 0.7, 1.3];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseBand {
    pub min: f64,
    pub max: f64,
}

impl NoiseBand {
    pub const SNAPSHOT: NoiseBand = NoiseBand { min: 0.8, max: 1.2 };
    pub const FORECAST: NoiseBand = NoiseBand { min: 0.9, max: 1.1 };

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..self.max)
    }

    fn validate(&self, band: &'static str) -> Result<(), CatalogError> {
        let valid = self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.min <= self.max;
        if valid {
            Ok(())
        } else {
            Err(CatalogError::InvalidNoiseBand {
                band,
                min: self.min,
                max: self.max,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub level_medium: f64,
    pub level_high: f64,
    pub alert_warning: f64,
    pub alert_danger: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            level_medium: 0.5,
            level_high: 0.8,
            alert_warning: 0.8,
            alert_danger: 1.0,
        }
    }
}

impl Thresholds {
    pub fn level(&self, current_count: u32, capacity: u32) -> CrowdLevel {
        let ratio = occupancy_ratio(current_count, capacity);
        if ratio < self.level_medium {
            CrowdLevel::Low
        } else if ratio < self.level_high {
            CrowdLevel::Medium
        } else {
            CrowdLevel::High
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let all = [
            self.level_medium,
            self.level_high,
            self.alert_warning,
            self.alert_danger,
        ];
        if all.iter().any(|value| !value.is_finite() || *value <= 0.0) {
            return Err(CatalogError::InvalidThresholds(
                "thresholds must be positive".to_string(),
            ));
        }
        if self.level_medium >= self.level_high {
            return Err(CatalogError::InvalidThresholds(format!(
                "level_medium {} must be below level_high {}",
                self.level_medium, self.level_high
            )));
        }
        if self.alert_warning >= self.alert_danger {
            return Err(CatalogError::InvalidThresholds(format!(
                "alert_warning {} must be below alert_danger {}",
                self.alert_warning, self.alert_danger
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailEntry {
    #[serde(flatten)]
    pub trail: Trail,
    pub popularity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub trails: Vec<TrailEntry>,
    pub hourly_multipliers: [f64; 24],
    pub day_multipliers: [f64; 7],
    pub snapshot_noise: NoiseBand,
    pub forecast_noise: NoiseBand,
    /// Live counts are clamped to `capacity * overload_ceiling`.
    pub overload_ceiling: f64,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            trails: default_trails(),
            hourly_multipliers: HOURLY_MULTIPLIERS,
            day_multipliers: DAY_MULTIPLIERS,
            snapshot_noise: NoiseBand::SNAPSHOT,
            forecast_noise: NoiseBand::FORECAST,
            overload_ceiling: 1.2,
            thresholds: Thresholds::default(),
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.trails.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &self.trails {
            let trail = &entry.trail;
            if !seen.insert(trail.id.as_str()) {
                return Err(CatalogError::DuplicateTrail(trail.id.clone()));
            }
            if trail.capacity == 0 {
                return Err(CatalogError::ZeroCapacity(trail.id.clone()));
            }
            if !entry.popularity.is_finite() || entry.popularity < 0.0 {
                return Err(CatalogError::InvalidWeight {
                    trail_id: trail.id.clone(),
                    weight: entry.popularity,
                });
            }
        }

        check_table("hourly", &self.hourly_multipliers)?;
        check_table("day-of-week", &self.day_multipliers)?;
        self.snapshot_noise.validate("snapshot")?;
        self.forecast_noise.validate("forecast")?;

        if !self.overload_ceiling.is_finite() || self.overload_ceiling <= 0.0 {
            return Err(CatalogError::InvalidCeiling(self.overload_ceiling));
        }

        let projected = self.peak_projection();
        if projected > u32::MAX as f64 {
            return Err(CatalogError::CapacityOverflow(projected));
        }

        self.thresholds.validate()
    }
}

impl SignalConfig {
    // Largest sum of per-trail counts any snapshot, forecast point or
    // capacity total can reach.
    fn peak_projection(&self) -> f64 {
        let peak_base = max_of(&self.hourly_multipliers) * max_of(&self.day_multipliers);
        let peak_noise = self.snapshot_noise.max.max(self.forecast_noise.max);
        self.trails
            .iter()
            .map(|entry| {
                let capacity = entry.trail.capacity as f64;
                let projected = (capacity * peak_base * entry.popularity * peak_noise).round();
                let ceiling = (capacity * self.overload_ceiling).round();
                projected.max(ceiling).max(capacity)
            })
            .sum()
    }
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().cloned().fold(0.0, f64::max)
}

fn check_table(table: &'static str, values: &[f64]) -> Result<(), CatalogError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite() || **value < 0.0)
    {
        Some((index, value)) => Err(CatalogError::InvalidMultiplier {
            table,
            index,
            value: *value,
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    config: SignalConfig,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            config: SignalConfig::default(),
        }
    }
}

impl Catalog {
    pub fn new(config: SignalConfig) -> Result<Self, CatalogError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_json(contents: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            trails = catalog.trails().len(),
            "Loaded trail catalog"
        );
        Ok(catalog)
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn trails(&self) -> &[TrailEntry] {
        &self.config.trails
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.config.thresholds
    }

    pub fn base_multiplier(&self, hour: usize, day: usize) -> f64 {
        self.config.hourly_multipliers[hour % 24] * self.config.day_multipliers[day % 7]
    }
}

#[allow(clippy::too_many_arguments)]
fn trail(
    id: &str,
    name: &str,
    short_name: &str,
    capacity: u32,
    distance_km: f64,
    difficulty: Difficulty,
    description: &str,
    path: [(f64, f64); 3],
    popularity: f64,
) -> TrailEntry {
    TrailEntry {
        trail: Trail {
            id: id.to_string(),
            name: name.to_string(),
            short_name: short_name.to_string(),
            capacity,
            current_count: 0,
            distance_km,
            difficulty,
            description: description.to_string(),
            path: path
                .iter()
                .map(|&(lat, lng)| Coordinate { lat, lng })
                .collect(),
        },
        popularity,
    }
}

fn default_trails() -> Vec<TrailEntry> {
    vec![
        trail(
            "seoseokdae",
            "Seoseokdae Course",
            "Seoseokdae",
            500,
            4.2,
            Difficulty::Hard,
            "Signature route past the summit columnar joints",
            [(35.1347, 126.9889), (35.1320, 126.9850), (35.1280, 126.9820)],
            1.4,
        ),
        trail(
            "ipseokdae",
            "Ipseokdae Course",
            "Ipseokdae",
            400,
            3.8,
            Difficulty::Hard,
            "Ipseokdae rock pillars with a view of Cheonwangbong",
            [(35.1340, 126.9920), (35.1310, 126.9880), (35.1275, 126.9840)],
            1.2,
        ),
        trail(
            "jungbong",
            "Jungbong Course",
            "Jungbong",
            300,
            5.1,
            Difficulty::Medium,
            "Ridge traverse by way of Jungbong peak",
            [(35.1380, 126.9950), (35.1350, 126.9910), (35.1320, 126.9870)],
            0.8,
        ),
        trail(
            "wonhyo",
            "Wonhyosa Course",
            "Wonhyosa",
            350,
            3.2,
            Difficulty::Easy,
            "Gentle walk by way of Wonhyosa temple",
            [(35.1290, 126.9780), (35.1260, 126.9750), (35.1230, 126.9720)],
            0.9,
        ),
        trail(
            "jeungsim",
            "Jeungsimsa Course",
            "Jeungsimsa",
            450,
            2.8,
            Difficulty::Easy,
            "Valley path past Jeungsimsa temple",
            [(35.1250, 126.9700), (35.1220, 126.9670), (35.1190, 126.9640)],
            1.0,
        ),
    ]
}
