use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub capacity: u32,
    // Zero in the catalog; set on snapshot copies.
    #[serde(default)]
    pub current_count: u32,
    pub distance_km: f64,
    pub difficulty: Difficulty,
    pub description: String,
    #[serde(default)]
    pub path: Vec<Coordinate>,
}

impl Trail {
    pub fn occupancy_ratio(&self) -> f64 {
        occupancy_ratio(self.current_count, self.capacity)
    }

    pub fn occupancy_percent(&self) -> u32 {
        (self.occupancy_ratio() * 100.0).round() as u32
    }
}

pub fn occupancy_ratio(current_count: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return if current_count == 0 { 0.0 } else { f64::INFINITY };
    }
    current_count as f64 / capacity as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrowdLevel {
    Low,
    Medium,
    High,
}

impl CrowdLevel {
    pub fn label(self) -> &'static str {
        match self {
            CrowdLevel::Low => "quiet",
            CrowdLevel::Medium => "moderate",
            CrowdLevel::High => "congested",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailCount {
    pub trail_id: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub hour: usize,
    pub time: String,
    pub counts: Vec<TrailCount>,
    pub total: u32,
}

impl ForecastPoint {
    pub fn count_for(&self, trail_id: &str) -> Option<u32> {
        self.counts
            .iter()
            .find(|entry| entry.trail_id == trail_id)
            .map(|entry| entry.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub trail_id: String,
    pub trail_name: String,
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub status: AlertStatus,
}
