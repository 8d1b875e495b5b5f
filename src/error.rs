use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog has no trails")]
    Empty,

    #[error("Duplicate trail id: {0}")]
    DuplicateTrail(String),

    #[error("Trail {0} has zero capacity")]
    ZeroCapacity(String),

    #[error("Trail {trail_id} has invalid popularity weight {weight}")]
    InvalidWeight { trail_id: String, weight: f64 },

    #[error("{table} multiplier at index {index} is invalid: {value}")]
    InvalidMultiplier {
        table: &'static str,
        index: usize,
        value: f64,
    },

    #[error("{band} noise band [{min}, {max}] is invalid")]
    InvalidNoiseBand {
        band: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Overload ceiling must be positive, got {0}")]
    InvalidCeiling(f64),

    #[error("Catalog can project {0:.0} visitors at once, more than a u32 total holds")]
    CapacityOverflow(f64),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Could not read catalog: {0}")]
    Read(#[from] std::io::Error),

    #[error("Could not parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AlertLogError {
    #[error("Unknown alert: {0}")]
    UnknownAlert(String),
}
