//! Reference routes used by the `seed` command and by tests.

use crate::domain::fuel::FuelRecord;
use crate::storage::Dataset;

pub const SEED_PERIOD: i32 = 2025;

/// Five routes for 2025; R001 is the baseline.
pub fn seed_records() -> Vec<FuelRecord> {
    vec![
        FuelRecord::new("R001", "HFO", 2500.0, SEED_PERIOD)
            .with_route("Rotterdam", "Singapore", 8500.0)
            .as_baseline(),
        FuelRecord::new("R002", "MGO", 3200.0, SEED_PERIOD)
            .with_route("Hamburg", "Shanghai", 12000.0),
        FuelRecord::new("R003", "LNG", 1800.0, SEED_PERIOD)
            .with_route("Los Angeles", "Tokyo", 5500.0),
        FuelRecord::new("R004", "HFO", 950.0, SEED_PERIOD)
            .with_route("New York", "London", 3200.0),
        FuelRecord::new("R005", "MGO", 350.0, SEED_PERIOD)
            .with_route("Dubai", "Mumbai", 1200.0),
    ]
}

pub fn seed_dataset() -> Dataset {
    Dataset::with_records(seed_records())
}
