use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FuelError;

use super::common::Period;

/// Lower calorific value applied to every supported fuel.
pub const MJ_PER_TONNE: f64 = 41_000.0;

/// Fraction of LNG energy lost as unburned methane (Otto medium-speed engines).
pub const LNG_METHANE_SLIP_FRACTION: f64 = 0.031;

/// 100-year global-warming potential of methane.
pub const GWP100_CH4: f64 = 25.0;

/// Human-readable list of accepted fuel families.
pub const SUPPORTED_FUELS: &str = "HFO, MGO/MDO, LNG";

/// Fuel families with default emission pathways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Hfo,
    MgoMdo,
    Lng,
}

/// Per-family emission factors in gCO2e/MJ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionFactors {
    /// Well-to-tank intensity.
    pub well_to_tank: f64,
    /// Tank-to-wake CO2 factor.
    pub tank_to_wake_co2: f64,
    /// Fraction of energy slipped as methane.
    pub methane_slip: f64,
}

impl FuelType {
    pub const ALL: [FuelType; 3] = [FuelType::Hfo, FuelType::MgoMdo, FuelType::Lng];

    /// Parses a fuel label, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, FuelError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HFO" => Ok(FuelType::Hfo),
            "MGO" | "MDO" | "MGO/MDO" => Ok(FuelType::MgoMdo),
            "LNG" => Ok(FuelType::Lng),
            _ => Err(FuelError::UnsupportedFuelType {
                value: raw.to_string(),
            }),
        }
    }

    pub fn factors(self) -> EmissionFactors {
        match self {
            FuelType::Hfo => EmissionFactors {
                well_to_tank: 13.27,
                tank_to_wake_co2: 77.4,
                methane_slip: 0.0,
            },
            FuelType::MgoMdo => EmissionFactors {
                well_to_tank: 11.27,
                tank_to_wake_co2: 74.1,
                methane_slip: 0.0,
            },
            FuelType::Lng => EmissionFactors {
                well_to_tank: 18.59,
                tank_to_wake_co2: 56.0,
                methane_slip: LNG_METHANE_SLIP_FRACTION,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FuelType::Hfo => "HFO",
            FuelType::MgoMdo => "MGO/MDO",
            FuelType::Lng => "LNG",
        }
    }
}

impl FromStr for FuelType {
    type Err = FuelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelType::parse(s)
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fuel-consumption record for one route and reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelRecord {
    pub code: String,
    /// Raw fuel label as entered; parsed on demand so bad values surface
    /// as `UnsupportedFuelType` at computation time.
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub fuel_consumption_tonnes: Option<f64>,
    pub period: Period,
    #[serde(default)]
    pub is_baseline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl FuelRecord {
    pub fn new(
        code: impl Into<String>,
        fuel_type: impl Into<String>,
        fuel_consumption_tonnes: f64,
        period: Period,
    ) -> Self {
        Self {
            code: code.into(),
            fuel_type: Some(fuel_type.into()),
            fuel_consumption_tonnes: Some(fuel_consumption_tonnes),
            period,
            is_baseline: false,
            vessel_type: None,
            origin: None,
            destination: None,
            distance_km: None,
        }
    }

    /// A record with no fuel data yet.
    pub fn incomplete(code: impl Into<String>, period: Period) -> Self {
        Self {
            fuel_type: None,
            fuel_consumption_tonnes: None,
            ..Self::new(code, "", 0.0, period)
        }
    }

    pub fn with_vessel_type(mut self, vessel_type: impl Into<String>) -> Self {
        self.vessel_type = Some(vessel_type.into());
        self
    }

    pub fn with_route(
        mut self,
        origin: impl Into<String>,
        destination: impl Into<String>,
        distance_km: f64,
    ) -> Self {
        self.origin = Some(origin.into());
        self.destination = Some(destination.into());
        self.distance_km = Some(distance_km);
        self
    }

    pub fn as_baseline(mut self) -> Self {
        self.is_baseline = true;
        self
    }

    /// Returns the fuel label and mass when both are present.
    pub fn fuel_data(&self) -> Option<(&str, f64)> {
        let fuel = self.fuel_type.as_deref()?;
        if fuel.trim().is_empty() {
            return None;
        }
        let mass = self.fuel_consumption_tonnes?;
        Some((fuel, mass))
    }

    pub fn has_fuel_data(&self) -> bool {
        self.fuel_data().is_some()
    }
}

/// Optional predicates for listing records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub vessel_type: Option<String>,
    pub fuel_type: Option<String>,
    pub period: Option<Period>,
}

impl RecordFilter {
    pub fn for_period(period: Period) -> Self {
        Self {
            period: Some(period),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &FuelRecord) -> bool {
        if let Some(period) = self.period {
            if record.period != period {
                return false;
            }
        }
        if let Some(vessel) = &self.vessel_type {
            let matches = record
                .vessel_type
                .as_deref()
                .is_some_and(|value| value.eq_ignore_ascii_case(vessel.trim()));
            if !matches {
                return false;
            }
        }
        if let Some(fuel) = &self.fuel_type {
            let Some(record_fuel) = record.fuel_type.as_deref() else {
                return false;
            };
            let same_family = match (FuelType::parse(fuel), FuelType::parse(record_fuel)) {
                (Ok(wanted), Ok(actual)) => wanted == actual,
                _ => record_fuel.trim().eq_ignore_ascii_case(fuel.trim()),
            };
            if !same_family {
                return false;
            }
        }
        true
    }
}
