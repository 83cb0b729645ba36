use thiserror::Error;
use uuid::Uuid;

use crate::domain::{common::Period, fuel::SUPPORTED_FUELS, units::GramsCo2e};

/// Failures raised while interpreting fuel inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuelError {
    #[error("Unsupported fuel type: {value}. Supported fuels: {}", SUPPORTED_FUELS)]
    UnsupportedFuelType { value: String },
    #[error("Fuel mass must be non-negative, got {mass} t")]
    NegativeMass { mass: f64 },
}

impl FuelError {
    pub fn code(&self) -> &'static str {
        match self {
            FuelError::UnsupportedFuelType { .. } => "UNSUPPORTED_FUEL_TYPE",
            FuelError::NegativeMass { .. } => "INVALID_INPUT",
        }
    }
}

/// Failures raised by store collaborators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Route not found: {code}")]
    RecordNotFound { code: String },
    #[error("Pool not found: {id}")]
    PoolNotFound { id: Uuid },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Unsupported dataset schema version {found} (max {supported})")]
    UnsupportedSchema { found: u8, supported: u8 },
    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::RecordNotFound { .. } => "ROUTE_NOT_FOUND",
            StoreError::PoolNotFound { .. } => "POOL_NOT_FOUND",
            _ => "STORAGE_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::RecordNotFound { .. } | StoreError::PoolNotFound { .. }
        )
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// Failures resolving a compliance balance for a stored entity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComplianceError {
    #[error("Route not found: {code}")]
    EntityNotFound { code: String },
    #[error("Route {code} is missing fuel type or fuel consumption")]
    MissingFuelData { code: String },
    #[error(transparent)]
    Fuel(#[from] FuelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ComplianceError {
    pub fn code(&self) -> &'static str {
        match self {
            ComplianceError::EntityNotFound { .. } => "ROUTE_NOT_FOUND",
            ComplianceError::MissingFuelData { .. } => "MISSING_FUEL_DATA",
            ComplianceError::Fuel(err) => err.code(),
            ComplianceError::Store(err) => err.code(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ComplianceError::EntityNotFound { .. } => true,
            ComplianceError::Store(err) => err.is_not_found(),
            _ => false,
        }
    }
}

/// Failures of the banking ledger state machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankingError {
    #[error("Amount must be greater than zero, got {amount}")]
    InvalidAmount { amount: GramsCo2e },
    #[error("Cannot bank for {entity_id} ({period}): compliance balance {cb} is not positive")]
    CbNotPositive {
        entity_id: String,
        period: Period,
        cb: GramsCo2e,
    },
    #[error("Requested {requested} exceeds available {available}")]
    AmountExceedsAvailable {
        requested: GramsCo2e,
        available: GramsCo2e,
    },
    #[error("No banked surplus available for {entity_id} ({period})")]
    NoBankedSurplus { entity_id: String, period: Period },
    #[error("{entity_id} ({period}) has no deficit to offset (balance {cb})")]
    NoDeficit {
        entity_id: String,
        period: Period,
        cb: GramsCo2e,
    },
    #[error(transparent)]
    Compliance(#[from] ComplianceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BankingError {
    pub fn code(&self) -> &'static str {
        match self {
            BankingError::InvalidAmount { .. } => "INVALID_AMOUNT",
            BankingError::CbNotPositive { .. } => "CB_NOT_POSITIVE",
            BankingError::AmountExceedsAvailable { .. } => "AMOUNT_EXCEEDS_AVAILABLE",
            BankingError::NoBankedSurplus { .. } => "NO_BANKED_SURPLUS",
            BankingError::NoDeficit { .. } => "NO_DEFICIT",
            BankingError::Compliance(err) => err.code(),
            BankingError::Store(err) => err.code(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            BankingError::Compliance(err) => err.is_not_found(),
            BankingError::Store(err) => err.is_not_found(),
            _ => false,
        }
    }
}

/// Failures of pool formation and its post-conditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    #[error("Invalid pool: {reason}")]
    InvalidPool { reason: String },
    #[error("Pool sum must be non-negative, got {pool_sum}")]
    PoolSumNegative { pool_sum: GramsCo2e },
    #[error("Deficit ship {entity_id} cannot end up worse (cb_after {cb_after} < cb_before {cb_before})")]
    DeficitShipWorse {
        entity_id: String,
        cb_before: GramsCo2e,
        cb_after: GramsCo2e,
    },
    #[error("Surplus ship {entity_id} cannot end up negative (cb_after {cb_after})")]
    SurplusShipNegative {
        entity_id: String,
        cb_after: GramsCo2e,
    },
    #[error(transparent)]
    Compliance(#[from] ComplianceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PoolError {
    pub fn code(&self) -> &'static str {
        match self {
            PoolError::InvalidPool { .. } => "INVALID_POOL",
            PoolError::PoolSumNegative { .. } => "POOL_SUM_NEGATIVE",
            PoolError::DeficitShipWorse { .. } => "DEFICIT_SHIP_WORSE",
            PoolError::SurplusShipNegative { .. } => "SURPLUS_SHIP_NEGATIVE",
            PoolError::Compliance(err) => err.code(),
            PoolError::Store(err) => err.code(),
        }
    }

    /// True for post-condition breaches, which indicate an allocation bug.
    pub fn is_invariant_breach(&self) -> bool {
        matches!(
            self,
            PoolError::DeficitShipWorse { .. } | PoolError::SurplusShipNegative { .. }
        )
    }
}

/// Failures comparing records against the baseline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    #[error("No baseline route found")]
    NoBaseline,
    #[error("Baseline route {code} is missing fuel type or fuel consumption")]
    MissingFuelData { code: String },
    #[error(transparent)]
    Fuel(#[from] FuelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ComparisonError {
    pub fn code(&self) -> &'static str {
        match self {
            ComparisonError::NoBaseline => "NO_BASELINE",
            ComparisonError::MissingFuelData { .. } => "MISSING_FUEL_DATA",
            ComparisonError::Fuel(err) => err.code(),
            ComparisonError::Store(err) => err.code(),
        }
    }
}

/// Unified error for callers that drive several components.
#[derive(Debug, Error)]
pub enum FuelEuError {
    #[error(transparent)]
    Fuel(#[from] FuelError),
    #[error(transparent)]
    Compliance(#[from] ComplianceError),
    #[error(transparent)]
    Banking(#[from] BankingError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FuelEuError {
    /// Stable identifier suitable for machine consumption.
    pub fn code(&self) -> &'static str {
        match self {
            FuelEuError::Fuel(err) => err.code(),
            FuelEuError::Compliance(err) => err.code(),
            FuelEuError::Banking(err) => err.code(),
            FuelEuError::Pool(err) => err.code(),
            FuelEuError::Comparison(err) => err.code(),
            FuelEuError::Store(err) => err.code(),
            FuelEuError::Config(_) => "CONFIG_ERROR",
            FuelEuError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// Lookup failures are reported apart from validation failures.
    pub fn is_not_found(&self) -> bool {
        match self {
            FuelEuError::Compliance(err) => err.is_not_found(),
            FuelEuError::Banking(err) => err.is_not_found(),
            FuelEuError::Pool(PoolError::Compliance(err)) => err.is_not_found(),
            FuelEuError::Store(err) => err.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FuelEuError>;
