use serde::{Deserialize, Serialize};

use super::{
    common::Period,
    units::{GramsCo2e, TonnesCo2e},
};

/// Well-to-wake intensity and energy content of a fuel quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityResult {
    /// gCO2e per MJ.
    pub intensity: f64,
    pub energy_mj: f64,
}

/// Raw compliance balance, before any banking adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub energy_mj: f64,
    pub actual_intensity: f64,
    pub cb_grams: GramsCo2e,
    pub cb_tonnes: TonnesCo2e,
}

impl ComplianceResult {
    pub fn is_surplus(&self) -> bool {
        self.cb_grams.is_positive()
    }

    pub fn is_deficit(&self) -> bool {
        self.cb_grams.is_negative()
    }
}

/// One record's intensity measured against the baseline record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub code: String,
    pub baseline_intensity: f64,
    pub comparison_intensity: f64,
    pub percent_diff: f64,
    pub compliant: bool,
}

/// Raw balance plus surplus applied from the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedCb {
    pub entity_id: String,
    pub vessel_type: Option<String>,
    pub period: Period,
    pub cb_before: GramsCo2e,
    pub applied: GramsCo2e,
    pub cb_adjusted: GramsCo2e,
}
