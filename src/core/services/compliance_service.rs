use crate::domain::{
    common::Period,
    compliance::{AdjustedCb, ComplianceResult},
    fuel::{FuelRecord, RecordFilter},
    units::GramsCo2e,
};
use crate::errors::{ComplianceError, FuelError};
use crate::storage::{FuelRecordStore, LedgerStore};

use super::{banking_service::applied_total, intensity_service::IntensityService};

/// Derives compliance balances from intensity and a target.
pub struct ComplianceService;

impl ComplianceService {
    /// Raw balance for a fuel quantity. Positive is surplus, negative is deficit.
    pub fn compute_cb(
        fuel_type: &str,
        mass_tonnes: f64,
        target_intensity: f64,
    ) -> Result<ComplianceResult, FuelError> {
        let intensity = IntensityService::compute_intensity(fuel_type, mass_tonnes)?;
        let cb_grams = GramsCo2e((target_intensity - intensity.intensity) * intensity.energy_mj);
        Ok(ComplianceResult {
            energy_mj: intensity.energy_mj,
            actual_intensity: intensity.intensity,
            cb_grams,
            cb_tonnes: cb_grams.to_tonnes(),
        })
    }

    pub fn cb_for_record(
        record: &FuelRecord,
        target_intensity: f64,
    ) -> Result<ComplianceResult, ComplianceError> {
        let (fuel, mass) = record
            .fuel_data()
            .ok_or_else(|| ComplianceError::MissingFuelData {
                code: record.code.clone(),
            })?;
        Ok(Self::compute_cb(fuel, mass, target_intensity)?)
    }

    pub fn cb_for_entity(
        records: &dyn FuelRecordStore,
        code: &str,
        target_intensity: f64,
    ) -> Result<ComplianceResult, ComplianceError> {
        let record = records
            .find_by_code(code)?
            .ok_or_else(|| ComplianceError::EntityNotFound { code: code.into() })?;
        Self::cb_for_record(&record, target_intensity)
    }

    /// Raw and bank-adjusted balances for every complete record in `period`.
    pub fn adjusted_cb(
        records: &dyn FuelRecordStore,
        ledger: &dyn LedgerStore,
        period: Period,
        target_intensity: f64,
    ) -> Result<Vec<AdjustedCb>, ComplianceError> {
        let filter = RecordFilter::for_period(period);
        let mut results = Vec::new();
        for record in records.find_all(Some(&filter))? {
            if !record.has_fuel_data() {
                continue;
            }
            let cb_before = Self::cb_for_record(&record, target_intensity)?.cb_grams;
            let applied = applied_total(ledger, &record.code, period)?.to_grams();
            results.push(AdjustedCb {
                entity_id: record.code.clone(),
                vessel_type: record.vessel_type.clone(),
                period,
                cb_before,
                applied,
                cb_adjusted: cb_before + applied,
            });
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ledger::LedgerEntry, units::TonnesCo2e};
    use crate::storage::{LedgerStore, MemoryStore};

    const TARGET: f64 = 89.3368;

    #[test]
    fn balance_sign_follows_target() {
        let hfo = ComplianceService::compute_cb("HFO", 1.0, TARGET).unwrap();
        let lng = ComplianceService::compute_cb("lng", 1.0, TARGET).unwrap();
        assert!(hfo.is_deficit());
        assert!(lng.is_surplus());
        assert!((hfo.cb_tonnes.value() + 0.054692).abs() < 1e-4);
        assert!((lng.cb_tonnes.value() - 0.5728).abs() < 1e-4);
    }

    #[test]
    fn record_without_fuel_data_is_reported() {
        let record = FuelRecord::incomplete("R009", 2025);
        let err = ComplianceService::cb_for_record(&record, TARGET).unwrap_err();
        assert_eq!(err, ComplianceError::MissingFuelData { code: "R009".into() });
    }

    #[test]
    fn unknown_entity_is_not_found() {
        let store = MemoryStore::new();
        let err = ComplianceService::cb_for_entity(&store, "R404", TARGET).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.code(), "ROUTE_NOT_FOUND");
    }

    #[test]
    fn adjusted_cb_adds_applied_surplus() {
        let store = MemoryStore::with_records(vec![
            FuelRecord::new("R001", "HFO", 1.0, 2025).with_vessel_type("Container"),
            FuelRecord::new("R002", "LNG", 1.0, 2024),
            FuelRecord::incomplete("R003", 2025),
        ]);
        store
            .append_entry(LedgerEntry::applied("R001", 2025, TonnesCo2e(0.25)))
            .unwrap();

        let rows = ComplianceService::adjusted_cb(&store, &store, 2025, TARGET).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.entity_id, "R001");
        assert_eq!(row.vessel_type.as_deref(), Some("Container"));
        assert_eq!(row.applied, GramsCo2e(250_000.0));
        assert_eq!(row.cb_adjusted, row.cb_before + GramsCo2e(250_000.0));
    }
}
