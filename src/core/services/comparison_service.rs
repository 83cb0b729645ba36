use crate::domain::{compliance::ComparisonResult, fuel::FuelRecord};
use crate::errors::ComparisonError;
use crate::storage::FuelRecordStore;

use super::intensity_service::IntensityService;

/// Measures each record's intensity against the baseline record.
pub struct ComparisonService;

impl ComparisonService {
    /// Compares every record except the baseline.
    ///
    /// Records without fuel data are skipped; a baseline without fuel data
    /// is an error.
    pub fn compare_to_baseline(
        records: &[FuelRecord],
        baseline: Option<&FuelRecord>,
        target_intensity: f64,
    ) -> Result<Vec<ComparisonResult>, ComparisonError> {
        let baseline = baseline.ok_or(ComparisonError::NoBaseline)?;
        let (fuel, mass) = baseline
            .fuel_data()
            .ok_or_else(|| ComparisonError::MissingFuelData {
                code: baseline.code.clone(),
            })?;
        let baseline_intensity = IntensityService::compute_intensity(fuel, mass)?.intensity;

        let mut results = Vec::new();
        for record in records {
            if record.is_baseline || record.code == baseline.code {
                continue;
            }
            let Some((fuel, mass)) = record.fuel_data() else {
                tracing::debug!(code = %record.code, "skipping record without fuel data");
                continue;
            };
            let comparison_intensity = IntensityService::compute_intensity(fuel, mass)?.intensity;
            results.push(Self::compare_intensities(
                &record.code,
                baseline_intensity,
                comparison_intensity,
                target_intensity,
            ));
        }
        Ok(results)
    }

    /// Loads the records and the flagged baseline from `store`.
    pub fn compare_with_store(
        store: &dyn FuelRecordStore,
        target_intensity: f64,
    ) -> Result<Vec<ComparisonResult>, ComparisonError> {
        let records = store.find_all(None)?;
        let baseline = store.find_baseline()?;
        Self::compare_to_baseline(&records, baseline.as_ref(), target_intensity)
    }

    pub fn compare_intensities(
        code: &str,
        baseline_intensity: f64,
        comparison_intensity: f64,
        target_intensity: f64,
    ) -> ComparisonResult {
        ComparisonResult {
            code: code.to_string(),
            baseline_intensity,
            comparison_intensity,
            percent_diff: percent_diff(baseline_intensity, comparison_intensity),
            compliant: comparison_intensity <= target_intensity,
        }
    }
}

/// Relative change of `comparison` over `baseline`, in percent.
pub fn percent_diff(baseline: f64, comparison: f64) -> f64 {
    (comparison / baseline - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: f64 = 89.3368;

    #[test]
    fn percent_diff_against_baseline() {
        let result = ComparisonService::compare_intensities("R002", 90.0, 88.0, TARGET);
        assert!((result.percent_diff + 2.222).abs() < 0.01);
        assert!(result.compliant);
    }

    #[test]
    fn missing_baseline_is_an_error() {
        let records = vec![FuelRecord::new("R001", "HFO", 1.0, 2025)];
        let err = ComparisonService::compare_to_baseline(&records, None, TARGET).unwrap_err();
        assert_eq!(err, ComparisonError::NoBaseline);
    }

    #[test]
    fn baseline_without_fuel_data_is_an_error() {
        let baseline = FuelRecord::incomplete("R001", 2025).as_baseline();
        let err = ComparisonService::compare_to_baseline(&[], Some(&baseline), TARGET).unwrap_err();
        assert_eq!(err.code(), "MISSING_FUEL_DATA");
    }

    #[test]
    fn skips_baseline_and_incomplete_records() {
        let baseline = FuelRecord::new("R001", "HFO", 2500.0, 2025).as_baseline();
        let records = vec![
            baseline.clone(),
            FuelRecord::new("R002", "MGO", 3200.0, 2025),
            FuelRecord::incomplete("R003", 2025),
            FuelRecord::new("R004", "HFO", 950.0, 2025),
        ];
        let results =
            ComparisonService::compare_to_baseline(&records, Some(&baseline), TARGET).unwrap();
        let codes: Vec<_> = results.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["R002", "R004"]);
        assert!(results[0].compliant);
        assert!(results[0].percent_diff < 0.0);
        assert!(!results[1].compliant);
        assert_eq!(results[1].percent_diff, 0.0);
    }
}
