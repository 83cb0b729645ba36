use fueleu_core::{
    core::services::{ComplianceService, IntensityService},
    domain::fuel::{FuelType, MJ_PER_TONNE},
    errors::FuelError,
};

const TARGET: f64 = 89.3368;

#[test]
fn energy_is_mass_times_lower_calorific_value() {
    for fuel in ["HFO", "MGO", "MDO", "MGO/MDO", "LNG"] {
        for mass in [0.0, 1.0, 2.5, 350.0, 1800.0, 12_345.678] {
            let result = IntensityService::compute_intensity(fuel, mass).unwrap();
            assert_eq!(result.energy_mj, mass * MJ_PER_TONNE, "{fuel} {mass}");
        }
    }
}

#[test]
fn reference_intensities() {
    let cases = [("HFO", 90.67), ("MGO", 85.37), ("LNG", 75.365)];
    for (fuel, expected) in cases {
        let intensity = IntensityService::compute_intensity(fuel, 1.0)
            .unwrap()
            .intensity;
        assert!(
            (intensity - expected).abs() < 0.01,
            "{fuel}: {intensity} != {expected}"
        );
    }
}

#[test]
fn reference_compliance_balances() {
    let cases = [("HFO", -0.054692), ("MGO", 0.1626), ("LNG", 0.5728)];
    for (fuel, expected) in cases {
        let cb = ComplianceService::compute_cb(fuel, 1.0, TARGET).unwrap();
        assert!(
            (cb.cb_tonnes.value() - expected).abs() < 1e-4,
            "{fuel}: {} != {expected}",
            cb.cb_tonnes
        );
        assert_eq!(cb.cb_tonnes, cb.cb_grams.to_tonnes());
    }
}

#[test]
fn fuel_labels_are_case_insensitive_and_share_the_mgo_family() {
    let mgo = IntensityService::compute_intensity("MGO", 1.0).unwrap();
    for label in ["mgo", " Mdo ", "MGO/MDO", "mgo/mdo"] {
        assert_eq!(IntensityService::compute_intensity(label, 1.0).unwrap(), mgo);
    }
    assert_eq!(FuelType::parse("hfo").unwrap(), FuelType::Hfo);
    assert_eq!(FuelType::parse("Lng").unwrap(), FuelType::Lng);
}

#[test]
fn unsupported_fuels_always_fail() {
    for label in ["Ammonia", "", "VLSFO", "H2"] {
        let err = ComplianceService::compute_cb(label, 1.0, TARGET).unwrap_err();
        assert_eq!(
            err,
            FuelError::UnsupportedFuelType {
                value: label.to_string()
            }
        );
        assert!(err.to_string().contains("HFO, MGO/MDO, LNG"));
    }
}

#[test]
fn repeated_computations_are_identical() {
    let first = ComplianceService::compute_cb("LNG", 1800.0, TARGET).unwrap();
    for _ in 0..5 {
        assert_eq!(ComplianceService::compute_cb("LNG", 1800.0, TARGET).unwrap(), first);
    }
}
