use crate::domain::{
    compliance::IntensityResult,
    fuel::{FuelType, GWP100_CH4, MJ_PER_TONNE},
};
use crate::errors::FuelError;

/// Well-to-wake GHG intensity using default emission pathways.
pub struct IntensityService;

impl IntensityService {
    /// Computes intensity (gCO2e/MJ) and energy (MJ) for `mass_tonnes` of fuel.
    pub fn compute_intensity(
        fuel_type: &str,
        mass_tonnes: f64,
    ) -> Result<IntensityResult, FuelError> {
        let fuel = FuelType::parse(fuel_type)?;
        Self::compute_for(fuel, mass_tonnes)
    }

    pub fn compute_for(fuel: FuelType, mass_tonnes: f64) -> Result<IntensityResult, FuelError> {
        if mass_tonnes < 0.0 || mass_tonnes.is_nan() {
            return Err(FuelError::NegativeMass { mass: mass_tonnes });
        }
        let energy_mj = mass_tonnes * MJ_PER_TONNE;
        let intensity = Self::intensity_of(fuel);
        tracing::debug!(fuel = %fuel, mass_tonnes, intensity, energy_mj, "computed intensity");
        Ok(IntensityResult {
            intensity,
            energy_mj,
        })
    }

    /// Mass-independent well-to-wake intensity of a fuel family.
    pub fn intensity_of(fuel: FuelType) -> f64 {
        let factors = fuel.factors();
        // N2O is zero for every default pathway.
        let methane = factors.methane_slip * GWP100_CH4;
        factors.well_to_tank + factors.tank_to_wake_co2 + methane
    }
}
