//! Shared aliases and presentation traits for compliance primitives.

/// Reporting period, expressed as a calendar year.
pub type Period = i32;

/// Supplies a presentation-ready label for CLI output or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

impl Displayable for super::fuel::FuelRecord {
    fn display_label(&self) -> String {
        let fuel = self.fuel_type.as_deref().unwrap_or("-");
        let mass = self
            .fuel_consumption_tonnes
            .map(|value| format!("{value:.1} t"))
            .unwrap_or_else(|| "-".into());
        let baseline = if self.is_baseline { " [baseline]" } else { "" };
        format!("{} ({}) {} {}{}", self.code, self.period, fuel, mass, baseline)
    }
}

impl Displayable for super::ledger::LedgerEntry {
    fn display_label(&self) -> String {
        format!(
            "{} {} {} {}",
            self.recorded_at.format("%Y-%m-%d %H:%M"),
            self.kind,
            self.amount,
            self.entity_id
        )
    }
}
