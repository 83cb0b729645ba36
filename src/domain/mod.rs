pub mod common;
pub mod compliance;
pub mod fuel;
pub mod ledger;
pub mod pool;
pub mod units;

pub use common::{Displayable, Period};
pub use compliance::{AdjustedCb, ComparisonResult, ComplianceResult, IntensityResult};
pub use fuel::{EmissionFactors, FuelRecord, FuelType, RecordFilter, MJ_PER_TONNE, SUPPORTED_FUELS};
pub use ledger::{ApplyPolicy, BankingOutcome, EntryKind, LedgerEntry};
pub use pool::{PoolMember, PoolMemberInput, PoolRecord, PoolResult};
pub use units::{GramsCo2e, TonnesCo2e, GRAMS_PER_TONNE};
