pub mod banking_service;
pub mod comparison_service;
pub mod compliance_service;
pub mod intensity_service;
pub mod pooling_service;

pub use banking_service::BankingLedger;
pub use comparison_service::{percent_diff, ComparisonService};
pub use compliance_service::ComplianceService;
pub use intensity_service::IntensityService;
pub use pooling_service::PoolingService;
