#![doc(test(attr(deny(warnings))))]

//! FuelEU Core computes well-to-wake GHG intensity and compliance balances
//! for vessel fuel records, and manages banking, pooling and baseline
//! comparison on top of them.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod seed;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing once; later calls are ignored.
pub fn init_with_filter(filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::info!("FuelEU core tracing initialized.");
    });
}
