pub mod persistence;

use std::{env, path::PathBuf, sync::Once};

use dirs::home_dir;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIR_NAME: &str = ".fueleu";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const DATA_FILE: &str = "fueleu.json";

/// Default filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "fueleu_core=info";

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins over `filter`; `filter` wins over [`DEFAULT_LOG_FILTER`].
/// Only the first call has any effect.
pub fn init_tracing(filter: Option<&str>) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let directives = filter.unwrap_or(DEFAULT_LOG_FILTER);
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(directives))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        // Another subscriber may already be installed by the host application.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Application data directory: `$FUELEU_HOME`, else `~/.fueleu`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("FUELEU_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_DIR)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    config_dir_in(base).join(CONFIG_FILE)
}

/// Default location of the JSON dataset.
pub fn data_file_in(base: &std::path::Path) -> PathBuf {
    base.join(DATA_FILE)
}
