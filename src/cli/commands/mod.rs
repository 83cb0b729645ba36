pub mod banking;
pub mod config;
pub mod pooling;
pub mod routes;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(routes::definitions())
        .chain(banking::definitions())
        .chain(pooling::definitions())
        .chain(config::definitions())
    {
        registry.register(entry);
    }
}
