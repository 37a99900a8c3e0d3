//! Store loading and resolver construction.

use std::sync::Arc;

use datasets::{InMemoryStore, Resolver, ResolverConfig};

use crate::cli::StoreArgs;

/// Load the store file and build a resolver configured from the arguments.
///
/// A missing store file yields an empty store.
pub fn open_resolver(args: &StoreArgs) -> Result<Resolver, Box<dyn std::error::Error>> {
    let store = InMemoryStore::load_from_file(&args.store)?;
    tracing::info!("Loaded store from {}", args.store.display());

    let mut config = ResolverConfig {
        inline_diagnostics: !args.quiet_errors,
        seed: args.seed,
        ..ResolverConfig::default()
    };
    if let Some(date_format) = &args.date_format {
        config.date_format = date_format.clone();
    }

    Ok(Resolver::new(Arc::new(store)).with_config(config))
}
