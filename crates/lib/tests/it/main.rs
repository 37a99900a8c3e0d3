/*! Integration tests for datasets.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - macros: Tokenizing, tree building and evaluation of the macro language
 * - overlay: Override precedence along DSL reference chains
 * - resolver: Reference macros, caching and value rendering through the Resolver
 * - tree: Resolved tree building
 * - source: The in-memory data source and its persistence
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("datasets=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod macros;
mod overlay;
mod resolver;
mod source;
mod tree;
