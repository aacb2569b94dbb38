/*! Integration tests for replidoc.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - change: Tests for the change wire format and its validation
 * - document: Tests for local edits and reads through the public API
 * - path: Tests for path parsing and resolution errors
 * - persistence: Tests for save/load round trips and corrupt input
 * - store: Tests for the keyed document registry
 * - sync: Tests for convergence across replicas and exchange topologies
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("replidoc=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod document;
mod persistence;
mod store;
