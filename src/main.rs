//! Shopfront CLI

use std::io;

use anyhow::{Context, Result};
use shopfront::{catalog::Catalog, session::Session};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so they never interleave with the menu.
///
/// `RUST_LOG=shopfront=debug` shows every reservation and checkout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let catalog = Catalog::builtin().context("failed to build catalog")?;

    let stdin = io::stdin();
    let stdout = io::stdout();

    let mut session = Session::new(catalog, stdin.lock(), stdout.lock());

    session.run()?;

    Ok(())
}
