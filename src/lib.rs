pub mod commands;
pub mod core;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use crate::core::error::{JarJarError, JarJarResult};
pub use crate::core::package::{JarPackage, MemoryPackage, Package, PackageHandle};
pub use crate::core::resolver::{
    resolve_embedded_dependencies, resolve_with_settings, AggregatedResolutionFailure,
    ResolvedArtifact,
};
pub use crate::core::settings::ResolverSettings;

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "trace"
    } else {
        "info,jarjar_lib=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point of the `jarjar` binary.
pub fn run() -> ExitCode {
    let cli = commands::Cli::parse();
    init_logging(cli.verbose);

    tracing::debug!("jarjar {} starting", env!("CARGO_PKG_VERSION"));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match commands::execute(cli, &mut out) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(commands::EXIT_ENVIRONMENT)
        }
    }
}
