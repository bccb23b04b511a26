// =============================================================================
// AVMo AI Service - Clap Module
// =============================================================================
//
// Project: ShaydZ AVMo - Virtual Mobile Device Platform
// Contributors: AVMo Development Team
// Version: 0.1.0
// License: MIT
//
// Description:
//   Command line interface of the AVMo AI service binary.
//
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Returns the current version of the crate with extra info if supplied
///
/// Set the environment variable `AVMO_VERSION_EXTRA` at build time to include
/// it in parenthesis after the SemVer version, e.g. a git commit hash.
pub fn version() -> String {
    let cargo_pkg_version = env!("CARGO_PKG_VERSION");

    match option_env!("AVMO_VERSION_EXTRA") {
        Some(x) => format!("{} ({})", cargo_pkg_version, x),
        None => cargo_pkg_version.to_owned(),
    }
}

/// AVMo AI Service - app recommendations and VM optimization analysis
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[clap(about, version, name = "avmo-ai")]
pub struct Args {
    /// Path to configuration file
    #[clap(short, long, env = "AVMO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter override, e.g. `debug` or `avmo_recommendation=trace`
    #[clap(short, long, global = true)]
    pub log_level: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Address to bind to
        #[clap(long)]
        address: Option<String>,

        /// Port to bind to
        #[clap(long)]
        port: Option<u16>,
    },

    /// Print the effective configuration as TOML and exit
    Config,
}

/// Parse commandline arguments into structured data
pub fn parse() -> Args {
    Args::parse()
}
