pub mod toml_config;

pub use toml_config::{ConfigOverrides, GuardConfig};

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// `command` stays a plain string so that an unknown command exits with 2 and
/// `--dry-run --force` with 1, instead of clap's own usage handling.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "compose-mount-guard")]
#[command(about = "Start or stop compose services that depend on a NAS mount")]
pub struct CliArgs {
    /// Command to execute: start or stop
    pub command: String,

    /// List involved containers without stopping them
    #[arg(long)]
    pub dry_run: bool,

    /// Act regardless of the mount state
    #[arg(long)]
    pub force: bool,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the mount point that gates start/stop
    #[arg(long)]
    pub mount_path: Option<String>,

    /// Override the directory scanned for compose files
    #[arg(long)]
    pub compose_root: Option<String>,

    /// Override the compose file passed to the orchestrator
    #[arg(long)]
    pub master_file: Option<String>,

    /// Override the substring marking NAS-backed volumes
    #[arg(long)]
    pub marker: Option<String>,

    /// Override the orchestrator binary
    #[arg(long)]
    pub orchestrator: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mount_path: self.mount_path.clone(),
            compose_root: self.compose_root.clone(),
            master_file: self.master_file.clone(),
            nas_marker: self.marker.clone(),
            orchestrator: self.orchestrator.clone(),
        }
    }
}
