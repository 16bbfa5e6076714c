pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{ComposeCli, StdinConfirmer, SystemMountProbe};
pub use config::GuardConfig;
pub use crate::core::{dispatcher::Dispatcher, engine::GuardEngine, scanner::ComposeScanner};
pub use utils::error::{GuardError, Result};
