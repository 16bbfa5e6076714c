use crate::config::GuardConfig;
use crate::core::dispatcher::Dispatcher;
use crate::core::scanner::ComposeScanner;
use crate::domain::model::{Outcome, RunRequest};
use crate::domain::ports::{Confirmer, MountProbe, Orchestrator};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::io::Write;

/// Validate the request, discover services, then hand off to the dispatcher.
pub struct GuardEngine<M: MountProbe, O: Orchestrator, C: Confirmer> {
    config: GuardConfig,
    dispatcher: Dispatcher<M, O, C>,
}

impl<M: MountProbe, O: Orchestrator, C: Confirmer> GuardEngine<M, O, C> {
    pub fn new(config: GuardConfig, mount: M, orchestrator: O, confirmer: C) -> Self {
        let dispatcher = Dispatcher::new(mount, orchestrator, confirmer, config.mount_path());
        Self { config, dispatcher }
    }

    /// Parses the raw invocation first: a usage error returns before the
    /// compose tree is read or the mount is checked.
    pub fn run<W: Write>(
        &self,
        command: &str,
        dry_run: bool,
        force: bool,
        out: &mut W,
    ) -> Result<Outcome> {
        let request = RunRequest::parse(command, dry_run, force)?;
        self.run_request(&request, out)
    }

    pub fn run_request<W: Write>(&self, request: &RunRequest, out: &mut W) -> Result<Outcome> {
        tracing::debug!("Request: {:?}", request);
        self.config.validate()?;

        let scanner = ComposeScanner::from_config(&self.config);
        tracing::info!("🔍 Scanning {} for compose files", scanner.root().display());
        let services = scanner.scan()?;

        self.dispatcher.execute(request, &services, out)
    }
}

/// Exit code for a finished run: 0 for every outcome, the error's own code otherwise.
pub fn exit_code(result: &Result<Outcome>) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => e.exit_code(),
    }
}
