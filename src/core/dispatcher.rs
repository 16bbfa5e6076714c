use crate::domain::model::{Command, Mode, NasDependentServices, Outcome, RunRequest};
use crate::domain::ports::{Confirmer, MountProbe, Orchestrator};
use crate::utils::error::Result;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

pub const FORCE_START_PROMPT: &str = "Are you sure you want to start all containers? (y/N) ";

/// Decides from the mount state whether a start/stop may run, then calls the
/// orchestrator once per service.
pub struct Dispatcher<M: MountProbe, O: Orchestrator, C: Confirmer> {
    mount: M,
    orchestrator: O,
    confirmer: C,
    mount_path: PathBuf,
}

impl<M: MountProbe, O: Orchestrator, C: Confirmer> Dispatcher<M, O, C> {
    pub fn new(mount: M, orchestrator: O, confirmer: C, mount_path: impl Into<PathBuf>) -> Self {
        Self {
            mount,
            orchestrator,
            confirmer,
            mount_path: mount_path.into(),
        }
    }

    /// Operator-facing text goes to `out`; diagnostics go through `tracing`.
    pub fn execute<W: Write>(
        &self,
        request: &RunRequest,
        services: &NasDependentServices,
        out: &mut W,
    ) -> Result<Outcome> {
        if request.mode == Mode::DryRun {
            return self.list(services, out);
        }

        let mount_active = self.mount.is_mount_active(&self.mount_path);
        tracing::info!(
            "📁 Mount {} is {}",
            self.mount_path.display(),
            if mount_active { "active" } else { "inactive" }
        );

        match request.command {
            Command::Stop => self.stop(request, mount_active, services, out),
            Command::Start => self.start(request, mount_active, services, out),
        }
    }

    fn list<W: Write>(&self, services: &NasDependentServices, out: &mut W) -> Result<Outcome> {
        writeln!(out, "Dry Run - Containers with NAS mount dependencies:")?;
        let unique: Vec<String> = services.unique().into_iter().map(str::to_string).collect();
        for name in &unique {
            writeln!(out, "{}", name)?;
        }
        Ok(Outcome::Listed { services: unique })
    }

    fn stop<W: Write>(
        &self,
        request: &RunRequest,
        mount_active: bool,
        services: &NasDependentServices,
        out: &mut W,
    ) -> Result<Outcome> {
        if request.is_forced() {
            writeln!(out, "Force mode enabled. Stopping all containers involved.")?;
        }

        if mount_active && !request.is_forced() {
            writeln!(out, "NAS mount is active, no containers stopped.")?;
            return Ok(Outcome::Skipped {
                command: Command::Stop,
            });
        }

        progress(out, format_args!("Stopping NAS dependent containers:"));
        self.dispatch(Command::Stop, services, out)
    }

    fn start<W: Write>(
        &self,
        request: &RunRequest,
        mount_active: bool,
        services: &NasDependentServices,
        out: &mut W,
    ) -> Result<Outcome> {
        if !mount_active && !request.is_forced() {
            writeln!(out, "NAS mount is not active, no containers started.")?;
            return Ok(Outcome::Skipped {
                command: Command::Start,
            });
        }

        if request.is_forced() {
            writeln!(
                out,
                "Force mode enabled. Starting all containers involved is a bad idea."
            )?;
            out.flush()?;

            let answer = self.confirmer.ask(FORCE_START_PROMPT)?;
            if !is_affirmative(&answer) {
                writeln!(out, "Operation cancelled.")?;
                tracing::info!("Forced start declined by operator");
                return Ok(Outcome::Cancelled);
            }
        }

        progress(out, format_args!("Starting NAS dependent containers:"));
        self.dispatch(Command::Start, services, out)
    }

    /// Every listed service, duplicates included, strictly in order. A failed
    /// invocation or progress line is logged and the next service still runs.
    fn dispatch<W: Write>(
        &self,
        command: Command,
        services: &NasDependentServices,
        out: &mut W,
    ) -> Result<Outcome> {
        let duplicates = services.duplicates();
        if !duplicates.is_empty() {
            tracing::warn!(
                "⚠️ Services declared in more than one compose file will receive repeated {} calls: {}",
                command,
                duplicates.join(", ")
            );
        }

        let verb = match command {
            Command::Start => "Starting",
            Command::Stop => "Stopping",
        };

        let mut failed = 0;
        for service in services.names() {
            progress(out, format_args!("{} container: {}", verb, service));

            match self.orchestrator.invoke(command, service) {
                Ok(status) if status.success() => {
                    tracing::debug!("{} {} succeeded", command, service);
                }
                Ok(status) => {
                    failed += 1;
                    match status.code {
                        Some(code) => {
                            tracing::warn!("⚠️ {} {} exited with status {}", command, service, code)
                        }
                        None => tracing::warn!("⚠️ {} {} was terminated by a signal", command, service),
                    }
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!("⚠️ Failed to run {} for {}: {}", command, service, e);
                }
            }
        }

        let invoked = services.len();
        if failed > 0 {
            tracing::warn!("{} of {} {} invocations failed", failed, invoked, command);
        } else {
            tracing::info!("✅ {} invocations completed for {} services", command, invoked);
        }

        Ok(Outcome::Dispatched {
            command,
            invoked,
            failed,
        })
    }
}

/// Progress output during dispatch; a closed or full stdout must not keep the
/// remaining services from being invoked.
fn progress<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    let written = writeln!(out, "{}", line).and_then(|_| out.flush());
    if let Err(e) = written {
        tracing::warn!("⚠️ Cannot write progress output ({}): {}", line, e);
    }
}

/// Only a lone `y` or `Y` counts as consent.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
