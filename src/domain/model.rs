use crate::utils::error::{GuardError, Result};
use std::collections::HashSet;
use std::fmt;

/// One service entry from a compose file that is not hidden behind a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub declared_volumes: Vec<String>,
}

impl ServiceDescriptor {
    pub fn depends_on_nas(&self, marker: &str) -> bool {
        self.declared_volumes.iter().any(|volume| volume.contains(marker))
    }
}

/// Service names that mount a NAS-backed volume, in scan order.
///
/// Names declared in several compose files appear once per file. Start and
/// stop iterate the full list; only dry-run output uses [`unique`].
///
/// [`unique`]: NasDependentServices::unique
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NasDependentServices {
    names: Vec<String>,
}

impl NasDependentServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend_from(&mut self, descriptors: &[ServiceDescriptor], marker: &str) {
        for descriptor in descriptors {
            if descriptor.depends_on_nas(marker) {
                self.names.push(descriptor.name.clone());
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// First-seen order, duplicates removed.
    pub fn unique(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.names
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Names that occur more than once, each reported once.
    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        self.names
            .iter()
            .filter(|name| !seen.insert(name.as_str()) && reported.insert(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl From<Vec<String>> for NasDependentServices {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            other => Err(GuardError::InvalidCommandError {
                command: other.to_string(),
            }),
        }
    }

    /// Subcommand passed to `<orchestrator> compose`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    DryRun,
    Force,
}

/// A validated invocation: a known command and at most one of dry-run/force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub command: Command,
    pub mode: Mode,
}

impl RunRequest {
    /// Flag conflict is checked before the command so that `--dry-run --force`
    /// always reports the conflict.
    pub fn parse(command: &str, dry_run: bool, force: bool) -> Result<Self> {
        if dry_run && force {
            return Err(GuardError::ConflictingFlagsError);
        }

        let command = Command::parse(command)?;
        let mode = match (dry_run, force) {
            (true, _) => Mode::DryRun,
            (_, true) => Mode::Force,
            _ => Mode::Normal,
        };

        Ok(Self { command, mode })
    }

    pub fn is_forced(&self) -> bool {
        self.mode == Mode::Force
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Dry-run: the unique service names that would be acted on.
    Listed { services: Vec<String> },
    /// The orchestrator was invoked once per listed service.
    Dispatched {
        command: Command,
        invoked: usize,
        failed: usize,
    },
    /// Mount state did not allow the command.
    Skipped { command: Command },
    /// The operator declined the forced start.
    Cancelled,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        0
    }
}
