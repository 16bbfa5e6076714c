use crate::domain::model::Command;
use std::io;
use std::path::Path;
use std::process::ExitStatus;

/// Answers whether a path is the root of a mounted filesystem.
pub trait MountProbe {
    fn is_mount_active(&self, path: &Path) -> bool;
}

/// Exit code of one orchestrator invocation; `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationStatus {
    pub code: Option<i32>,
}

impl InvocationStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for InvocationStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Runs one start/stop for a single compose service and waits for it.
pub trait Orchestrator {
    fn invoke(&self, command: Command, service: &str) -> io::Result<InvocationStatus>;
}

/// Shows a question to the operator and returns the raw answer line.
pub trait Confirmer {
    fn ask(&self, prompt: &str) -> io::Result<String>;
}
