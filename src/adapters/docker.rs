use crate::config::GuardConfig;
use crate::domain::model::Command;
use crate::domain::ports::{InvocationStatus, Orchestrator};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{self, Stdio};

/// `<binary> compose -f <master_file> <start|stop> <service>` with inherited stdio.
#[derive(Debug, Clone)]
pub struct ComposeCli {
    binary: String,
    master_file: PathBuf,
}

impl ComposeCli {
    pub fn new(binary: impl Into<String>, master_file: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            master_file: master_file.into(),
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(config.orchestrator_binary(), config.master_file())
    }

    pub fn master_file(&self) -> &Path {
        &self.master_file
    }

    /// Arguments after the binary name.
    pub fn args(&self, command: Command, service: &str) -> Vec<String> {
        vec![
            "compose".to_string(),
            "-f".to_string(),
            self.master_file.to_string_lossy().into_owned(),
            command.as_str().to_string(),
            service.to_string(),
        ]
    }
}

impl Orchestrator for ComposeCli {
    fn invoke(&self, command: Command, service: &str) -> io::Result<InvocationStatus> {
        let args = self.args(command, service);
        tracing::debug!("Running: {} {}", self.binary, args.join(" "));

        let status = process::Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(status.into())
    }
}
