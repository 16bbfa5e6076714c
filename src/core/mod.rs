pub mod dispatcher;
pub mod engine;
pub mod scanner;

pub use crate::domain::model::{Command, Mode, NasDependentServices, Outcome, RunRequest, ServiceDescriptor};
pub use crate::domain::ports::{Confirmer, InvocationStatus, MountProbe, Orchestrator};
pub use crate::utils::error::Result;
