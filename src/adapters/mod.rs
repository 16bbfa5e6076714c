// Adapters layer: concrete implementations of the domain ports (mount check, compose CLI, operator prompt).

pub mod docker;
pub mod mount;
pub mod prompt;

pub use docker::ComposeCli;
pub use mount::SystemMountProbe;
pub use prompt::StdinConfirmer;
