//! Process lifecycle: OS shutdown signals and transient artifacts

mod artifacts;
mod shutdown;

pub use artifacts::ArtifactStore;
pub use shutdown::ShutdownSignal;
