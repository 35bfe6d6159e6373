//! Error taxonomy of the alias reconciler
use thiserror::Error;

/// Every failure class a run can abort with
#[derive(Debug, Error)]
pub enum AliasError {
    /// Missing or malformed command line input
    #[error("invalid input: {0}")]
    Input(String),

    /// The current IP or its interface could not be determined
    #[error("unable to discover {0}")]
    Discovery(String),

    /// The apihost annotation or an ingress could not be read from the cluster
    #[error("unable to read {0} from the cluster")]
    ClusterRead(String),

    /// A precondition for creating an alias is not met
    #[error("preflight check failed: {0}")]
    Preflight(String),

    /// A command changing the system failed
    #[error("command `{command}` failed: {stderr}")]
    Mutation {
        /// The command text
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// A read-only command failed while running in dry-run mode
    #[error("read-only command `{command}` failed, cannot continue without its data: {stderr}")]
    DryRunRead {
        /// The command text
        command: String,
        /// Captured standard error
        stderr: String,
    },
}
