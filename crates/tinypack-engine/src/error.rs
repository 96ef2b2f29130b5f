//! Top-level error type

use thiserror::Error;

use crate::codegen::WriteError;
use crate::config::ConfigError;
use crate::module::ResolveError;

/// Errors that stop a bundle run
///
/// Problems with individual modules are not errors; they are reported as
/// [`Diagnostic`](crate::module::Diagnostic)s and the run continues.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Invalid or unreadable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Base directory could not be determined
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Artifact could not be written
    #[error(transparent)]
    Write(#[from] WriteError),
}
