//! Errors raised by the aggregation engine.

use thiserror::Error;

/// Failures that abort a single recomputation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A column the operation references is not in the loaded table.
    #[error("required column '{column}' not found in the loaded table")]
    MissingColumn { column: String },
}
