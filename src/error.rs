use thiserror::Error;

/// Errors surfaced by plan construction, configuration, and validated entry points.
///
/// Rejected moves are not errors; they are reported through [`crate::MoveOutcome`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// The graph or plan cannot be built as requested (bad sizes, asymmetric
    /// adjacency, disconnected graph, too many districts).
    #[error("construction error: {0}")]
    Construction(String),

    /// Invalid optimizer or objective configuration, detected before any move runs.
    #[error("config error: {0}")]
    Config(String),

    /// A metric or operation names a weight series the graph does not carry.
    #[error("unknown weight series '{0}'")]
    UnknownSeries(String),

    /// A unit or district index outside the valid range.
    #[error("{what} {index} out of range [0, {bound})")]
    OutOfRange { what: &'static str, index: usize, bound: usize },

    /// The operation needs every unit assigned, but some are not.
    #[error("plan has unassigned units")]
    Unassigned,
}

pub type Result<T> = std::result::Result<T, PlanError>;
