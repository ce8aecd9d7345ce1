use thiserror::Error;

use crate::term_position::StreamGeometryError;

/// Errors that can occur while setting up flow control for a stream.
///
/// Steady-state operations never fail; every path through status message and
/// idle processing returns a valid limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowControlError {
    /// Stream geometry rejected at creation
    #[error("Stream geometry error: {0}")]
    Geometry(#[from] StreamGeometryError),

    /// Strategy name not found in the supplier table
    #[error("Unknown flow control strategy {name:?}. Valid strategies: \"unicast\", \"max\", \"min\", \"tagged\"")]
    UnknownStrategy { name: String },

    /// Tagged strategy selected without a receiver group
    #[error("Tagged flow control requires a receiver group tag. Configure one via GroupConfig or a \"tagged,g:<tag>\" descriptor")]
    MissingGroupTag,

    /// Group clause in a strategy descriptor could not be parsed
    #[error("Could not parse group clause {clause:?}. Expected \"g:<tag>\" or \"g:<tag>/<min group size>\"")]
    InvalidGroupClause { clause: String },
}
