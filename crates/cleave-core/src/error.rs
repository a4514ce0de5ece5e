use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CleaveError {
    #[error("Degenerate plane: normal must be finite and non-zero")]
    DegeneratePlane,

    #[error("Inconsistent index: {index} is out of range for {vertex_count} vertices")]
    InconsistentIndex { index: u32, vertex_count: usize },

    #[error("Malformed index buffer: length {0} is not a multiple of 3")]
    MalformedIndexBuffer(usize),

    #[error("Malformed boundary: {reason}")]
    MalformedBoundary { reason: String },

    #[error("Triangulation error: {0}")]
    Triangulation(String),
}

impl CleaveError {
    pub fn malformed_boundary(reason: impl Into<String>) -> Self {
        Self::MalformedBoundary {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleaveError>;
