use thiserror::Error;

use crate::gpu::{BufferKind, UniformKind};

/// Failures raised by graphics backends and propagated untouched by the overlay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphicsError {
    #[error("shader program `{label}` failed to compile: {reason}")]
    ProgramCompilation { label: String, reason: String },

    #[error("uniform `{name}` is not declared by program `{program}`")]
    UnknownUniform { program: String, name: String },

    #[error("uniform `{name}` expects {expected:?} but received {actual:?}")]
    UniformKindMismatch {
        name: String,
        expected: UniformKind,
        actual: UniformKind,
    },

    #[error("uniform block of program `{label}` needs {size} bytes, limit is {limit}")]
    UniformBlockTooLarge {
        label: String,
        size: usize,
        limit: usize,
    },

    #[error("upload of {len} bytes exceeds buffer capacity of {capacity} bytes")]
    BufferOverflow { len: usize, capacity: usize },

    #[error("draw call expected a {expected:?} buffer")]
    BufferKindMismatch { expected: BufferKind },

    #[error("draw call references {count} elements but the buffer holds {available}")]
    DrawOutOfRange { count: u32, available: u32 },

    #[error("backend error: {0}")]
    Backend(String),
}
