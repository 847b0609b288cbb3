//! Safe core types for bridging a native vision library's matrices to a
//! managed host runtime.
//!
//! `cvmat-core` provides the foundational types (`Mat`, `InputArray`,
//! `ArrayDescriptor`, `Scalar`) consumed by the flat C-ABI surface in
//! `cvmat-sys`. There is no algorithmic content here: every operation is a
//! representation bridge — shape/channel translation, kind-checked
//! downcasts, descriptor rewrites — over the wrapped library's own types.
//!
//! # Shape convention
//!
//! The host runtime's array type treats channels as an ordinary trailing
//! dimension, while the native matrix tracks them separately. Everything
//! that reports a shape to the host therefore emits the native spatial
//! extents followed by one synthetic final entry equal to the channel
//! count. Host code indexes these positionally; the order is a hard
//! contract.

pub mod descriptor;
pub mod input_array;
pub mod mat;
pub mod scalar;
pub mod types;

pub use descriptor::ArrayDescriptor;
pub use input_array::InputArray;
pub use mat::Mat;
pub use scalar::Scalar;
pub use types::{InputArrayKind, MatDepth};

pub type Result<T> = std::result::Result<T, GlueError>;

/// Bridge failures. All are fatal to the current call: they indicate a
/// caller contract violation, never a transient condition, so nothing here
/// is retried or partially completed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GlueError {
    #[error("input array holds {got}, not {expected}")]
    KindMismatch {
        expected: InputArrayKind,
        got: InputArrayKind,
    },

    #[error("matrix grew to {required} dims but descriptor has {capacity} slots")]
    DimensionalityExceeded { required: usize, capacity: usize },

    #[error("index {index} out of range for matrix vector of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("bridge only supports 8-bit unsigned elements, got {0}")]
    UnsupportedDepth(MatDepth),
}
