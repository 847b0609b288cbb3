//! InputArray — borrowing tagged union over the native "array-like input"
//! abstraction, with kind-checked extraction.

use crate::mat::Mat;
use crate::types::InputArrayKind;
use crate::{GlueError, Result};

/// A polymorphic input handle.
///
/// Wrapping borrows; the handle must not outlive the wrapped value. Only
/// three kinds are interpreted by the bridge (`Mat`, `MatVector`,
/// `BoolVector`); every other native kind travels through as an `Opaque`
/// tag with no payload the bridge understands.
#[derive(Debug)]
pub enum InputArray<'a> {
    None,
    Mat(&'a Mat),
    MatVector(&'a [Mat]),
    BoolVector(&'a [bool]),
    Opaque(InputArrayKind),
}

impl<'a> InputArray<'a> {
    /// Discriminant identifying the concrete kind currently held.
    pub fn kind(&self) -> InputArrayKind {
        match self {
            InputArray::None => InputArrayKind::None,
            InputArray::Mat(_) => InputArrayKind::Mat,
            InputArray::MatVector(_) => InputArrayKind::StdVectorMat,
            InputArray::BoolVector(_) => InputArrayKind::StdBoolVector,
            InputArray::Opaque(kind) => *kind,
        }
    }

    pub fn is_mat(&self) -> bool {
        self.kind() == InputArrayKind::Mat
    }

    pub fn is_mat_vector(&self) -> bool {
        self.kind() == InputArrayKind::StdVectorMat
    }

    pub fn is_bool_vector(&self) -> bool {
        self.kind() == InputArrayKind::StdBoolVector
    }

    fn mismatch(&self, expected: InputArrayKind) -> GlueError {
        GlueError::KindMismatch {
            expected,
            got: self.kind(),
        }
    }

    /// Copy out the held matrix, or fail with `KindMismatch`.
    pub fn to_mat(&self) -> Result<Mat> {
        match self {
            InputArray::Mat(m) => Ok((*m).clone()),
            _ => Err(self.mismatch(InputArrayKind::Mat)),
        }
    }

    /// Copy out the held matrix vector, or fail with `KindMismatch`.
    pub fn to_mat_vector(&self) -> Result<Vec<Mat>> {
        match self {
            InputArray::MatVector(mats) => Ok(mats.to_vec()),
            _ => Err(self.mismatch(InputArrayKind::StdVectorMat)),
        }
    }

    /// Element count of the held matrix vector.
    pub fn len(&self) -> Result<usize> {
        match self {
            InputArray::MatVector(mats) => Ok(mats.len()),
            _ => Err(self.mismatch(InputArrayKind::StdVectorMat)),
        }
    }

    /// Copy out one element of the held matrix vector, bounds-checked.
    pub fn mat_at(&self, index: usize) -> Result<Mat> {
        match self {
            InputArray::MatVector(mats) => match mats.get(index) {
                Some(m) => Ok(m.clone()),
                None => Err(GlueError::IndexOutOfRange {
                    index,
                    len: mats.len(),
                }),
            },
            _ => Err(self.mismatch(InputArrayKind::StdVectorMat)),
        }
    }
}
