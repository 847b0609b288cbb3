//! ArrayDescriptor — the host runtime's fixed-capacity shape record, and
//! the sync that keeps it aliased to a matrix after native code resized it.

use crate::mat::Mat;
use crate::{GlueError, Result};

/// Host-side descriptor for a flat numeric buffer: a data pointer plus a
/// dimension list whose slot count is fixed when the host allocates the
/// record. The bridge reads and rewrites an already-sized descriptor; it
/// can never grow one.
#[derive(Debug)]
pub struct ArrayDescriptor {
    capacity: usize,
    ndim: usize,
    dims: Vec<i64>,
    data: *mut u8,
}

impl ArrayDescriptor {
    /// A zeroed descriptor with `capacity` dimension slots.
    pub fn with_capacity(capacity: usize) -> Self {
        ArrayDescriptor {
            capacity,
            ndim: 0,
            dims: vec![0; capacity],
            data: std::ptr::null_mut(),
        }
    }

    /// Number of dimension slots, fixed at creation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Dimension count currently in use.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Extents currently in use (`ndim` entries).
    pub fn dims(&self) -> &[i64] {
        &self.dims[..self.ndim]
    }

    pub fn data_ptr(&self) -> *mut u8 {
        self.data
    }
}

/// Rewrite `desc` to alias `mat`'s current state: data pointer, dimension
/// count, and extents in host order (spatial extents, then channels).
///
/// Called after a native operation may have reshaped the matrix. Fails with
/// [`GlueError::DimensionalityExceeded`] when the matrix now needs more
/// dimension slots than the descriptor was allocated with; the descriptor
/// is left untouched in that case and is unusable for this matrix — the
/// host must surface the error, not truncate.
pub fn sync_descriptor(mat: &Mat, desc: &mut ArrayDescriptor) -> Result<()> {
    let required = mat.foreign_ndim();
    if required > desc.capacity {
        return Err(GlueError::DimensionalityExceeded {
            required,
            capacity: desc.capacity,
        });
    }
    tracing::debug!(required, capacity = desc.capacity, "rewriting descriptor to alias mat");
    desc.data = mat.data_ptr();
    desc.ndim = required;
    for (slot, &extent) in desc.dims.iter_mut().zip(mat.extents()) {
        *slot = extent as i64;
    }
    desc.dims[required - 1] = mat.channels() as i64;
    Ok(())
}
