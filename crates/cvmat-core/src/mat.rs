//! Mat — handle to a native dense array, owned or viewing foreign memory.
//!
//! A `Mat` tracks its spatial extents and channel count separately, the way
//! the wrapped library does. The host runtime folds channels into the shape
//! as one extra trailing dimension, so everything host-facing goes through
//! `foreign_ndim()` / `foreign_shape()`.

use smallvec::SmallVec;

use crate::types::MatDepth;
use crate::{GlueError, Result};

/// Backing storage: either owned by this handle or a borrowed view over
/// memory the host runtime owns. A view is never freed from this side.
#[derive(Debug)]
enum MatData {
    Owned(Vec<u8>),
    View(*mut u8),
}

/// A dense matrix handle.
///
/// Invariant: the backing buffer holds exactly
/// `product(extents) * channels * depth.size_bytes()` bytes.
///
/// Not `Send`/`Sync`: mutation writes through shared pointers with no
/// internal locking, so cross-thread use of one handle needs external
/// synchronization by the caller.
#[derive(Debug)]
pub struct Mat {
    extents: SmallVec<[i32; 4]>,
    channels: i32,
    depth: MatDepth,
    data: MatData,
}

impl Mat {
    /// Create an empty matrix: 2-D with zero extents, 3 channels, 8-bit.
    ///
    /// Host-side arrays always carry at least two dimensions of their own.
    /// Starting at the native minimum (2) means a descriptor's dimension
    /// count can only ever grow during a sync, never shrink — shrinking a
    /// host descriptor is not possible from this side.
    pub fn new() -> Self {
        Mat {
            extents: SmallVec::from_slice(&[0, 0]),
            channels: 3,
            depth: MatDepth::U8,
            data: MatData::Owned(Vec::new()),
        }
    }

    /// Construct a non-owning view over a foreign buffer.
    ///
    /// Only `MatDepth::U8` is supported; any other depth fails with
    /// [`GlueError::UnsupportedDepth`]. The check sits where a full depth
    /// dispatch would go if the bridge ever grows one.
    ///
    /// # Safety
    ///
    /// `data` must point to at least `product(extents) * channels` bytes
    /// that stay valid and unmoved for the view's whole lifetime.
    pub unsafe fn view_over(
        extents: &[i32],
        channels: i32,
        depth: MatDepth,
        data: *mut u8,
    ) -> Result<Self> {
        if depth != MatDepth::U8 {
            return Err(GlueError::UnsupportedDepth(depth));
        }
        tracing::debug!(?extents, channels, %depth, "adopting foreign buffer as mat view");
        Ok(Mat {
            extents: SmallVec::from_slice(extents),
            channels,
            depth,
            data: MatData::View(data),
        })
    }

    /// Construct a view from a host-convention shape: the last extent is
    /// the channel count, the rest are spatial dimensions.
    ///
    /// # Safety
    ///
    /// Same contract as [`Mat::view_over`].
    pub unsafe fn from_foreign_parts(extents: &[i32], data: *mut u8) -> Result<Self> {
        let (channels, spatial) = match extents.split_last() {
            Some((c, rest)) => (*c, rest),
            None => (0, &[][..]),
        };
        unsafe { Mat::view_over(spatial, channels, MatDepth::U8, data) }
    }

    /// Deep-copy `src`'s shape and contents into `self`, reallocating the
    /// backing buffer. A view destination becomes owned. Always succeeds.
    pub fn copy_from(&mut self, src: &Mat) {
        self.extents = src.extents.clone();
        self.channels = src.channels;
        self.depth = src.depth;
        self.data = MatData::Owned(src.bytes().to_vec());
    }

    /// Native dimension count (channels not included).
    pub fn ndim(&self) -> usize {
        self.extents.len()
    }

    /// Native per-axis extents (channels not included).
    pub fn extents(&self) -> &[i32] {
        &self.extents
    }

    pub fn channels(&self) -> i32 {
        self.channels
    }

    pub fn depth(&self) -> MatDepth {
        self.depth
    }

    /// True when this handle views foreign-owned memory.
    pub fn is_view(&self) -> bool {
        matches!(self.data, MatData::View(_))
    }

    /// Dimension count as the host sees it: native dims plus the synthetic
    /// trailing channel axis.
    pub fn foreign_ndim(&self) -> usize {
        self.ndim() + 1
    }

    /// Shape as the host sees it: native extents followed by the channel
    /// count as the final entry. Host code indexes this positionally.
    pub fn foreign_shape(&self) -> Vec<i32> {
        let mut shape = Vec::with_capacity(self.foreign_ndim());
        shape.extend_from_slice(&self.extents);
        shape.push(self.channels);
        shape
    }

    /// Logical size of the backing buffer in bytes.
    pub fn byte_len(&self) -> usize {
        let elems: i64 = self.extents.iter().map(|&d| d as i64).product();
        elems as usize * self.channels as usize * self.depth.size_bytes()
    }

    /// Raw backing-buffer pointer. Valid only while this `Mat` is alive;
    /// must never be freed by the caller.
    pub fn data_ptr(&self) -> *mut u8 {
        match &self.data {
            MatData::Owned(buf) => buf.as_ptr() as *mut u8,
            MatData::View(ptr) => *ptr,
        }
    }

    /// Backing bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        match &self.data {
            MatData::Owned(buf) => buf,
            MatData::View(ptr) => {
                let len = self.byte_len();
                if len == 0 || ptr.is_null() {
                    &[]
                } else {
                    // Safety: upheld by the view_over contract.
                    unsafe { std::slice::from_raw_parts(*ptr, len) }
                }
            }
        }
    }
}

impl Default for Mat {
    fn default() -> Self {
        Mat::new()
    }
}

impl Clone for Mat {
    /// Cloning always deep-copies into an owned buffer, even from a view.
    fn clone(&self) -> Self {
        let mut out = Mat::new();
        out.copy_from(self);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_2d_3ch_u8() {
        let m = Mat::new();
        assert_eq!(m.ndim(), 2);
        assert_eq!(m.extents(), &[0, 0]);
        assert_eq!(m.channels(), 3);
        assert_eq!(m.depth(), MatDepth::U8);
        assert_eq!(m.byte_len(), 0);
        assert!(!m.is_view());
    }

    #[test]
    fn test_foreign_shape_appends_channels() {
        let mut buf = vec![0u8; 4 * 4 * 3];
        let m = unsafe { Mat::view_over(&[4, 4], 3, MatDepth::U8, buf.as_mut_ptr()) }.unwrap();
        assert_eq!(m.foreign_ndim(), m.ndim() + 1);
        assert_eq!(m.foreign_shape(), vec![4, 4, 3]);
    }

    #[test]
    fn test_view_does_not_copy() {
        let mut buf = vec![7u8; 2 * 3];
        let m = unsafe { Mat::view_over(&[2, 3], 1, MatDepth::U8, buf.as_mut_ptr()) }.unwrap();
        assert!(m.is_view());
        assert_eq!(m.data_ptr(), buf.as_mut_ptr());
        assert_eq!(m.bytes(), &buf[..]);
    }

    #[test]
    fn test_view_rejects_non_u8_depth() {
        let mut buf = vec![0u8; 16];
        let err = unsafe { Mat::view_over(&[2, 2], 1, MatDepth::F32, buf.as_mut_ptr()) };
        assert_eq!(err.unwrap_err(), GlueError::UnsupportedDepth(MatDepth::F32));
    }

    #[test]
    fn test_from_foreign_parts_splits_channels() {
        let mut buf = vec![0u8; 4 * 4 * 3];
        let m = unsafe { Mat::from_foreign_parts(&[4, 4, 3], buf.as_mut_ptr()) }.unwrap();
        assert_eq!(m.extents(), &[4, 4]);
        assert_eq!(m.channels(), 3);
        assert_eq!(m.foreign_shape(), vec![4, 4, 3]);
    }

    #[test]
    fn test_copy_from_matches_source() {
        let mut buf: Vec<u8> = (0..12).collect();
        let src = unsafe { Mat::view_over(&[2, 2], 3, MatDepth::U8, buf.as_mut_ptr()) }.unwrap();
        let mut dst = Mat::new();
        dst.copy_from(&src);
        assert_eq!(dst.foreign_shape(), src.foreign_shape());
        assert_eq!(dst.bytes(), src.bytes());
        assert!(!dst.is_view());
        assert_ne!(dst.data_ptr(), src.data_ptr());
    }

    #[test]
    fn test_clone_of_view_owns_its_data() {
        let mut buf = vec![9u8; 6];
        let src = unsafe { Mat::view_over(&[6], 1, MatDepth::U8, buf.as_mut_ptr()) }.unwrap();
        let copy = src.clone();
        assert!(!copy.is_view());
        assert_eq!(copy.bytes(), src.bytes());
    }
}
