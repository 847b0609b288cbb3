//! C ABI shim exposing native vision-library matrices to a managed host
//! runtime.
//!
//! With the default `native` feature, all `cvrs_*` functions are implemented
//! in pure Rust using the `cvmat-core` types. With the `cpp` feature, they
//! link against the external C++ glue shim over the real vision library,
//! built via cmake.
//!
//! Every allocating export is paired with a `cvrs_free_*` export; wrapper
//! handles borrow their target and must not outlive it. No function here is
//! safe to call concurrently on the same handle without external
//! synchronization.

#![allow(non_camel_case_types)]

use libc::c_int;

// libc types re-exported for cpp feature extern declarations.
#[cfg(feature = "cpp")]
use libc::{c_char, c_double, size_t};

// ── Opaque handle types ─────────────────────────────────────────────────

/// Opaque handle to a native matrix.
#[repr(C)]
pub struct cv_mat_t {
    _private: [u8; 0],
}

/// Opaque handle to a polymorphic input wrapper.
#[repr(C)]
pub struct cv_input_array_t {
    _private: [u8; 0],
}

/// Opaque handle to a variable-length vector of matrices.
#[repr(C)]
pub struct cv_mat_vector_t {
    _private: [u8; 0],
}

/// Opaque handle to a flat byte vector.
#[repr(C)]
pub struct cv_byte_vector_t {
    _private: [u8; 0],
}

/// Opaque handle to a 4-component scalar.
#[repr(C)]
pub struct cv_scalar_t {
    _private: [u8; 0],
}

// ── C enums ─────────────────────────────────────────────────────────────

/// Element depths reported across the ABI.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum cv_depth_t {
    U8 = 0,
    I8 = 1,
    U16 = 2,
    I16 = 3,
    I32 = 4,
    F32 = 5,
    F64 = 6,
}

/// Input-wrapper kind discriminants. `UNKNOWN` covers any native kind the
/// bridge does not recognize.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum cv_kind_t {
    NONE = 0,
    MAT = 1,
    MATX = 2,
    STD_VECTOR = 3,
    STD_VECTOR_VECTOR = 4,
    STD_VECTOR_MAT = 5,
    EXPR = 6,
    OPENGL_BUFFER = 7,
    CUDA_HOST_MEM = 8,
    CUDA_GPU_MAT = 9,
    UMAT = 10,
    STD_VECTOR_UMAT = 11,
    STD_BOOL_VECTOR = 12,
    STD_VECTOR_CUDA_GPU_MAT = 13,
    STD_ARRAY = 14,
    STD_ARRAY_MAT = 15,
    UNKNOWN = -1,
}

/// Call status. Anything other than `OK` also sets the thread-local message
/// read by `cvrs_last_error`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum cv_status_t {
    OK = 0,
    KIND_MISMATCH = 1,
    DIMENSIONALITY_EXCEEDED = 2,
    INDEX_OUT_OF_RANGE = 3,
    UNSUPPORTED_DEPTH = 4,
}

/// Host-side descriptor for a flat buffer. The host allocates `capacity`
/// dimension slots at `dim` when it creates the record; the bridge rewrites
/// `data`, `num_dims`, and the first `num_dims` slots during a sync and can
/// never grow the record.
#[repr(C)]
pub struct cv_bigarray_t {
    pub data: *mut u8,
    pub capacity: c_int,
    pub num_dims: c_int,
    pub dim: *mut i64,
}

// ── C++ FFI declarations (enabled with `cpp` feature) ───────────────────

#[cfg(feature = "cpp")]
extern "C" {
    pub fn cvrs_last_error() -> *const c_char;

    pub fn cvrs_create_mat() -> *mut cv_mat_t;
    pub fn cvrs_mat_copy(src: *mut cv_mat_t, dst: *mut cv_mat_t);
    pub fn cvrs_mat_num_dims(mat: *mut cv_mat_t) -> c_int;
    pub fn cvrs_mat_dims(mat: *mut cv_mat_t) -> *mut c_int;
    pub fn cvrs_mat_data(mat: *mut cv_mat_t) -> *mut u8;
    pub fn cvrs_mat_depth(mat: *mut cv_mat_t) -> cv_depth_t;

    pub fn cvrs_mat_of_bigarray(
        num_dims: c_int,
        dims: *const c_int,
        data: *mut u8,
    ) -> *mut cv_mat_t;
    pub fn cvrs_sync_bigarray(mat: *mut cv_mat_t, desc: *mut cv_bigarray_t) -> cv_status_t;

    pub fn cvrs_inputarray_of_mat(mat: *mut cv_mat_t) -> *mut cv_input_array_t;
    pub fn cvrs_inputarray_of_mat_vector(vec: *mut cv_mat_vector_t) -> *mut cv_input_array_t;
    pub fn cvrs_mat_of_inputarray(arr: *mut cv_input_array_t) -> *mut cv_mat_t;
    pub fn cvrs_mat_vector_of_inputarray(arr: *mut cv_input_array_t) -> *mut cv_mat_vector_t;
    pub fn cvrs_inputarray_kind(arr: *mut cv_input_array_t) -> cv_kind_t;
    pub fn cvrs_inputarray_is_mat(arr: *mut cv_input_array_t) -> bool;
    pub fn cvrs_inputarray_is_mat_vector(arr: *mut cv_input_array_t) -> bool;
    pub fn cvrs_inputarray_is_bool_vector(arr: *mut cv_input_array_t) -> bool;
    pub fn cvrs_inputarray_length(arr: *mut cv_input_array_t) -> c_int;
    pub fn cvrs_mat_from_inputarray_at(arr: *mut cv_input_array_t, index: c_int)
        -> *mut cv_mat_t;

    pub fn cvrs_create_mat_vector(len: size_t) -> *mut cv_mat_vector_t;
    pub fn cvrs_mat_vector_push(vec: *mut cv_mat_vector_t, mat: *mut cv_mat_t);

    pub fn cvrs_create_byte_vector(
        fill: u8,
        len: size_t,
        item_size: size_t,
    ) -> *mut cv_byte_vector_t;
    pub fn cvrs_byte_vector_data(vec: *mut cv_byte_vector_t) -> *mut u8;
    pub fn cvrs_byte_vector_length(vec: *mut cv_byte_vector_t) -> c_int;

    pub fn cvrs_build_scalar(w: c_double, x: c_double, y: c_double, z: c_double)
        -> *mut cv_scalar_t;
    pub fn cvrs_scalar_w(s: *mut cv_scalar_t) -> c_double;
    pub fn cvrs_scalar_x(s: *mut cv_scalar_t) -> c_double;
    pub fn cvrs_scalar_y(s: *mut cv_scalar_t) -> c_double;
    pub fn cvrs_scalar_z(s: *mut cv_scalar_t) -> c_double;

    pub fn cvrs_free_mat(mat: *mut cv_mat_t);
    pub fn cvrs_free_mat_vector(vec: *mut cv_mat_vector_t);
    pub fn cvrs_free_input_array(arr: *mut cv_input_array_t);
    pub fn cvrs_free_byte_vector(vec: *mut cv_byte_vector_t);
    pub fn cvrs_free_scalar(s: *mut cv_scalar_t);
    pub fn cvrs_free_dims(dims: *mut c_int, len: size_t);
}

// ── Pure-Rust native implementation (enabled with `native` feature) ─────

#[cfg(feature = "native")]
mod native_impl;

#[cfg(feature = "native")]
pub use native_impl::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    // Helper: build a mat viewing `buf` with the given host-order shape.
    unsafe fn make_view(shape: &[c_int], buf: &mut [u8]) -> *mut cv_mat_t {
        unsafe {
            let m = cvrs_mat_of_bigarray(shape.len() as c_int, shape.as_ptr(), buf.as_mut_ptr());
            assert!(!m.is_null());
            m
        }
    }

    // Helper: read a mat's host-facing shape via the ABI.
    unsafe fn read_dims(mat: *mut cv_mat_t) -> Vec<c_int> {
        unsafe {
            let n = cvrs_mat_num_dims(mat) as usize;
            let ptr = cvrs_mat_dims(mat);
            assert!(!ptr.is_null());
            let out = std::slice::from_raw_parts(ptr, n).to_vec();
            cvrs_free_dims(ptr, n);
            out
        }
    }

    unsafe fn last_error_text() -> String {
        unsafe {
            let p = cvrs_last_error();
            assert!(!p.is_null(), "no error message set");
            CStr::from_ptr(p).to_string_lossy().into_owned()
        }
    }

    // ── Matrix lifecycle ─────────────────────────────────────────────

    #[test]
    fn test_create_mat_is_empty_2d_3ch() {
        unsafe {
            let m = cvrs_create_mat();
            assert!(!m.is_null());
            assert_eq!(cvrs_mat_num_dims(m), 3);
            assert_eq!(read_dims(m), vec![0, 0, 3]);
            assert_eq!(cvrs_mat_depth(m), cv_depth_t::U8);
            cvrs_free_mat(m);
        }
    }

    #[test]
    fn test_mat_copy_replicates_shape_and_data() {
        unsafe {
            let mut buf: Vec<u8> = (0..48).collect();
            let src = make_view(&[4, 4, 3], &mut buf);
            let dst = cvrs_create_mat();
            cvrs_mat_copy(src, dst);
            assert_eq!(read_dims(dst), vec![4, 4, 3]);
            let copied = std::slice::from_raw_parts(cvrs_mat_data(dst), 48);
            assert_eq!(copied, &buf[..]);
            // Deep copy, not an alias.
            assert_ne!(cvrs_mat_data(dst), buf.as_mut_ptr());
            cvrs_free_mat(src);
            cvrs_free_mat(dst);
        }
    }

    // ── Buffer bridge ────────────────────────────────────────────────

    #[test]
    fn test_mat_of_bigarray_round_trip() {
        unsafe {
            let mut buf = vec![0u8; 4 * 4 * 3];
            let m = make_view(&[4, 4, 3], &mut buf);
            assert_eq!(read_dims(m), vec![4, 4, 3]);
            assert_eq!(cvrs_mat_data(m), buf.as_mut_ptr());
            cvrs_free_mat(m);
        }
    }

    #[test]
    fn test_sync_bigarray_exact_capacity() {
        unsafe {
            let mut buf = vec![0u8; 4 * 4 * 3];
            let m = make_view(&[4, 4, 3], &mut buf);
            let mut slots = [0i64; 3];
            let mut desc = cv_bigarray_t {
                data: ptr::null_mut(),
                capacity: 3,
                num_dims: 0,
                dim: slots.as_mut_ptr(),
            };
            assert_eq!(cvrs_sync_bigarray(m, &mut desc), cv_status_t::OK);
            assert_eq!(desc.num_dims, 3);
            assert_eq!(slots, [4, 4, 3]);
            assert_eq!(desc.data, buf.as_mut_ptr());
            cvrs_free_mat(m);
        }
    }

    #[test]
    fn test_sync_bigarray_capacity_exceeded() {
        unsafe {
            let mut buf = vec![0u8; 4 * 4 * 3];
            let m = make_view(&[4, 4, 3], &mut buf);
            let mut slots = [0i64; 2];
            let mut desc = cv_bigarray_t {
                data: ptr::null_mut(),
                capacity: 2,
                num_dims: 0,
                dim: slots.as_mut_ptr(),
            };
            assert_eq!(
                cvrs_sync_bigarray(m, &mut desc),
                cv_status_t::DIMENSIONALITY_EXCEEDED
            );
            // Record untouched on failure.
            assert_eq!(desc.num_dims, 0);
            assert!(desc.data.is_null());
            assert!(last_error_text().contains("descriptor"));
            cvrs_free_mat(m);
        }
    }

    // ── Input wrapper ────────────────────────────────────────────────

    #[test]
    fn test_inputarray_of_mat_kind_and_unwrap() {
        unsafe {
            let m = cvrs_create_mat();
            let arr = cvrs_inputarray_of_mat(m);
            assert_eq!(cvrs_inputarray_kind(arr), cv_kind_t::MAT);
            assert!(cvrs_inputarray_is_mat(arr));
            assert!(!cvrs_inputarray_is_mat_vector(arr));
            assert!(!cvrs_inputarray_is_bool_vector(arr));

            let out = cvrs_mat_of_inputarray(arr);
            assert!(!out.is_null());
            assert_eq!(read_dims(out), vec![0, 0, 3]);

            // Wrong-kind extraction fails explicitly.
            assert!(cvrs_mat_vector_of_inputarray(arr).is_null());
            assert!(last_error_text().contains("vector<mat>"));

            cvrs_free_mat(out);
            cvrs_free_input_array(arr);
            cvrs_free_mat(m);
        }
    }

    #[test]
    fn test_inputarray_of_empty_mat_vector() {
        unsafe {
            let vec = cvrs_create_mat_vector(0);
            let arr = cvrs_inputarray_of_mat_vector(vec);
            assert_eq!(cvrs_inputarray_kind(arr), cv_kind_t::STD_VECTOR_MAT);
            assert_eq!(cvrs_inputarray_length(arr), 0);
            assert!(cvrs_mat_from_inputarray_at(arr, 0).is_null());
            assert!(last_error_text().contains("out of range"));
            cvrs_free_input_array(arr);
            cvrs_free_mat_vector(vec);
        }
    }

    #[test]
    fn test_mat_vector_push_and_index() {
        unsafe {
            let mut buf = vec![5u8; 2 * 2 * 3];
            let m = make_view(&[2, 2, 3], &mut buf);
            let vec = cvrs_create_mat_vector(2);
            cvrs_mat_vector_push(vec, m);
            let arr = cvrs_inputarray_of_mat_vector(vec);
            assert_eq!(cvrs_inputarray_length(arr), 3);

            let elem = cvrs_mat_from_inputarray_at(arr, 2);
            assert!(!elem.is_null());
            assert_eq!(read_dims(elem), vec![2, 2, 3]);

            assert!(cvrs_mat_from_inputarray_at(arr, 3).is_null());

            cvrs_free_mat(elem);
            cvrs_free_input_array(arr);
            cvrs_free_mat_vector(vec);
            cvrs_free_mat(m);
        }
    }

    #[test]
    fn test_length_on_mat_kind_fails() {
        unsafe {
            let m = cvrs_create_mat();
            let arr = cvrs_inputarray_of_mat(m);
            assert_eq!(cvrs_inputarray_length(arr), -1);
            assert!(last_error_text().contains("vector<mat>"));
            cvrs_free_input_array(arr);
            cvrs_free_mat(m);
        }
    }

    // ── Byte vectors ─────────────────────────────────────────────────

    #[test]
    fn test_byte_vector_fill_and_length() {
        unsafe {
            let v = cvrs_create_byte_vector(0xAB, 4, 2);
            assert_eq!(cvrs_byte_vector_length(v), 8);
            let data = std::slice::from_raw_parts(cvrs_byte_vector_data(v), 8);
            assert!(data.iter().all(|&b| b == 0xAB));
            cvrs_free_byte_vector(v);
        }
    }

    // ── Scalar ───────────────────────────────────────────────────────

    #[test]
    fn test_scalar_positional_accessors() {
        unsafe {
            let s = cvrs_build_scalar(1.0, 2.0, 3.0, 4.0);
            assert_eq!(cvrs_scalar_w(s), 1.0);
            assert_eq!(cvrs_scalar_x(s), 2.0);
            assert_eq!(cvrs_scalar_y(s), 3.0);
            assert_eq!(cvrs_scalar_z(s), 4.0);
            cvrs_free_scalar(s);
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    #[test]
    fn test_free_functions_tolerate_null() {
        unsafe {
            cvrs_free_mat(ptr::null_mut());
            cvrs_free_mat_vector(ptr::null_mut());
            cvrs_free_input_array(ptr::null_mut());
            cvrs_free_byte_vector(ptr::null_mut());
            cvrs_free_scalar(ptr::null_mut());
            cvrs_free_dims(ptr::null_mut(), 0);
        }
    }
}
