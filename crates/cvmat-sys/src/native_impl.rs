//! Pure-Rust implementation of the `cvrs_*` C ABI functions.
//!
//! Each function delegates to the `cvmat-core` types, using opaque pointers
//! (Box<Mat>, Box<InputArray>, ...) cast through the zero-sized marker
//! types. Failing calls return null (or a non-`OK` status / −1) and store a
//! diagnostic string readable via `cvrs_last_error`.
//!
//! # Safety
//!
//! All functions in this module follow C ABI conventions: callers must pass
//! valid, non-null handles obtained from other `cvrs_*` functions. Handles
//! must be freed exactly once via the matching `cvrs_free_*` function.
//! Wrapper handles borrow their target and must be freed before it.

#![allow(clippy::missing_safety_doc)]

use std::cell::RefCell;
use std::ffi::CString;

use libc::{c_char, c_double, c_int, size_t};

use cvmat_core::descriptor::sync_descriptor;
use cvmat_core::{ArrayDescriptor, GlueError, InputArray, InputArrayKind, Mat, MatDepth, Scalar};

use crate::{
    cv_bigarray_t, cv_byte_vector_t, cv_depth_t, cv_input_array_t, cv_kind_t, cv_mat_t,
    cv_mat_vector_t, cv_scalar_t, cv_status_t,
};

// ── Pointer conversion helpers ──────────────────────────────────────────

fn box_mat(m: Mat) -> *mut cv_mat_t {
    Box::into_raw(Box::new(m)) as *mut cv_mat_t
}

unsafe fn ref_mat<'a>(p: *mut cv_mat_t) -> &'a Mat {
    unsafe { &*(p as *const Mat) }
}

unsafe fn mut_mat<'a>(p: *mut cv_mat_t) -> &'a mut Mat {
    unsafe { &mut *(p as *mut Mat) }
}

fn box_mat_vector(v: Vec<Mat>) -> *mut cv_mat_vector_t {
    Box::into_raw(Box::new(v)) as *mut cv_mat_vector_t
}

unsafe fn ref_mat_vector<'a>(p: *mut cv_mat_vector_t) -> &'a Vec<Mat> {
    unsafe { &*(p as *const Vec<Mat>) }
}

unsafe fn mut_mat_vector<'a>(p: *mut cv_mat_vector_t) -> &'a mut Vec<Mat> {
    unsafe { &mut *(p as *mut Vec<Mat>) }
}

fn box_input_array(arr: InputArray<'static>) -> *mut cv_input_array_t {
    Box::into_raw(Box::new(arr)) as *mut cv_input_array_t
}

unsafe fn ref_input_array<'a>(p: *mut cv_input_array_t) -> &'a InputArray<'static> {
    unsafe { &*(p as *const InputArray<'static>) }
}

unsafe fn ref_byte_vector<'a>(p: *mut cv_byte_vector_t) -> &'a Vec<u8> {
    unsafe { &*(p as *const Vec<u8>) }
}

unsafe fn ref_scalar<'a>(p: *mut cv_scalar_t) -> &'a Scalar {
    unsafe { &*(p as *const Scalar) }
}

// ── Error reporting ─────────────────────────────────────────────────────

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(err: &GlueError) {
    let msg = CString::new(err.to_string()).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(msg));
}

fn status_of(err: &GlueError) -> cv_status_t {
    match err {
        GlueError::KindMismatch { .. } => cv_status_t::KIND_MISMATCH,
        GlueError::DimensionalityExceeded { .. } => cv_status_t::DIMENSIONALITY_EXCEEDED,
        GlueError::IndexOutOfRange { .. } => cv_status_t::INDEX_OUT_OF_RANGE,
        GlueError::UnsupportedDepth(_) => cv_status_t::UNSUPPORTED_DEPTH,
    }
}

/// Diagnostic string for the most recent failing call on this thread, or
/// null if none has failed. Valid until this thread's next failing call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |msg| msg.as_ptr())
    })
}

// ── Enum translation ────────────────────────────────────────────────────

fn depth_to_abi(depth: MatDepth) -> cv_depth_t {
    match depth {
        MatDepth::U8 => cv_depth_t::U8,
        MatDepth::I8 => cv_depth_t::I8,
        MatDepth::U16 => cv_depth_t::U16,
        MatDepth::I16 => cv_depth_t::I16,
        MatDepth::I32 => cv_depth_t::I32,
        MatDepth::F32 => cv_depth_t::F32,
        MatDepth::F64 => cv_depth_t::F64,
    }
}

fn kind_to_abi(kind: InputArrayKind) -> cv_kind_t {
    match kind {
        InputArrayKind::None => cv_kind_t::NONE,
        InputArrayKind::Mat => cv_kind_t::MAT,
        InputArrayKind::Matx => cv_kind_t::MATX,
        InputArrayKind::StdVector => cv_kind_t::STD_VECTOR,
        InputArrayKind::StdVectorVector => cv_kind_t::STD_VECTOR_VECTOR,
        InputArrayKind::StdVectorMat => cv_kind_t::STD_VECTOR_MAT,
        InputArrayKind::Expr => cv_kind_t::EXPR,
        InputArrayKind::OpenGlBuffer => cv_kind_t::OPENGL_BUFFER,
        InputArrayKind::CudaHostMem => cv_kind_t::CUDA_HOST_MEM,
        InputArrayKind::CudaGpuMat => cv_kind_t::CUDA_GPU_MAT,
        InputArrayKind::UMat => cv_kind_t::UMAT,
        InputArrayKind::StdVectorUMat => cv_kind_t::STD_VECTOR_UMAT,
        InputArrayKind::StdBoolVector => cv_kind_t::STD_BOOL_VECTOR,
        InputArrayKind::StdVectorCudaGpuMat => cv_kind_t::STD_VECTOR_CUDA_GPU_MAT,
        InputArrayKind::StdArray => cv_kind_t::STD_ARRAY,
        InputArrayKind::StdArrayMat => cv_kind_t::STD_ARRAY_MAT,
        InputArrayKind::Unknown => cv_kind_t::UNKNOWN,
    }
}

// ── Matrix lifecycle & introspection ────────────────────────────────────

/// New empty matrix: 2-D with zero extents, 3 channels, 8-bit elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_create_mat() -> *mut cv_mat_t {
    box_mat(Mat::new())
}

/// Deep-copy `src`'s shape and contents into `dst`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_copy(src: *mut cv_mat_t, dst: *mut cv_mat_t) {
    let (src, dst) = unsafe { (ref_mat(src), mut_mat(dst)) };
    dst.copy_from(src);
}

/// Dimension count as the host sees it: native dims plus the channel axis.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_num_dims(mat: *mut cv_mat_t) -> c_int {
    let mat = unsafe { ref_mat(mat) };
    mat.foreign_ndim() as c_int
}

/// Freshly allocated host-order shape (`cvrs_mat_num_dims` entries);
/// release with `cvrs_free_dims`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_dims(mat: *mut cv_mat_t) -> *mut c_int {
    let mat = unsafe { ref_mat(mat) };
    let shape = mat.foreign_shape().into_boxed_slice();
    Box::into_raw(shape) as *mut c_int
}

/// Raw backing-buffer pointer; valid only while the mat is alive, never to
/// be freed by the caller.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_data(mat: *mut cv_mat_t) -> *mut u8 {
    let mat = unsafe { ref_mat(mat) };
    mat.data_ptr()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_depth(mat: *mut cv_mat_t) -> cv_depth_t {
    let mat = unsafe { ref_mat(mat) };
    depth_to_abi(mat.depth())
}

// ── Buffer bridge ───────────────────────────────────────────────────────

/// View a host buffer as a matrix. `dims[num_dims - 1]` is the channel
/// count, the rest are spatial extents; elements are 8-bit unsigned. The
/// matrix aliases `data` and never frees it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_of_bigarray(
    num_dims: c_int,
    dims: *const c_int,
    data: *mut u8,
) -> *mut cv_mat_t {
    let extents = unsafe { std::slice::from_raw_parts(dims, num_dims as usize) };
    match unsafe { Mat::from_foreign_parts(extents, data) } {
        Ok(m) => box_mat(m),
        Err(e) => {
            set_last_error(&e);
            std::ptr::null_mut()
        }
    }
}

/// Rewrite `desc` to alias `mat`'s current pointer and shape. Fails with
/// `DIMENSIONALITY_EXCEEDED` (leaving `desc` untouched) when the matrix
/// needs more dimension slots than `desc.capacity` — the record cannot be
/// grown from this side.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_sync_bigarray(
    mat: *mut cv_mat_t,
    desc: *mut cv_bigarray_t,
) -> cv_status_t {
    let mat = unsafe { ref_mat(mat) };
    let desc = unsafe { &mut *desc };
    let mut staged = ArrayDescriptor::with_capacity(desc.capacity as usize);
    match sync_descriptor(mat, &mut staged) {
        Ok(()) => {
            let slots =
                unsafe { std::slice::from_raw_parts_mut(desc.dim, desc.capacity as usize) };
            slots[..staged.ndim()].copy_from_slice(staged.dims());
            desc.num_dims = staged.ndim() as c_int;
            desc.data = staged.data_ptr();
            cv_status_t::OK
        }
        Err(e) => {
            set_last_error(&e);
            status_of(&e)
        }
    }
}

// ── Polymorphic input wrapper ───────────────────────────────────────────

/// Wrap a matrix. The handle borrows `mat` and must be freed before it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_inputarray_of_mat(mat: *mut cv_mat_t) -> *mut cv_input_array_t {
    let mat = unsafe { ref_mat(mat) };
    box_input_array(InputArray::Mat(mat))
}

/// Wrap a matrix vector. The handle borrows `vec` and must be freed before
/// it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_inputarray_of_mat_vector(
    vec: *mut cv_mat_vector_t,
) -> *mut cv_input_array_t {
    let mats = unsafe { ref_mat_vector(vec) };
    box_input_array(InputArray::MatVector(mats.as_slice()))
}

/// Copy out the wrapped matrix, or null + `KindMismatch`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_of_inputarray(arr: *mut cv_input_array_t) -> *mut cv_mat_t {
    let arr = unsafe { ref_input_array(arr) };
    match arr.to_mat() {
        Ok(m) => box_mat(m),
        Err(e) => {
            set_last_error(&e);
            std::ptr::null_mut()
        }
    }
}

/// Copy out the wrapped matrix vector, or null + `KindMismatch`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_vector_of_inputarray(
    arr: *mut cv_input_array_t,
) -> *mut cv_mat_vector_t {
    let arr = unsafe { ref_input_array(arr) };
    match arr.to_mat_vector() {
        Ok(v) => box_mat_vector(v),
        Err(e) => {
            set_last_error(&e);
            std::ptr::null_mut()
        }
    }
}

/// Discriminant of the wrapped value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_inputarray_kind(arr: *mut cv_input_array_t) -> cv_kind_t {
    let arr = unsafe { ref_input_array(arr) };
    kind_to_abi(arr.kind())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_inputarray_is_mat(arr: *mut cv_input_array_t) -> bool {
    let arr = unsafe { ref_input_array(arr) };
    arr.is_mat()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_inputarray_is_mat_vector(arr: *mut cv_input_array_t) -> bool {
    let arr = unsafe { ref_input_array(arr) };
    arr.is_mat_vector()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_inputarray_is_bool_vector(arr: *mut cv_input_array_t) -> bool {
    let arr = unsafe { ref_input_array(arr) };
    arr.is_bool_vector()
}

/// Element count of a wrapped matrix vector, or −1 + `KindMismatch`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_inputarray_length(arr: *mut cv_input_array_t) -> c_int {
    let arr = unsafe { ref_input_array(arr) };
    match arr.len() {
        Ok(n) => n as c_int,
        Err(e) => {
            set_last_error(&e);
            -1
        }
    }
}

/// Copy out one element of a wrapped matrix vector, bounds-checked; null +
/// `IndexOutOfRange` / `KindMismatch` on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_from_inputarray_at(
    arr: *mut cv_input_array_t,
    index: c_int,
) -> *mut cv_mat_t {
    let arr = unsafe { ref_input_array(arr) };
    let index = if index < 0 { usize::MAX } else { index as usize };
    match arr.mat_at(index) {
        Ok(m) => box_mat(m),
        Err(e) => {
            set_last_error(&e);
            std::ptr::null_mut()
        }
    }
}

// ── Matrix vectors ──────────────────────────────────────────────────────

/// New vector holding `len` empty matrices.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_create_mat_vector(len: size_t) -> *mut cv_mat_vector_t {
    box_mat_vector((0..len).map(|_| Mat::new()).collect())
}

/// Append a deep copy of `mat`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_mat_vector_push(vec: *mut cv_mat_vector_t, mat: *mut cv_mat_t) {
    let (vec, mat) = unsafe { (mut_mat_vector(vec), ref_mat(mat)) };
    vec.push(mat.clone());
}

// ── Byte vectors ────────────────────────────────────────────────────────

/// New byte vector of `len * item_size` bytes, each set to `fill`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_create_byte_vector(
    fill: u8,
    len: size_t,
    item_size: size_t,
) -> *mut cv_byte_vector_t {
    let v: Vec<u8> = vec![fill; len * item_size];
    Box::into_raw(Box::new(v)) as *mut cv_byte_vector_t
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_byte_vector_data(vec: *mut cv_byte_vector_t) -> *mut u8 {
    let vec = unsafe { ref_byte_vector(vec) };
    vec.as_ptr() as *mut u8
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_byte_vector_length(vec: *mut cv_byte_vector_t) -> c_int {
    let vec = unsafe { ref_byte_vector(vec) };
    vec.len() as c_int
}

// ── Scalar ──────────────────────────────────────────────────────────────

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_build_scalar(
    w: c_double,
    x: c_double,
    y: c_double,
    z: c_double,
) -> *mut cv_scalar_t {
    Box::into_raw(Box::new(Scalar::new(w, x, y, z))) as *mut cv_scalar_t
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_scalar_w(s: *mut cv_scalar_t) -> c_double {
    unsafe { ref_scalar(s) }.w()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_scalar_x(s: *mut cv_scalar_t) -> c_double {
    unsafe { ref_scalar(s) }.x()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_scalar_y(s: *mut cv_scalar_t) -> c_double {
    unsafe { ref_scalar(s) }.y()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_scalar_z(s: *mut cv_scalar_t) -> c_double {
    unsafe { ref_scalar(s) }.z()
}

// ── Lifecycle ───────────────────────────────────────────────────────────

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_free_mat(mat: *mut cv_mat_t) {
    if !mat.is_null() {
        unsafe {
            drop(Box::from_raw(mat as *mut Mat));
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_free_mat_vector(vec: *mut cv_mat_vector_t) {
    if !vec.is_null() {
        unsafe {
            drop(Box::from_raw(vec as *mut Vec<Mat>));
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_free_input_array(arr: *mut cv_input_array_t) {
    if !arr.is_null() {
        unsafe {
            drop(Box::from_raw(arr as *mut InputArray<'static>));
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_free_byte_vector(vec: *mut cv_byte_vector_t) {
    if !vec.is_null() {
        unsafe {
            drop(Box::from_raw(vec as *mut Vec<u8>));
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_free_scalar(s: *mut cv_scalar_t) {
    if !s.is_null() {
        unsafe {
            drop(Box::from_raw(s as *mut Scalar));
        }
    }
}

/// Release a shape list returned by `cvrs_mat_dims`. `len` must be the
/// value `cvrs_mat_num_dims` reported when the list was allocated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cvrs_free_dims(dims: *mut c_int, len: size_t) {
    if !dims.is_null() {
        unsafe {
            let slice = std::ptr::slice_from_raw_parts_mut(dims as *mut i32, len);
            drop(Box::from_raw(slice));
        }
    }
}
