//! Core tag types: element depth and polymorphic-input kind.

/// Element depth of a matrix: the scalar type of one channel component.
///
/// Codes match the wrapped library's depth tags and are stable across the
/// ABI boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatDepth {
    U8 = 0,
    I8 = 1,
    U16 = 2,
    I16 = 3,
    I32 = 4,
    F32 = 5,
    F64 = 6,
}

impl MatDepth {
    /// Size in bytes of a single channel component.
    pub fn size_bytes(self) -> usize {
        match self {
            MatDepth::U8 | MatDepth::I8 => 1,
            MatDepth::U16 | MatDepth::I16 => 2,
            MatDepth::I32 | MatDepth::F32 => 4,
            MatDepth::F64 => 8,
        }
    }

    /// Stable integer code, as reported across the ABI.
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(MatDepth::U8),
            1 => Some(MatDepth::I8),
            2 => Some(MatDepth::U16),
            3 => Some(MatDepth::I16),
            4 => Some(MatDepth::I32),
            5 => Some(MatDepth::F32),
            6 => Some(MatDepth::F64),
            _ => None,
        }
    }
}

impl std::fmt::Display for MatDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatDepth::U8 => write!(f, "u8"),
            MatDepth::I8 => write!(f, "i8"),
            MatDepth::U16 => write!(f, "u16"),
            MatDepth::I16 => write!(f, "i16"),
            MatDepth::I32 => write!(f, "i32"),
            MatDepth::F32 => write!(f, "f32"),
            MatDepth::F64 => write!(f, "f64"),
        }
    }
}

/// Concrete kind currently held by a polymorphic input handle.
///
/// One variant per kind the wrapped library's input abstraction can carry.
/// The bridge only interprets `Mat`, `StdVectorMat`, and `StdBoolVector`;
/// the rest are opaque pass-through tags. Codes are the library's kind
/// flags with the flag shift removed, so host code sees small stable
/// integers; `Unknown` (−1) covers any code this mapping does not
/// recognize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputArrayKind {
    None = 0,
    Mat = 1,
    Matx = 2,
    StdVector = 3,
    StdVectorVector = 4,
    StdVectorMat = 5,
    Expr = 6,
    OpenGlBuffer = 7,
    CudaHostMem = 8,
    CudaGpuMat = 9,
    UMat = 10,
    StdVectorUMat = 11,
    StdBoolVector = 12,
    StdVectorCudaGpuMat = 13,
    StdArray = 14,
    StdArrayMat = 15,
    Unknown = -1,
}

impl InputArrayKind {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map a raw kind code to the enumeration, `Unknown` for anything
    /// unrecognized.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => InputArrayKind::None,
            1 => InputArrayKind::Mat,
            2 => InputArrayKind::Matx,
            3 => InputArrayKind::StdVector,
            4 => InputArrayKind::StdVectorVector,
            5 => InputArrayKind::StdVectorMat,
            6 => InputArrayKind::Expr,
            7 => InputArrayKind::OpenGlBuffer,
            8 => InputArrayKind::CudaHostMem,
            9 => InputArrayKind::CudaGpuMat,
            10 => InputArrayKind::UMat,
            11 => InputArrayKind::StdVectorUMat,
            12 => InputArrayKind::StdBoolVector,
            13 => InputArrayKind::StdVectorCudaGpuMat,
            14 => InputArrayKind::StdArray,
            15 => InputArrayKind::StdArrayMat,
            _ => InputArrayKind::Unknown,
        }
    }
}

impl std::fmt::Display for InputArrayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputArrayKind::None => "none",
            InputArrayKind::Mat => "mat",
            InputArrayKind::Matx => "matx",
            InputArrayKind::StdVector => "vector",
            InputArrayKind::StdVectorVector => "vector<vector>",
            InputArrayKind::StdVectorMat => "vector<mat>",
            InputArrayKind::Expr => "expr",
            InputArrayKind::OpenGlBuffer => "opengl-buffer",
            InputArrayKind::CudaHostMem => "cuda-host-mem",
            InputArrayKind::CudaGpuMat => "cuda-gpu-mat",
            InputArrayKind::UMat => "umat",
            InputArrayKind::StdVectorUMat => "vector<umat>",
            InputArrayKind::StdBoolVector => "vector<bool>",
            InputArrayKind::StdVectorCudaGpuMat => "vector<cuda-gpu-mat>",
            InputArrayKind::StdArray => "array",
            InputArrayKind::StdArrayMat => "array<mat>",
            InputArrayKind::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}
