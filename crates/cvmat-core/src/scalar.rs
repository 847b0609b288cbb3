//! Scalar — the library's 4-component double vector, read positionally.

/// Four ordered f64 components (w, x, y, z). Immutable after construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scalar([f64; 4]);

impl Scalar {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Scalar([w, x, y, z])
    }

    pub fn w(&self) -> f64 {
        self.0[0]
    }

    pub fn x(&self) -> f64 {
        self.0[1]
    }

    pub fn y(&self) -> f64 {
        self.0[2]
    }

    pub fn z(&self) -> f64 {
        self.0[3]
    }
}
