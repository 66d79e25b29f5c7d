//! Complex sample type used by the complex correlation path.

/// Complex sample with `f64` real and imaginary parts.
pub type Complex = num_complex::Complex64;

/// Named complex operations used by the link simulator.
pub trait ComplexOps: Sized {
    fn add(self, other: Self) -> Self;

    /// Standard complex product `(ac - bd, ad + bc)`.
    fn multiply(self, other: Self) -> Self;

    fn conjugate(self) -> Self;

    /// Euclidean norm.
    fn magnitude(self) -> f64;

    /// Squared norm, avoids the square root for comparisons.
    fn squared_magnitude(self) -> f64;
}

impl ComplexOps for Complex {
    #[inline]
    fn add(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn multiply(self, other: Self) -> Self {
        self * other
    }

    #[inline]
    fn conjugate(self) -> Self {
        self.conj()
    }

    #[inline]
    fn magnitude(self) -> f64 {
        self.norm()
    }

    #[inline]
    fn squared_magnitude(self) -> f64 {
        self.norm_sqr()
    }
}
