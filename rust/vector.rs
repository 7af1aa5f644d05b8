use crate::float_trait::StainFloat;
use std::ops::{Index, IndexMut, Neg};

/// A 3-component vector: an OD color, or one row of a [`Matrix3`](crate::Matrix3).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3<F>(pub [F; 3]);

impl<F: StainFloat> Vector3<F> {
    pub const fn new(x: F, y: F, z: F) -> Self {
        Self([x, y, z])
    }

    pub fn zeros() -> Self {
        Self([F::zero(); 3])
    }

    pub fn splat(v: F) -> Self {
        Self([v; 3])
    }

    /// Signed sum of the components.
    #[inline]
    pub fn sum(&self) -> F {
        self.0[0] + self.0[1] + self.0[2]
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> F {
        self.0[0] * other.0[0] + self.0[1] * other.0[1] + self.0[2] * other.0[2]
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> F {
        self.dot(self).sqrt()
    }

    /// Unit-norm copy, or `None` for the zero vector.
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if n == F::zero() {
            return None;
        }
        Some(self.map(|v| v / n))
    }

    pub fn cross(&self, other: &Self) -> Self {
        let (a, b) = (&self.0, &other.0);
        Self([
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ])
    }

    pub fn map(&self, f: impl Fn(F) -> F) -> Self {
        Self([f(self.0[0]), f(self.0[1]), f(self.0[2])])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, F> {
        self.0.iter()
    }
}

impl<F> From<[F; 3]> for Vector3<F> {
    fn from(v: [F; 3]) -> Self {
        Self(v)
    }
}

impl<F> From<Vector3<F>> for [F; 3] {
    fn from(v: Vector3<F>) -> Self {
        v.0
    }
}

impl<F> Index<usize> for Vector3<F> {
    type Output = F;

    fn index(&self, i: usize) -> &F {
        &self.0[i]
    }
}

impl<F> IndexMut<usize> for Vector3<F> {
    fn index_mut(&mut self, i: usize) -> &mut F {
        &mut self.0[i]
    }
}

impl<F: StainFloat> Neg for Vector3<F> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|v| -v)
    }
}
