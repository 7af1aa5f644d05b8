use crate::error::StainError;
use crate::float_trait::StainFloat;
use crate::vector::Vector3;
use ndarray::{Array2, ArrayView2};
use std::ops::{Index, IndexMut, Mul};

/// Row-major 3x3 matrix.
///
/// Read row-wise it is a set of three candidate stain vectors. Nothing about
/// orthogonality or unit rows is stored; callers should only rely on unit rows
/// right after [`unitarize`](crate::unitarize).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix3<F> {
    rows: [Vector3<F>; 3],
}

impl<F: StainFloat> Matrix3<F> {
    pub fn from_rows(rows: [Vector3<F>; 3]) -> Self {
        Self { rows }
    }

    /// Build from nine values in row-major order.
    pub fn from_flat(v: [F; 9]) -> Self {
        Self::from_rows([
            Vector3::new(v[0], v[1], v[2]),
            Vector3::new(v[3], v[4], v[5]),
            Vector3::new(v[6], v[7], v[8]),
        ])
    }

    pub fn zeros() -> Self {
        Self::from_rows([Vector3::zeros(); 3])
    }

    pub fn identity() -> Self {
        let (o, z) = (F::one(), F::zero());
        Self::from_flat([o, z, z, z, o, z, z, z, o])
    }

    #[inline]
    pub fn row(&self, i: usize) -> Vector3<F> {
        self.rows[i]
    }

    #[inline]
    pub fn rows(&self) -> &[Vector3<F>; 3] {
        &self.rows
    }

    pub fn set_row(&mut self, i: usize, row: Vector3<F>) {
        self.rows[i] = row;
    }

    pub fn to_flat(&self) -> [F; 9] {
        let mut out = [F::zero(); 9];
        for (x, v) in out.iter_mut().enumerate() {
            *v = self.rows[x / 3][x % 3];
        }
        out
    }

    pub fn transpose(&self) -> Self {
        let m = self;
        Self::from_flat([
            m[(0, 0)], m[(1, 0)], m[(2, 0)],
            m[(0, 1)], m[(1, 1)], m[(2, 1)],
            m[(0, 2)], m[(1, 2)], m[(2, 2)],
        ])
    }

    /// Determinant by cofactor expansion along the first row.
    pub fn determinant(&self) -> F {
        let [a, b, c] = self.rows[0].0;
        let [d, e, f] = self.rows[1].0;
        let [g, h, i] = self.rows[2].0;
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Exact all-zero test, used to recognise the inversion sentinel.
    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(|v| *v == F::zero()))
    }

    pub fn map_rows(&self, f: impl Fn(Vector3<F>) -> Vector3<F>) -> Self {
        Self::from_rows([f(self.rows[0]), f(self.rows[1]), f(self.rows[2])])
    }

    /// Copy into an owned `(3, 3)` host array.
    pub fn to_array2(&self) -> Array2<F> {
        Array2::from_shape_fn((3, 3), |(i, j)| self.rows[i][j])
    }
}

impl<F: StainFloat> TryFrom<ArrayView2<'_, F>> for Matrix3<F> {
    type Error = StainError;

    fn try_from(a: ArrayView2<'_, F>) -> Result<Self, Self::Error> {
        if a.nrows() != 3 {
            return Err(StainError::ShapeMismatch {
                what: "matrix rows",
                expected: 3,
                actual: a.nrows(),
            });
        }
        if a.ncols() != 3 {
            return Err(StainError::ShapeMismatch {
                what: "matrix columns",
                expected: 3,
                actual: a.ncols(),
            });
        }
        let mut m = Self::zeros();
        for ((i, j), v) in a.indexed_iter() {
            m[(i, j)] = *v;
        }
        Ok(m)
    }
}

impl<F> Index<(usize, usize)> for Matrix3<F> {
    type Output = F;

    fn index(&self, (i, j): (usize, usize)) -> &F {
        &self.rows[i][j]
    }
}

impl<F> IndexMut<(usize, usize)> for Matrix3<F> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut F {
        &mut self.rows[i][j]
    }
}

impl<F: StainFloat> Mul<Vector3<F>> for Matrix3<F> {
    type Output = Vector3<F>;

    fn mul(self, v: Vector3<F>) -> Vector3<F> {
        Vector3::new(self.rows[0].dot(&v), self.rows[1].dot(&v), self.rows[2].dot(&v))
    }
}

impl<F: StainFloat> Mul for Matrix3<F> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let t = rhs.transpose();
        self.map_rows(|r| Vector3::new(r.dot(&t.rows[0]), r.dot(&t.rows[1]), r.dot(&t.rows[2])))
    }
}
