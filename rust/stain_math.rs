//! Fixed-shape kernel over stain-vector matrices.
//!
//! Every function is pure and value-returning. Near-singular inputs are
//! handled by sentinels and repairs rather than errors: an uninvertible
//! matrix inverts to all zeros, and a row whose components cancel is swapped
//! for a known direction.

use crate::float_trait::StainFloat;
use crate::matrix::Matrix3;
use crate::threshold::OdThreshold;
use crate::vector::Vector3;
use tracing::{debug, trace};

/// Inverse of `m`, or the all-zero matrix when `|det(m)|` is below the OD
/// floor.
///
/// Check the result with [`Matrix3::is_zero`] before using it.
pub fn invert<F: StainFloat>(m: &Matrix3<F>, threshold: OdThreshold<F>) -> Matrix3<F> {
    let det = m.determinant();
    if det.abs() < threshold.od_min_value() {
        debug!(?det, "determinant below OD min value, returning zero matrix");
        return Matrix3::zeros();
    }

    // Rows of the cofactor matrix are the cross products of pairs of rows;
    // the inverse is its transpose over the determinant.
    let [r0, r1, r2] = *m.rows();
    let cofactors = Matrix3::from_rows([r1.cross(&r2), r2.cross(&r0), r0.cross(&r1)]);
    let inv_det = F::one() / det;
    cofactors.transpose().map_rows(|r| r.map(|v| v * inv_det))
}

/// `m · v`.
#[inline]
pub fn multiply_matrix_vector<F: StainFloat>(m: &Matrix3<F>, v: &Vector3<F>) -> Vector3<F> {
    *m * *v
}

/// Scale every row to unit norm, leaving rows shorter than ten times the OD
/// floor untouched.
pub fn unitarize<F: StainFloat>(m: &Matrix3<F>, threshold: OdThreshold<F>) -> Matrix3<F> {
    let floor = threshold.norm_floor();
    m.map_rows(|row| {
        let n = row.norm();
        if n < floor {
            trace!(?n, "row norm below floor, left unchanged");
            row
        } else {
            row.map(|v| v / n)
        }
    })
}

/// Flags rows whose signed sum is below the OD floor while the row itself is
/// not all zeros.
pub fn detect_zero_sum_rows<F: StainFloat>(
    m: &Matrix3<F>,
    threshold: OdThreshold<F>,
) -> [bool; 3] {
    let od_min = threshold.od_min_value();
    let rows = m.rows();
    std::array::from_fn(|i| rows[i].sum().abs() < od_min && rows[i].norm() > F::zero())
}

/// [`repair_zero_rows_with`] using the `(1, 1, 1)` direction.
pub fn repair_zero_rows<F: StainFloat>(m: &Matrix3<F>, threshold: OdThreshold<F>) -> Matrix3<F> {
    repair_zero_rows_with(m, threshold, Vector3::splat(F::one()))
}

/// Replace every row flagged by [`detect_zero_sum_rows`] with the normalized
/// `replacement`. All-zero rows stand for an absent stain and are kept.
///
/// A zero `replacement` has no direction and is substituted as-is.
pub fn repair_zero_rows_with<F: StainFloat>(
    m: &Matrix3<F>,
    threshold: OdThreshold<F>,
    replacement: Vector3<F>,
) -> Matrix3<F> {
    let unit = replacement.normalized().unwrap_or(replacement);
    let flags = detect_zero_sum_rows(m, threshold);
    let mut out = *m;
    for (i, _) in flags.iter().enumerate().filter(|(_, f)| **f) {
        debug!(row = i, "zero-sum stain vector replaced");
        out.set_row(i, unit);
    }
    out
}

/// Replace the third row with the normalized cross product of the first two.
///
/// Macenko estimation yields two stain vectors; the third is completed to be
/// orthogonal to both. Parallel inputs give an all-zero third row.
pub fn complement_third_row<F: StainFloat>(m: &Matrix3<F>) -> Matrix3<F> {
    let stain2 = m.row(0).cross(&m.row(1));
    let mut out = *m;
    out.set_row(2, stain2.normalized().unwrap_or_else(Vector3::zeros));
    out
}
