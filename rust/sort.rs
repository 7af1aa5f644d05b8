//! Canonical ordering of stain vectors.

use crate::error::StainError;
use crate::float_trait::{lit, StainFloat};
use crate::matrix::Matrix3;
use crate::vector::Vector3;
use serde::{Deserialize, Serialize};

/// Component differences at or below this are treated as ties.
pub const SORT_PRECISION: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
    /// Produce no output at all.
    None,
}

impl TryFrom<i32> for SortOrder {
    type Error = StainError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SortOrder::Ascending),
            1 => Ok(SortOrder::Descending),
            2 => Ok(SortOrder::None),
            other => Err(StainError::InvalidSortOrder(other)),
        }
    }
}

/// A row whose component sum is within precision of zero carries no stain.
#[inline]
fn is_null<F: StainFloat>(v: &Vector3<F>) -> bool {
    v.sum().abs() < lit(SORT_PRECISION)
}

/// `a` goes before `b` in ascending order.
pub(crate) fn ascending_before<F: StainFloat>(a: &Vector3<F>, b: &Vector3<F>) -> bool {
    let prec = lit::<F>(SORT_PRECISION);
    if is_null(a) {
        return false;
    }
    if is_null(b) {
        return true;
    }
    if (a[0] - b[0]).abs() > prec {
        a[0] < b[0]
    } else if (a[1] - b[1]).abs() > prec {
        a[1] < b[1]
    } else {
        a[2] < b[2]
    }
}

/// `a` goes before `b` in descending order.
///
/// NOTE: the last tie-break is non-strict (`>=`), so a row compares as
/// "before" an identical row. This is not a strict weak ordering; it is kept
/// as-is and only ever driven through [`insertion_sort`], which tolerates it.
pub(crate) fn descending_before<F: StainFloat>(a: &Vector3<F>, b: &Vector3<F>) -> bool {
    let prec = lit::<F>(SORT_PRECISION);
    if is_null(a) {
        return false;
    }
    if is_null(b) {
        return true;
    }
    if (a[0] - b[0]).abs() > prec {
        a[0] > b[0]
    } else if (a[1] - b[1]).abs() > prec {
        a[1] > b[1]
    } else {
        a[2] >= b[2]
    }
}

fn insertion_sort<F: StainFloat>(
    rows: &mut [Vector3<F>; 3],
    before: impl Fn(&Vector3<F>, &Vector3<F>) -> bool,
) {
    for i in 1..rows.len() {
        let mut j = i;
        while j > 0 && before(&rows[j], &rows[j - 1]) {
            rows.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Reorder the rows of `m`. Null rows always end up last.
///
/// Returns `None` for [`SortOrder::None`]: no output is produced and the
/// caller keeps whatever it held before.
pub fn sort_rows<F: StainFloat>(m: &Matrix3<F>, order: SortOrder) -> Option<Matrix3<F>> {
    let mut rows = *m.rows();
    match order {
        SortOrder::Ascending => insertion_sort(&mut rows, ascending_before),
        SortOrder::Descending => insertion_sort(&mut rows, descending_before),
        SortOrder::None => return None,
    }
    Some(Matrix3::from_rows(rows))
}
