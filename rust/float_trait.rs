use ndarray::LinalgScalar;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Supertrait combining all bounds needed by the stain-vector kernel and the
/// basis-sign optimizer.
///
/// Implemented for `f32` and `f64` only. `f64` is the reference precision;
/// `f32` is accepted so callers holding single-precision optical densities do
/// not have to upcast whole pixel matrices.
pub trait StainFloat:
    Float + FromPrimitive + LinalgScalar + Debug + Default + Send + Sync + 'static
{
}

impl StainFloat for f32 {}
impl StainFloat for f64 {}

/// Lift an `f64` constant into `F`.
#[inline]
pub(crate) fn lit<F: StainFloat>(v: f64) -> F {
    F::from_f64(v).unwrap_or_else(F::zero)
}
