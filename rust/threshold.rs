//! The externally owned "OD min value".
//!
//! Optical-density conversion clamps intensities away from zero before taking
//! a logarithm; the same floor is reused by the kernel to decide when a
//! determinant, row norm or row sum is effectively zero. The kernel never
//! changes it.

use crate::float_trait::{lit, StainFloat};
use serde::{Deserialize, Serialize};

/// Default OD floor used when the caller does not supply one.
pub const DEFAULT_OD_MIN_VALUE: f64 = 1e-6;

/// Read-only wrapper around the numeric-stability threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OdThreshold<F> {
    od_min: F,
}

impl<F: StainFloat> OdThreshold<F> {
    pub fn new(od_min: F) -> Self {
        Self { od_min: od_min.abs() }
    }

    #[inline]
    pub fn od_min_value(&self) -> F {
        self.od_min
    }

    /// Rows shorter than this are left alone by unitarization.
    #[inline]
    pub(crate) fn norm_floor(&self) -> F {
        lit::<F>(10.0) * self.od_min
    }
}

impl<F: StainFloat> Default for OdThreshold<F> {
    fn default() -> Self {
        Self::new(lit(DEFAULT_OD_MIN_VALUE))
    }
}
