//! Numerical core of Macenko stain-vector color deconvolution.
//!
//! * [`stain_math`] and [`sort`]: fixed-shape 3x3 / 3-vector kernel
//!   (inversion with a zero-matrix sentinel, row unitarization, zero-sum row
//!   repair, canonical stain ordering).
//! * [`sign_optimizer`]: resolves the sign ambiguity of PCA/SVD stain bases
//!   against a random sub-sample of OD pixels.
//! * [`color_deconvolution`]: applies a conditioned stain matrix to OD pixels.
//!
//! Optical-density conversion happens upstream; this crate only consumes its
//! floor through [`OdThreshold`].

pub mod color_deconvolution;
pub mod error;
pub mod float_trait;
pub mod matrix;
pub mod sign_optimizer;
pub mod sort;
pub mod stain_math;
pub mod threshold;
pub mod vector;

pub use color_deconvolution::{color_deconvolution, pixel_concentrations, reconstruct_od};
pub use error::{Result, StainError};
pub use float_trait::StainFloat;
pub use matrix::Matrix3;
pub use sign_optimizer::{BasisSignOptimizer, SignOptimizerOptions, SignStrategy, VectorDirection};
pub use sort::{sort_rows, SortOrder, SORT_PRECISION};
pub use stain_math::{
    complement_third_row, detect_zero_sum_rows, invert, multiply_matrix_vector, repair_zero_rows,
    repair_zero_rows_with, unitarize,
};
pub use threshold::{OdThreshold, DEFAULT_OD_MIN_VALUE};
pub use vector::Vector3;
