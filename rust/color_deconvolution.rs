use crate::error::{Result, StainError};
use crate::float_trait::StainFloat;
use crate::matrix::Matrix3;
use crate::stain_math::{invert, multiply_matrix_vector};
use crate::threshold::OdThreshold;
use crate::vector::Vector3;
use ndarray::{Array2, ArrayView2};

/// Split OD pixels into per-stain concentrations.
///
/// `stains` holds one stain vector per row (W), so Beer-Lambert gives
/// `od = Wᵀ · c` and, one pixel per row,
///
/// ```text
/// C = OD · W⁻¹
/// ```
///
/// # Arguments
///
/// * `od_pixels` – `(N, 3)` optical densities.
/// * `stains`    – stain vectors as rows, typically unitarized and sorted.
///
/// # Returns
///
/// An `(N, 3)` array where column *i* is the concentration of stain *i*, or
/// [`StainError::SingularStainMatrix`] when `stains` cannot be inverted.
pub fn color_deconvolution<F: StainFloat>(
    od_pixels: ArrayView2<F>,
    stains: &Matrix3<F>,
    threshold: OdThreshold<F>,
) -> Result<Array2<F>> {
    check_three_channels(od_pixels.ncols(), "OD pixel channels")?;
    let w_inv = checked_inverse(stains, threshold)?;
    Ok(od_pixels.dot(&w_inv.to_array2()))
}

/// Concentrations for a single OD pixel.
pub fn pixel_concentrations<F: StainFloat>(
    od: &Vector3<F>,
    stains: &Matrix3<F>,
    threshold: OdThreshold<F>,
) -> Result<Vector3<F>> {
    let w_inv = checked_inverse(stains, threshold)?;
    Ok(multiply_matrix_vector(&w_inv.transpose(), od))
}

/// Rebuild OD pixels from concentrations: `OD = C · W`.
pub fn reconstruct_od<F: StainFloat>(
    concentrations: ArrayView2<F>,
    stains: &Matrix3<F>,
) -> Result<Array2<F>> {
    check_three_channels(concentrations.ncols(), "concentration channels")?;
    Ok(concentrations.dot(&stains.to_array2()))
}

fn checked_inverse<F: StainFloat>(
    stains: &Matrix3<F>,
    threshold: OdThreshold<F>,
) -> Result<Matrix3<F>> {
    let w_inv = invert(stains, threshold);
    if w_inv.is_zero() {
        return Err(StainError::SingularStainMatrix);
    }
    Ok(w_inv)
}

fn check_three_channels(actual: usize, what: &'static str) -> Result<()> {
    if actual != 3 {
        return Err(StainError::ShapeMismatch {
            what,
            expected: 3,
            actual,
        });
    }
    Ok(())
}
