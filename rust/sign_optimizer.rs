//! Sign selection for eigen/SVD-derived stain bases.
//!
//! A principal direction is only defined up to sign. Projecting a random
//! sub-sample of the source optical densities onto the candidate basis tells
//! which sign puts the bulk of the pixels on the non-negative side, which is
//! where physical stain concentrations live.

use crate::error::{Result, StainError};
use crate::float_trait::StainFloat;
use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Which axis of the basis array holds the vectors. The output uses the same
/// layout as the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorDirection {
    #[default]
    ColumnVectors,
    RowVectors,
}

impl VectorDirection {
    fn axis(self) -> Axis {
        match self {
            VectorDirection::ColumnVectors => Axis(1),
            VectorDirection::RowVectors => Axis(0),
        }
    }
}

impl TryFrom<i32> for VectorDirection {
    type Error = StainError;

    fn try_from(code: i32) -> std::result::Result<Self, Self::Error> {
        match code {
            0 => Ok(VectorDirection::ColumnVectors),
            1 => Ok(VectorDirection::RowVectors),
            other => Err(StainError::InvalidDirection(other)),
        }
    }
}

/// How sign combinations are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignStrategy {
    /// Try all `2^k` sign combinations and keep the one with the most pixels
    /// whose projections are all non-negative.
    #[default]
    Joint,
    /// Decide each vector on its own: flip it when strictly more projections
    /// are negative than positive. Zero projections count for both signs.
    Independent,
}

/// Options for [`BasisSignOptimizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignOptimizerOptions {
    /// Size of the random sub-sample projected onto the basis.
    pub num_testing_pixels: usize,
    /// Seed of the optimizer's random stream.
    pub seed: u64,
    pub strategy: SignStrategy,
}

impl Default for SignOptimizerOptions {
    fn default() -> Self {
        Self {
            num_testing_pixels: 1000,
            seed: 5489,
            strategy: SignStrategy::Joint,
        }
    }
}

/// Owns a random stream and resolves basis sign ambiguity against pixel
/// samples.
///
/// Each call advances the same stream, so a given seed reproduces the whole
/// sequence of sub-samples. Not meant to be shared between threads without a
/// lock; give each worker its own instance.
#[derive(Debug, Clone)]
pub struct BasisSignOptimizer {
    rng: StdRng,
    num_testing_pixels: usize,
    strategy: SignStrategy,
}

impl Default for BasisSignOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl BasisSignOptimizer {
    pub fn new() -> Self {
        Self::with_options(&SignOptimizerOptions::default())
    }

    pub fn with_options(opts: &SignOptimizerOptions) -> Self {
        Self {
            rng: StdRng::seed_from_u64(opts.seed),
            num_testing_pixels: opts.num_testing_pixels,
            strategy: opts.strategy,
        }
    }

    pub fn num_testing_pixels(&self) -> usize {
        self.num_testing_pixels
    }

    /// Only affects later calls.
    pub fn set_num_testing_pixels(&mut self, n: usize) {
        self.num_testing_pixels = n;
    }

    pub fn strategy(&self) -> SignStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: SignStrategy) {
        self.strategy = strategy;
    }

    /// Pick `number_of_pixels` distinct rows of `source` uniformly at random,
    /// in selection order.
    ///
    /// When `number_of_pixels >= source.nrows()` every row is returned in its
    /// original order and the random stream is not advanced.
    pub fn create_pixel_subsample<F: StainFloat>(
        &mut self,
        source: ArrayView2<'_, F>,
        number_of_pixels: usize,
    ) -> Array2<F> {
        let total = source.nrows();
        if number_of_pixels >= total {
            trace!(total, requested = number_of_pixels, "subsample covers all rows");
            return source.to_owned();
        }
        let picked = index::sample(&mut self.rng, total, number_of_pixels).into_vec();
        source.select(Axis(0), &picked)
    }

    /// Return `input_vectors` with each basis vector negated where that puts
    /// more projected sample pixels in the non-negative orthant.
    ///
    /// `source_pixels` is `N x M`; `input_vectors` holds 2 or 3 vectors of
    /// length `M` laid out along `direction`.
    pub fn optimize_basis_vector_signs<F: StainFloat>(
        &mut self,
        source_pixels: ArrayView2<'_, F>,
        input_vectors: ArrayView2<'_, F>,
        direction: VectorDirection,
    ) -> Result<Array2<F>> {
        // Basis with one vector per row, whatever the input layout.
        let basis = match direction {
            VectorDirection::RowVectors => input_vectors,
            VectorDirection::ColumnVectors => input_vectors.reversed_axes(),
        };
        let k = basis.nrows();
        if !(2..=3).contains(&k) {
            return Err(StainError::InvalidVectorCount(k));
        }
        if basis.ncols() != source_pixels.ncols() {
            return Err(StainError::ShapeMismatch {
                what: "basis vector length",
                expected: source_pixels.ncols(),
                actual: basis.ncols(),
            });
        }
        if source_pixels.nrows() == 0 {
            return Err(StainError::NoSamples);
        }
        if self.num_testing_pixels == 0 {
            return Err(StainError::InvalidSampleCount);
        }

        let subsample = self.create_pixel_subsample(source_pixels, self.num_testing_pixels);
        let projections = subsample.dot(&basis.t());
        let flips = match self.strategy {
            SignStrategy::Joint => joint_flips(projections.view()),
            SignStrategy::Independent => independent_flips(projections.view()),
        };
        debug!(
            pixels = subsample.nrows(),
            ?flips,
            strategy = ?self.strategy,
            "basis vector signs chosen"
        );

        let mut out = input_vectors.to_owned();
        for (mut lane, flip) in out.axis_iter_mut(direction.axis()).zip(flips.iter()) {
            if *flip {
                lane.mapv_inplace(|v| -v);
            }
        }
        Ok(out)
    }
}

/// Number of rows of `proj` whose projections, after applying the flips in
/// `mask` (bit `j` set negates column `j`), are all non-negative.
fn orthant_count<F: StainFloat>(proj: ArrayView2<'_, F>, mask: usize) -> usize {
    proj.outer_iter()
        .filter(|row| {
            row.iter().enumerate().all(|(j, &p)| {
                let p = if mask & (1 << j) != 0 { -p } else { p };
                p >= F::zero()
            })
        })
        .count()
}

fn joint_flips<F: StainFloat>(proj: ArrayView2<'_, F>) -> Vec<bool> {
    let k = proj.ncols();
    // Mask 0 (no flips) is scored first and only a strictly better count
    // replaces it.
    let mut best = (0, orthant_count(proj, 0));
    for mask in 1..(1usize << k) {
        let count = orthant_count(proj, mask);
        if count > best.1 {
            best = (mask, count);
        }
    }
    (0..k).map(|j| best.0 & (1 << j) != 0).collect()
}

fn independent_flips<F: StainFloat>(proj: ArrayView2<'_, F>) -> Vec<bool> {
    proj.axis_iter(Axis(1))
        .map(|col| {
            let positive = col.iter().filter(|&&p| p > F::zero()).count();
            let negative = col.iter().filter(|&&p| p < F::zero()).count();
            negative > positive
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn seeded(seed: u64, n: usize) -> BasisSignOptimizer {
        BasisSignOptimizer::with_options(&SignOptimizerOptions {
            num_testing_pixels: n,
            seed,
            ..Default::default()
        })
    }

    fn numbered_rows(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f64)
    }

    #[test]
    fn default_options() {
        let opt = BasisSignOptimizer::new();
        assert_eq!(opt.num_testing_pixels(), 1000);
        assert_eq!(opt.strategy(), SignStrategy::Joint);
    }

    #[test]
    fn setter_changes_testing_pixels() {
        let mut opt = BasisSignOptimizer::new();
        opt.set_num_testing_pixels(25);
        assert_eq!(opt.num_testing_pixels(), 25);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: SignOptimizerOptions =
            serde_json::from_str(r#"{ "num_testing_pixels": 64, "strategy": "independent" }"#)
                .unwrap();
        assert_eq!(opts.num_testing_pixels, 64);
        assert_eq!(opts.seed, 5489);
        assert_eq!(opts.strategy, SignStrategy::Independent);
    }

    #[test]
    fn oversized_request_returns_every_row_in_order() {
        let src = numbered_rows(10);
        let mut opt = seeded(1, 0);
        let sub = opt.create_pixel_subsample(src.view(), 10);
        assert_eq!(sub, src);
        let sub = opt.create_pixel_subsample(src.view(), 50);
        assert_eq!(sub, src);
    }

    #[test]
    fn subsample_rows_are_distinct_source_rows() {
        let src = numbered_rows(200);
        let mut opt = seeded(7, 0);
        let sub = opt.create_pixel_subsample(src.view(), 40);
        assert_eq!(sub.dim(), (40, 3));
        let mut ids: Vec<usize> = sub
            .outer_iter()
            .map(|r| {
                let id = r[0] as usize / 3;
                assert_eq!(r, src.row(id));
                id
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 40);
    }

    #[test]
    fn same_seed_reproduces_the_sequence() {
        let src = numbered_rows(500);
        let mut a = seeded(42, 0);
        let mut b = seeded(42, 0);
        let first = a.create_pixel_subsample(src.view(), 20);
        assert_eq!(first, b.create_pixel_subsample(src.view(), 20));
        // The stream advances: a second draw differs from the first.
        let second = a.create_pixel_subsample(src.view(), 20);
        assert_ne!(first, second);
        assert_eq!(second, b.create_pixel_subsample(src.view(), 20));
    }

    #[test]
    fn flips_negated_column_vectors() {
        // Pixels concentrated along +x and +y.
        let src = array![
            [1.0, 0.1, 0.0],
            [0.9, 0.2, 0.0],
            [0.2, 1.0, 0.0],
            [0.1, 0.8, 0.0],
            [0.5, 0.5, 0.0],
        ];
        let basis = array![[-1.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
        let mut opt = seeded(3, 100);
        let out = opt
            .optimize_basis_vector_signs(src.view(), basis.view(), VectorDirection::ColumnVectors)
            .unwrap();
        assert_eq!(out, array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]);
    }

    #[test]
    fn flips_negated_row_vectors_independently() {
        let src = array![[1.0, 0.1, 0.3], [0.9, 0.2, 0.2], [0.2, 1.0, 0.1], [0.1, 0.8, 0.4]];
        let basis = array![[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]];
        let mut opt = seeded(3, 100);
        opt.set_strategy(SignStrategy::Independent);
        let out = opt
            .optimize_basis_vector_signs(src.view(), basis.view(), VectorDirection::RowVectors)
            .unwrap();
        assert_eq!(out, Array2::<f64>::eye(3));
    }

    #[test]
    fn independent_ignores_zero_projections() {
        // Projections onto x: 0, 0, -1. Negating maximizes the non-negative count.
        let src = array![[0.0, 1.0], [0.0, 2.0], [-1.0, 0.5]];
        let basis = array![[1.0, 0.0], [0.0, 1.0]];
        let mut opt = seeded(4, 10);
        opt.set_strategy(SignStrategy::Independent);
        let out = opt
            .optimize_basis_vector_signs(src.view(), basis.view(), VectorDirection::RowVectors)
            .unwrap();
        assert_eq!(out, array![[-1.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn all_zero_projections_keep_original_signs() {
        let src = array![[0.0, 0.0], [0.0, 0.0]];
        let basis = array![[-1.0, 0.5], [0.3, -2.0]];
        for strategy in [SignStrategy::Joint, SignStrategy::Independent] {
            let mut opt = seeded(9, 10);
            opt.set_strategy(strategy);
            let out = opt
                .optimize_basis_vector_signs(src.view(), basis.view(), VectorDirection::RowVectors)
                .unwrap();
            assert_eq!(out, basis);
        }
    }

    #[test]
    fn rejects_bad_vector_count() {
        let src = numbered_rows(4);
        let basis = Array2::<f64>::zeros((3, 4));
        let err = BasisSignOptimizer::new()
            .optimize_basis_vector_signs(src.view(), basis.view(), VectorDirection::ColumnVectors)
            .unwrap_err();
        assert!(matches!(err, StainError::InvalidVectorCount(4)));
    }

    #[test]
    fn rejects_mismatched_vector_length() {
        let src = numbered_rows(4);
        let basis = Array2::<f64>::zeros((2, 2));
        let err = BasisSignOptimizer::new()
            .optimize_basis_vector_signs(src.view(), basis.view(), VectorDirection::RowVectors)
            .unwrap_err();
        assert!(matches!(
            err,
            StainError::ShapeMismatch { expected: 3, actual: 2, .. }
        ));
    }

    #[test]
    fn rejects_empty_samples_and_zero_budget() {
        let basis = Array2::<f64>::eye(3);
        let empty = Array2::<f64>::zeros((0, 3));
        let err = BasisSignOptimizer::new()
            .optimize_basis_vector_signs(empty.view(), basis.view(), VectorDirection::RowVectors)
            .unwrap_err();
        assert!(matches!(err, StainError::NoSamples));

        let src = numbered_rows(5);
        let mut opt = seeded(0, 0);
        let err = opt
            .optimize_basis_vector_signs(src.view(), basis.view(), VectorDirection::RowVectors)
            .unwrap_err();
        assert!(matches!(err, StainError::InvalidSampleCount));
    }

    #[test]
    fn direction_codes() {
        assert_eq!(VectorDirection::try_from(1).unwrap(), VectorDirection::RowVectors);
        assert!(matches!(
            VectorDirection::try_from(-1),
            Err(StainError::InvalidDirection(-1))
        ));
    }
}
