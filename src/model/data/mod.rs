//! Labeled image datasets for the classifier.
//!
//! Purpose
//! -------
//! Provide a small, validated container for flattened images with integer
//! class labels, plus the loaders the training step draws from: raw `u8`
//! pixel buffers, IDX (MNIST) files, and a seeded synthetic generator.
//!
//! Key behaviors
//! -------------
//! - [`Dataset::new`] enforces non-emptiness, finite pixels in `[0, 1]`,
//!   matching row counts, and labels in `0..n_classes`.
//! - [`Dataset::from_raw_images`] applies the fixed preprocessing
//!   convention: flatten every `rows × cols` image row-major and rescale
//!   intensities by `1/255`.
//! - [`Dataset::synthetic`] draws a deterministic, class-separated toy set
//!   from a seed.
//!
//! Invariants & assumptions
//! ------------------------
//! - Once constructed, a `Dataset` is read-only; every downstream step
//!   (training, Hessian, expansion) sees the same examples in the same
//!   order.
//!
//! Conventions
//! -----------
//! - `inputs` is `N × input_dim`, one example per row.
//! - Labels are `usize` in `0..n_classes`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each validation failure, the `1/255` rescaling, and
//!   reproducibility of the synthetic generator under a fixed seed.
use crate::model::errors::{ModelError, ModelResult};
use ndarray::{Array2, ArrayView2, s};
use rand::{SeedableRng, rngs::StdRng, Rng};
use rand_distr::{Distribution, Normal};
use std::path::Path;

pub mod idx;

/// Spread of synthetic examples around their class mean.
const SYNTHETIC_NOISE_STD: f64 = 0.1;

/// Validated classification dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Array2<f64>,
    labels: Vec<usize>,
    n_classes: usize,
}

impl Dataset {
    /// Build a dataset from flattened inputs and labels.
    ///
    /// # Errors
    /// - [`ModelError::EmptyDataset`] when there are no rows or no columns.
    /// - [`ModelError::RowMismatch`] when `labels.len() != inputs.nrows()`.
    /// - [`ModelError::PixelOutOfRange`] for the first pixel outside `[0, 1]`.
    /// - [`ModelError::LabelOutOfRange`] for the first label `>= n_classes`.
    pub fn new(inputs: Array2<f64>, labels: Vec<usize>, n_classes: usize) -> ModelResult<Self> {
        if inputs.nrows() == 0 || inputs.ncols() == 0 || n_classes == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if inputs.nrows() != labels.len() {
            return Err(ModelError::RowMismatch { inputs: inputs.nrows(), labels: labels.len() });
        }
        for ((row, col), &value) in inputs.indexed_iter() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ModelError::PixelOutOfRange { row, col, value });
            }
        }
        if let Some(index) = labels.iter().position(|&l| l >= n_classes) {
            return Err(ModelError::LabelOutOfRange { index, label: labels[index], n_classes });
        }
        Ok(Self { inputs, labels, n_classes })
    }

    /// Flatten `n` images of `rows × cols` u8 pixels and rescale by `1/255`.
    ///
    /// # Errors
    /// - [`ModelError::InvalidIdx`] when `pixels.len() != n * rows * cols`.
    /// - Everything [`Dataset::new`] reports.
    pub fn from_raw_images(
        pixels: &[u8], n: usize, rows: usize, cols: usize, labels: Vec<usize>, n_classes: usize,
    ) -> ModelResult<Self> {
        let dim = idx::checked_product(&[rows, cols])?;
        let expected = idx::checked_product(&[n, dim])?;
        if pixels.len() != expected {
            return Err(ModelError::InvalidIdx {
                reason: format!(
                    "expected {n} × {rows} × {cols} = {expected} pixels, found {}",
                    pixels.len()
                ),
            });
        }
        let scaled: Vec<f64> = pixels.iter().map(|&p| f64::from(p) / 255.0).collect();
        let inputs = Array2::from_shape_vec((n, dim), scaled)
            .map_err(|e| ModelError::InvalidIdx { reason: e.to_string() })?;
        Self::new(inputs, labels, n_classes)
    }

    /// Load an IDX image file and its label file, keeping at most `limit`
    /// examples. Labels are assumed to span `0..10`.
    ///
    /// # Errors
    /// - [`ModelError::Io`] on read failures.
    /// - [`ModelError::InvalidIdx`] on malformed headers or count disagreement.
    pub fn from_idx_files(
        images: impl AsRef<Path>, labels: impl AsRef<Path>, limit: Option<usize>,
    ) -> ModelResult<Self> {
        let image_bytes = std::fs::read(images)?;
        let label_bytes = std::fs::read(labels)?;
        let imgs = idx::parse_idx_images(&image_bytes)?;
        let mut labs = idx::parse_idx_labels(&label_bytes)?;
        if imgs.count != labs.len() {
            return Err(ModelError::InvalidIdx {
                reason: format!("{} images but {} labels", imgs.count, labs.len()),
            });
        }
        let n = limit.map_or(imgs.count, |l| l.min(imgs.count));
        let end = idx::checked_product(&[n, imgs.rows, imgs.cols])?;
        labs.truncate(n);
        Self::from_raw_images(&imgs.pixels[..end], n, imgs.rows, imgs.cols, labs, 10)
    }

    /// Deterministic synthetic dataset.
    ///
    /// Each class gets a mean vector drawn uniformly from `[0.2, 0.8]`; each
    /// example is its class mean plus Gaussian noise, clamped to `[0, 1]`.
    /// Labels cycle through the classes so every class is represented once
    /// `n >= n_classes`.
    ///
    /// # Errors
    /// - [`ModelError::InvalidSynthetic`] when any size is zero.
    pub fn synthetic(n: usize, input_dim: usize, n_classes: usize, seed: u64) -> ModelResult<Self> {
        if n == 0 || input_dim == 0 || n_classes == 0 {
            return Err(ModelError::InvalidSynthetic {
                reason: "sample count, input dimension and class count must be positive",
            });
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let means = Array2::from_shape_simple_fn((n_classes, input_dim), || {
            rng.gen_range(0.2..0.8)
        });
        let noise = Normal::new(0.0, SYNTHETIC_NOISE_STD)
            .map_err(|_| ModelError::InvalidSynthetic { reason: "invalid noise scale" })?;
        let labels: Vec<usize> = (0..n).map(|i| i % n_classes).collect();
        let mut inputs = Array2::zeros((n, input_dim));
        for (i, mut row) in inputs.rows_mut().into_iter().enumerate() {
            let mean = means.row(labels[i]);
            for (x, &mu) in row.iter_mut().zip(mean.iter()) {
                *x = (mu + noise.sample(&mut rng)).clamp(0.0, 1.0);
            }
        }
        Self::new(inputs, labels, n_classes)
    }

    /// The first `n` examples (or all of them when `n >= len`).
    pub fn subset(&self, n: usize) -> ModelResult<Self> {
        let n = n.min(self.len());
        let inputs = self.inputs.slice(s![..n, ..]).to_owned();
        Self::new(inputs, self.labels[..n].to_vec(), self.n_classes)
    }

    pub fn inputs(&self) -> ArrayView2<'_, f64> {
        self.inputs.view()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn input_dim(&self) -> usize {
        self.inputs.ncols()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false` for a constructed dataset.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation in `Dataset::new`.
    // - Rescaling in `from_raw_images`.
    // - Seeded reproducibility and range of `synthetic`.
    // - Truncation in `subset`.
    //
    // They intentionally DO NOT cover:
    // - IDX header parsing (see `idx` tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure each construction invariant is enforced.
    //
    // Given
    // -----
    // - Pixel 1.5, label 3 with two classes, mismatched row counts.
    //
    // Expect
    // ------
    // - `PixelOutOfRange`, `LabelOutOfRange`, `RowMismatch` respectively.
    fn dataset_new_rejects_invalid_inputs() {
        assert!(matches!(
            Dataset::new(array![[0.0, 1.5]], vec![0], 2),
            Err(ModelError::PixelOutOfRange { row: 0, col: 1, .. })
        ));
        assert_eq!(
            Dataset::new(array![[0.0, 0.5]], vec![3], 2),
            Err(ModelError::LabelOutOfRange { index: 0, label: 3, n_classes: 2 })
        );
        assert_eq!(
            Dataset::new(array![[0.0], [1.0]], vec![0], 2),
            Err(ModelError::RowMismatch { inputs: 2, labels: 1 })
        );
        assert_eq!(
            Dataset::new(Array2::zeros((0, 3)), vec![], 2),
            Err(ModelError::EmptyDataset)
        );
    }

    #[test]
    // Purpose
    // -------
    // Check the 1/255 rescaling and row-major flattening of raw pixels.
    //
    // Given
    // -----
    // - Two 1 × 2 images with pixels [0, 255] and [51, 102].
    //
    // Expect
    // ------
    // - Rows [0, 1] and [0.2, 0.4].
    fn from_raw_images_rescales_to_unit_interval() {
        // Arrange
        let pixels = [0u8, 255, 51, 102];

        // Act
        let data = Dataset::from_raw_images(&pixels, 2, 1, 2, vec![0, 1], 2).expect("valid");

        // Assert
        assert_eq!(data.inputs(), array![[0.0, 1.0], [0.2, 0.4]]);
        assert_eq!(data.input_dim(), 2);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a header whose image count overflows `usize` is an error, not a panic.
    //
    // Given
    // -----
    // - `n = usize::MAX` images of 2 × 2 pixels.
    //
    // Expect
    // ------
    // - `ModelError::InvalidIdx`.
    fn from_raw_images_rejects_overflowing_shapes() {
        // Arrange
        let pixels = [0u8; 4];

        // Act
        let result = Dataset::from_raw_images(&pixels, usize::MAX, 2, 2, vec![0], 2);

        // Assert
        assert!(matches!(result, Err(ModelError::InvalidIdx { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Verify that the synthetic generator is reproducible and in range.
    //
    // Given
    // -----
    // - Two draws with seed 7 and one with seed 8.
    //
    // Expect
    // ------
    // - Same seed gives identical data, different seed differs, all pixels in
    //   [0, 1], labels cycle through the classes.
    fn synthetic_is_seeded_and_in_range() {
        // Arrange / Act
        let a = Dataset::synthetic(12, 5, 3, 7).expect("valid");
        let b = Dataset::synthetic(12, 5, 3, 7).expect("valid");
        let c = Dataset::synthetic(12, 5, 3, 8).expect("valid");

        // Assert
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.inputs().iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(&a.labels()[..4], &[0, 1, 2, 0]);
    }

    #[test]
    fn subset_keeps_leading_examples() {
        let data = Dataset::synthetic(10, 4, 2, 1).expect("valid");
        let sub = data.subset(3).expect("valid");
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.inputs(), data.inputs().slice(s![..3, ..]));
        assert_eq!(data.subset(50).expect("valid").len(), 10);
    }
}
