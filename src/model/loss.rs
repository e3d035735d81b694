//! Softmax cross-entropy, generic over [`Scalar`].
//!
//! The log-sum-exp is shifted by the largest primal logit. The shift is a
//! constant, so it cancels exactly in every derivative order.
use crate::autodiff::Scalar;
use ndarray::{Array2, ArrayView2};

/// `ln Σ_j exp(z_j)` with a max shift.
pub fn log_sum_exp<S: Scalar>(logits: &[S]) -> S {
    let shift = logits.iter().map(|z| z.value()).fold(f64::NEG_INFINITY, f64::max);
    let c = S::from_f64(shift);
    let sum = logits.iter().fold(S::zero(), |acc, &z| acc + (z - c).exp());
    c + sum.ln()
}

/// Cross-entropy `-ln softmax(z)[label]` of one example.
pub fn cross_entropy<S: Scalar>(logits: &[S], label: usize) -> S {
    log_sum_exp(logits) - logits[label]
}

/// Softmax probabilities of one example.
pub fn softmax<S: Scalar>(logits: &[S]) -> Vec<S> {
    let lse = log_sum_exp(logits);
    logits.iter().map(|&z| (z - lse).exp()).collect()
}

/// Mean cross-entropy over the rows of an `N × classes` logit matrix.
pub fn mean_cross_entropy<S: Scalar>(logits: ArrayView2<'_, S>, labels: &[usize]) -> S {
    let n = logits.nrows();
    let total = logits
        .rows()
        .into_iter()
        .zip(labels.iter())
        .fold(S::zero(), |acc, (row, &label)| acc + cross_entropy(&row.to_vec(), label));
    total.scale(1.0 / n as f64)
}

/// `(softmax(z_i) − onehot(y_i)) / N` for every row: the gradient of
/// [`mean_cross_entropy`] with respect to the logits.
pub fn cross_entropy_delta<S: Scalar>(logits: ArrayView2<'_, S>, labels: &[usize]) -> Array2<S> {
    let (n, k) = logits.dim();
    let inv_n = 1.0 / n as f64;
    let mut delta = Array2::from_elem((n, k), S::zero());
    for (i, (row, &label)) in logits.rows().into_iter().zip(labels.iter()).enumerate() {
        let probs = softmax(&row.to_vec());
        for (j, p) in probs.into_iter().enumerate() {
            let target = if j == label { S::one() } else { S::zero() };
            delta[[i, j]] = (p - target).scale(inv_n);
        }
    }
    delta
}
