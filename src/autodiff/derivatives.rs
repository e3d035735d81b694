//! autodiff::derivatives — Jacobians and nested higher-order derivative tensors.
//!
//! Purpose
//! -------
//! Turn the dual-number arithmetic of [`Dual`] into the two differentiation
//! operations the expansion needs:
//! - [`jacobian`]: the full Jacobian of a vector-valued map, one forward
//!   pass per input coordinate.
//! - [`derivative_tensors`]: value, gradient and the order-2, order-3 and
//!   order-4 derivative tensors of a scalar function of `N` coordinates,
//!   obtained from a single pass on four nested dual levels.
//!
//! Key behaviors
//! -------------
//! - Each nesting level is a separate differentiation context: level `j`
//!   seeds every coordinate with a unit tangent, and the derivative recorded
//!   at level `j` is taken of everything the inner levels computed. Reading
//!   `r.eps[a].eps[b].eps[c].eps[d]` therefore yields `∂⁴f/∂x_a∂x_b∂x_c∂x_d`.
//! - Tensors are returned as `ndarray::ArrayD<f64>` of shape `[N; k]` for
//!   order `k`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Functions handed to [`derivative_tensors`] must be generic over
//!   [`Scalar`] (see [`ScalarFn`]); closures cannot be, which is why a trait
//!   is used.
//! - The maximum derivative order equals the nesting depth (four). Higher
//!   orders need deeper nesting.
//! - Memory grows as `(N + 1)^4` scalars per intermediate value; intended for
//!   small `N` (two coordinates: 81 `f64` per value).
//!
//! Conventions
//! -----------
//! - Jacobian layout: `J[[i, j]] = ∂f_i / ∂x_j`.
//!
//! Testing notes
//! -------------
//! - Unit tests check tensors of polynomials with known derivatives,
//!   symmetry of the order-4 tensor, and Jacobians of linear maps.
use crate::autodiff::{
    dual::Dual,
    errors::{AutodiffError, AutodiffResult},
    scalar::Scalar,
};
use ndarray::{Array1, Array2, ArrayD, IxDyn};
use num_traits::Zero;

/// A scalar function of `N` coordinates, generic over the scalar type.
pub trait ScalarFn<const N: usize> {
    type Error;

    fn eval<S: Scalar>(&self, x: &[S; N]) -> Result<S, Self::Error>;
}

type Level1<const N: usize> = Dual<f64, N>;
type Level2<const N: usize> = Dual<Level1<N>, N>;
type Level3<const N: usize> = Dual<Level2<N>, N>;
type Level4<const N: usize> = Dual<Level3<N>, N>;

/// Value, gradient and derivative tensors of orders 2–4 at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeTensors {
    pub value: f64,
    pub gradient: Array1<f64>,
    pub t2: ArrayD<f64>,
    pub t3: ArrayD<f64>,
    pub t4: ArrayD<f64>,
}

impl DerivativeTensors {
    /// The derivative tensor of order `k` (1 returns the gradient as a rank-1
    /// tensor).
    pub fn order(&self, k: usize) -> AutodiffResult<ArrayD<f64>> {
        match k {
            1 => Ok(self.gradient.clone().into_dyn()),
            2 => Ok(self.t2.clone()),
            3 => Ok(self.t3.clone()),
            4 => Ok(self.t4.clone()),
            _ => Err(AutodiffError::OrderNotAvailable { order: k, max: 4 }),
        }
    }
}

/// derivative_tensors — nested forward-mode derivatives up to order four.
///
/// Parameters
/// ----------
/// - `f`: any [`ScalarFn<N>`].
/// - `x`: evaluation point.
///
/// Returns
/// -------
/// `Result<DerivativeTensors, F::Error>` with tensors of shapes `[N; 2]`,
/// `[N; 3]`, `[N; 4]`.
///
/// Errors
/// ------
/// - Propagates the error of `f.eval`.
/// - Non-finite entries are reported as [`AutodiffError::NonFiniteDerivative`]
///   converted into `F::Error`.
pub fn derivative_tensors<F, const N: usize>(
    f: &F, x: &[f64; N],
) -> Result<DerivativeTensors, F::Error>
where
    F: ScalarFn<N>,
    F::Error: From<AutodiffError>,
{
    let mut seeded = [<Level4<N> as Zero>::zero(); N];
    for (k, slot) in seeded.iter_mut().enumerate() {
        let l1 = Level1::<N>::variable(x[k], k);
        let l2 = Level2::<N>::variable(l1, k);
        let l3 = Level3::<N>::variable(l2, k);
        *slot = Level4::<N>::variable(l3, k);
    }

    let r = f.eval(&seeded)?;

    let value = r.re.re.re.re;
    let gradient = Array1::from_shape_fn(N, |a| r.eps[a].re.re.re);
    let t2 = ArrayD::from_shape_fn(IxDyn(&[N, N]), |ix| r.eps[ix[0]].eps[ix[1]].re.re);
    let t3 =
        ArrayD::from_shape_fn(IxDyn(&[N, N, N]), |ix| r.eps[ix[0]].eps[ix[1]].eps[ix[2]].re);
    let t4 = ArrayD::from_shape_fn(IxDyn(&[N, N, N, N]), |ix| {
        r.eps[ix[0]].eps[ix[1]].eps[ix[2]].eps[ix[3]]
    });

    let out = DerivativeTensors { value, gradient, t2, t3, t4 };
    check_finite(&out)?;
    Ok(out)
}

/// jacobian — forward-mode Jacobian of a vector-valued map.
///
/// Runs one pass per input coordinate `j`, seeding `x_j` with a unit tangent,
/// and stores the tangents of the outputs as column `j`.
///
/// Errors
/// ------
/// - [`AutodiffError::EmptyInput`] when `x` is empty.
/// - [`AutodiffError::OutputDimChanged`] when passes disagree on output length.
/// - Any error returned by `f`.
pub fn jacobian<F, E>(f: F, x: &Array1<f64>) -> Result<Array2<f64>, E>
where
    F: Fn(&Array1<Dual<f64, 1>>) -> Result<Array1<Dual<f64, 1>>, E>,
    E: From<AutodiffError>,
{
    let dim = x.len();
    if dim == 0 {
        return Err(AutodiffError::EmptyInput.into());
    }
    let mut seeded: Array1<Dual<f64, 1>> = x.mapv(Dual::constant);
    let mut jac: Option<Array2<f64>> = None;
    for j in 0..dim {
        seeded[j] = Dual::variable(x[j], 0);
        let out = f(&seeded)?;
        seeded[j] = Dual::constant(x[j]);

        let jac = jac.get_or_insert_with(|| Array2::zeros((out.len(), dim)));
        if out.len() != jac.nrows() {
            return Err(AutodiffError::OutputDimChanged { expected: jac.nrows(), found: out.len() }
                .into());
        }
        for (i, o) in out.iter().enumerate() {
            jac[[i, j]] = o.eps[0];
        }
    }
    jac.ok_or_else(|| AutodiffError::EmptyInput.into())
}

// ---- Helper methods ----

fn check_finite(t: &DerivativeTensors) -> AutodiffResult<()> {
    if !t.value.is_finite() {
        return Err(AutodiffError::NonFiniteDerivative { order: 0, value: t.value });
    }
    let tensors: [(usize, ArrayD<f64>); 4] = [
        (1, t.gradient.clone().into_dyn()),
        (2, t.t2.clone()),
        (3, t.t3.clone()),
        (4, t.t4.clone()),
    ];
    for (order, tensor) in tensors.iter() {
        if let Some(&value) = tensor.iter().find(|v| !v.is_finite()) {
            return Err(AutodiffError::NonFiniteDerivative { order: *order, value });
        }
    }
    Ok(())
}
