//! Element-wise activation functions, generic over [`Scalar`].
//!
//! `apply` and `derivative` both take the pre-activation `z`, so the reverse
//! pass can be written without storing post-activations separately.
use crate::autodiff::Scalar;
use crate::model::errors::ModelError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Tanh,
    Sigmoid,
    Softplus,
    /// Identity, used for the logit layer.
    Linear,
}

impl Activation {
    #[inline]
    pub fn apply<S: Scalar>(self, z: S) -> S {
        match self {
            Activation::Relu => z.relu(),
            Activation::Tanh => z.tanh(),
            Activation::Sigmoid => z.sigmoid(),
            Activation::Softplus => z.softplus(),
            Activation::Linear => z,
        }
    }

    /// `dσ/dz` evaluated at `z`. ReLU uses 0 at the kink.
    #[inline]
    pub fn derivative<S: Scalar>(self, z: S) -> S {
        match self {
            Activation::Relu => {
                if z.value() > 0.0 { S::one() } else { S::zero() }
            }
            Activation::Tanh => {
                let t = z.tanh();
                S::one() - t * t
            }
            Activation::Sigmoid => {
                let s = z.sigmoid();
                s * (S::one() - s)
            }
            Activation::Softplus => z.sigmoid(),
            Activation::Linear => S::one(),
        }
    }
}

impl FromStr for Activation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relu" => Ok(Activation::Relu),
            "tanh" => Ok(Activation::Tanh),
            "sigmoid" => Ok(Activation::Sigmoid),
            "softplus" => Ok(Activation::Softplus),
            "linear" => Ok(Activation::Linear),
            _ => Err(ModelError::InvalidArchitecture {
                reason: format!("unknown activation '{s}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::Dual;

    #[test]
    // Purpose
    // -------
    // Check every analytic derivative against forward-mode differentiation
    // of `apply`.
    //
    // Given
    // -----
    // - z = 0.3 and z = -1.2 seeded as dual variables.
    //
    // Expect
    // ------
    // - `derivative(z)` equals the tangent of `apply(z)` to 1e-14.
    fn analytic_derivatives_match_forward_mode() {
        let all = [
            Activation::Relu,
            Activation::Tanh,
            Activation::Sigmoid,
            Activation::Softplus,
            Activation::Linear,
        ];
        for act in all {
            for z0 in [0.3_f64, -1.2] {
                let z = Dual::<f64, 1>::variable(z0, 0);
                let tangent = act.apply(z).eps[0];
                assert!((act.derivative(z0) - tangent).abs() < 1e-14, "{act:?} at {z0}");
            }
        }
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("TanH".parse::<Activation>(), Ok(Activation::Tanh));
        assert!("gelu".parse::<Activation>().is_err());
    }
}
