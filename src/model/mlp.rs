//! mlp — feed-forward classifier with exact `f64` backpropagation.
//!
//! Purpose
//! -------
//! Hold the classifier's architecture and weights, evaluate logits and the
//! mean cross-entropy loss on a [`Dataset`], and compute the exact gradient
//! with respect to every parameter for the trainer.
//!
//! Key behaviors
//! -------------
//! - [`Architecture::classifier`] chains dense layers
//!   `input → hidden… → classes`, with the chosen activation on hidden
//!   layers and identity logits.
//! - [`Mlp::init`] draws Glorot-uniform kernels from a seed; biases start at
//!   zero.
//! - [`Mlp::loss_and_gradient`] runs a forward pass that caches every
//!   pre-activation, then a reverse pass producing the flat gradient in
//!   [`ParamRegistry`] order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Kernels have shape `(fan_in, fan_out)` and act on row vectors:
//!   `z = a · W + b`.
//! - A constructed `Mlp` always matches its architecture; all mutation goes
//!   through shape-checked setters.
//!
//! Conventions
//! -----------
//! - Layers are numbered from 0; with two hidden layers, the second hidden
//!   layer's kernel is `dense_1/kernel`.
//! - The loss is the mean over examples, so gradients carry a `1/N` factor.
//!
//! Testing notes
//! -------------
//! - The analytic gradient is checked against central finite differences;
//!   `from_theta`/`to_theta` and block setters are checked for consistency.
use crate::model::{
    activation::Activation,
    data::Dataset,
    errors::{ModelError, ModelResult},
    loss::{cross_entropy_delta, mean_cross_entropy},
    params::{BlockId, BlockKind, ParamRegistry},
};
use ndarray::{Array1, Array2, ArrayView2, Axis, s};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// One dense layer's shape and activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseSpec {
    pub fan_in: usize,
    pub fan_out: usize,
    pub activation: Activation,
}

/// Validated chain of dense layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Architecture {
    layers: Vec<DenseSpec>,
}

impl Architecture {
    /// # Errors
    /// [`ModelError::InvalidArchitecture`] when the chain is empty, a width is
    /// zero, or consecutive widths do not match.
    pub fn new(layers: Vec<DenseSpec>) -> ModelResult<Self> {
        if layers.is_empty() {
            return Err(ModelError::InvalidArchitecture { reason: "no layers".to_string() });
        }
        for (l, spec) in layers.iter().enumerate() {
            if spec.fan_in == 0 || spec.fan_out == 0 {
                return Err(ModelError::InvalidArchitecture {
                    reason: format!("layer {l} has a zero width"),
                });
            }
        }
        for (l, pair) in layers.windows(2).enumerate() {
            if pair[0].fan_out != pair[1].fan_in {
                return Err(ModelError::InvalidArchitecture {
                    reason: format!(
                        "layer {l} outputs {} units but layer {} expects {}",
                        pair[0].fan_out,
                        l + 1,
                        pair[1].fan_in
                    ),
                });
            }
        }
        Ok(Self { layers })
    }

    /// `input_dim → hidden[0] → … → n_classes` with `activation` on the
    /// hidden layers and linear logits.
    pub fn classifier(
        input_dim: usize, hidden: &[usize], n_classes: usize, activation: Activation,
    ) -> ModelResult<Self> {
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(input_dim);
        widths.extend_from_slice(hidden);
        widths.push(n_classes);
        let last = widths.len() - 2;
        let layers = widths
            .windows(2)
            .enumerate()
            .map(|(l, w)| DenseSpec {
                fan_in: w[0],
                fan_out: w[1],
                activation: if l == last { Activation::Linear } else { activation },
            })
            .collect();
        Self::new(layers)
    }

    pub fn layers(&self) -> &[DenseSpec] {
        &self.layers
    }

    pub fn input_dim(&self) -> usize {
        self.layers[0].fan_in
    }

    pub fn n_classes(&self) -> usize {
        self.layers[self.layers.len() - 1].fan_out
    }

    pub fn registry(&self) -> ParamRegistry {
        let dims: Vec<(usize, usize)> = self.layers.iter().map(|s| (s.fan_in, s.fan_out)).collect();
        ParamRegistry::from_layer_dims(&dims)
    }
}

/// Weights of one dense layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    pub kernel: Array2<f64>,
    pub bias: Array1<f64>,
    pub activation: Activation,
}

/// Cached forward pass: `inputs[l]` enters layer `l`, `pre[l]` is its
/// pre-activation.
#[derive(Debug, Clone)]
pub struct ForwardCache {
    pub inputs: Vec<Array2<f64>>,
    pub pre: Vec<Array2<f64>>,
}

impl ForwardCache {
    /// Pre-activation of the final layer.
    pub fn logits(&self) -> ArrayView2<'_, f64> {
        self.pre[self.pre.len() - 1].view()
    }
}

/// Feed-forward classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    arch: Architecture,
    registry: ParamRegistry,
    layers: Vec<DenseLayer>,
}

impl Mlp {
    /// Glorot-uniform kernels `U(−√(6/(in+out)), √(6/(in+out)))`, zero biases.
    pub fn init(arch: &Architecture, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = arch
            .layers()
            .iter()
            .map(|spec| {
                let limit = (6.0 / (spec.fan_in + spec.fan_out) as f64).sqrt();
                let kernel = Array2::from_shape_simple_fn((spec.fan_in, spec.fan_out), || {
                    rng.gen_range(-limit..limit)
                });
                let bias = Array1::zeros(spec.fan_out);
                DenseLayer { kernel, bias, activation: spec.activation }
            })
            .collect();
        Self { arch: arch.clone(), registry: arch.registry(), layers }
    }

    /// Rebuild a classifier from a flat parameter vector.
    ///
    /// # Errors
    /// - [`ModelError::ParamLengthMismatch`] when `theta` has the wrong length.
    /// - [`ModelError::NonFiniteParameter`] for the first non-finite entry.
    pub fn from_theta(arch: &Architecture, theta: &Array1<f64>) -> ModelResult<Self> {
        let registry = arch.registry();
        if theta.len() != registry.total_len() {
            return Err(ModelError::ParamLengthMismatch {
                expected: registry.total_len(),
                actual: theta.len(),
            });
        }
        if let Some(index) = theta.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteParameter { index, value: theta[index] });
        }
        let mut layers = Vec::with_capacity(arch.layers().len());
        for (l, spec) in arch.layers().iter().enumerate() {
            let k = registry.get(BlockId::kernel(l))?;
            let b = registry.get(BlockId::bias(l))?;
            let kernel = Array2::from_shape_vec(k.shape, theta.slice(s![k.range()]).to_vec())
                .map_err(|_| ModelError::BlockShapeMismatch {
                    expected: k.shape,
                    found: (k.len(), 1),
                })?;
            let bias = theta.slice(s![b.range()]).to_owned();
            layers.push(DenseLayer { kernel, bias, activation: spec.activation });
        }
        Ok(Self { arch: arch.clone(), registry, layers })
    }

    /// Flatten all parameters in registry order.
    pub fn to_theta(&self) -> Array1<f64> {
        let mut theta = Vec::with_capacity(self.registry.total_len());
        for layer in &self.layers {
            theta.extend(layer.kernel.iter().copied());
            theta.extend(layer.bias.iter().copied());
        }
        Array1::from(theta)
    }

    /// Copy of one block; biases are returned as `(1, fan_out)`.
    pub fn block(&self, id: BlockId) -> ModelResult<Array2<f64>> {
        self.registry.get(id)?;
        let layer = &self.layers[id.layer];
        match id.kind {
            BlockKind::Kernel => Ok(layer.kernel.clone()),
            BlockKind::Bias => Ok(layer.bias.clone().insert_axis(Axis(0))),
        }
    }

    /// Overwrite one block.
    ///
    /// # Errors
    /// - [`ModelError::UnknownBlock`] for ids outside the architecture.
    /// - [`ModelError::BlockShapeMismatch`] when `value` has the wrong shape.
    pub fn set_block(&mut self, id: BlockId, value: &Array2<f64>) -> ModelResult<()> {
        let entry = self.registry.get(id)?;
        if value.dim() != entry.shape {
            return Err(ModelError::BlockShapeMismatch {
                expected: entry.shape,
                found: value.dim(),
            });
        }
        let layer = &mut self.layers[id.layer];
        match id.kind {
            BlockKind::Kernel => layer.kernel.assign(value),
            BlockKind::Bias => layer.bias.assign(&value.row(0)),
        }
        Ok(())
    }

    pub fn architecture(&self) -> &Architecture {
        &self.arch
    }

    pub fn registry(&self) -> &ParamRegistry {
        &self.registry
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Forward pass caching the input and pre-activation of every layer.
    ///
    /// # Errors
    /// [`ModelError::InputDimMismatch`] when `inputs` has the wrong width.
    pub fn forward(&self, inputs: ArrayView2<'_, f64>) -> ModelResult<ForwardCache> {
        if inputs.ncols() != self.arch.input_dim() {
            return Err(ModelError::InputDimMismatch {
                expected: self.arch.input_dim(),
                found: inputs.ncols(),
            });
        }
        let mut cache = ForwardCache {
            inputs: Vec::with_capacity(self.layers.len()),
            pre: Vec::with_capacity(self.layers.len()),
        };
        let mut a = inputs.to_owned();
        for layer in &self.layers {
            let z = a.dot(&layer.kernel) + &layer.bias;
            let next = z.mapv(|v| layer.activation.apply(v));
            cache.inputs.push(a);
            cache.pre.push(z);
            a = next;
        }
        Ok(cache)
    }

    /// Activations entering layer `layer` (the raw inputs for layer 0).
    pub fn activations_into(
        &self, inputs: ArrayView2<'_, f64>, layer: usize,
    ) -> ModelResult<Array2<f64>> {
        if layer >= self.layers.len() {
            return Err(ModelError::UnknownBlock { name: BlockId::kernel(layer).to_string() });
        }
        let mut cache = self.forward(inputs)?;
        Ok(cache.inputs.swap_remove(layer))
    }

    pub fn logits(&self, inputs: ArrayView2<'_, f64>) -> ModelResult<Array2<f64>> {
        Ok(self.forward(inputs)?.logits().to_owned())
    }

    /// Mean cross-entropy on `data`.
    pub fn loss(&self, data: &Dataset) -> ModelResult<f64> {
        let cache = self.forward(data.inputs())?;
        finite_loss(mean_cross_entropy(cache.logits(), data.labels()))
    }

    /// Mean cross-entropy and its exact gradient in registry order.
    pub fn loss_and_gradient(&self, data: &Dataset) -> ModelResult<(f64, Array1<f64>)> {
        let cache = self.forward(data.inputs())?;
        let loss = finite_loss(mean_cross_entropy(cache.logits(), data.labels()))?;

        let mut delta = cross_entropy_delta(cache.logits(), data.labels());
        let mut grads: Vec<(Array2<f64>, Array1<f64>)> = Vec::with_capacity(self.layers.len());
        for l in (0..self.layers.len()).rev() {
            let grad_k = cache.inputs[l].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            if l > 0 {
                let act = self.layers[l - 1].activation;
                let back = delta.dot(&self.layers[l].kernel.t());
                delta = back * &cache.pre[l - 1].mapv(|z| act.derivative(z));
            }
            grads.push((grad_k, grad_b));
        }
        grads.reverse();

        let mut flat = Vec::with_capacity(self.registry.total_len());
        for (gk, gb) in grads {
            flat.extend(gk.iter().copied());
            flat.extend(gb.iter().copied());
        }
        Ok((loss, Array1::from(flat)))
    }

    /// Fraction of examples whose arg-max logit equals the label.
    pub fn accuracy(&self, data: &Dataset) -> ModelResult<f64> {
        let logits = self.logits(data.inputs())?;
        let correct = logits
            .rows()
            .into_iter()
            .zip(data.labels().iter())
            .filter(|(row, label)| {
                let mut best = 0;
                for (j, &v) in row.iter().enumerate() {
                    if v > row[best] {
                        best = j;
                    }
                }
                best == **label
            })
            .count();
        Ok(correct as f64 / data.len() as f64)
    }
}

pub(crate) fn finite_loss(value: f64) -> ModelResult<f64> {
    if value.is_finite() { Ok(value) } else { Err(ModelError::NonFiniteLoss { value }) }
}
