//! Train a small classifier and print the Taylor coefficients of its loss
//! around the trained `dense_1/kernel`.
//!
//! Uses the MNIST training files (`train-images-idx3-ubyte`,
//! `train-labels-idx1-ubyte`) from `$MNIST_DIR` when set, keeping the first
//! `$MNIST_LIMIT` examples (default 24); otherwise a synthetic dataset of 24
//! examples. With fewer examples than first-layer units the activations
//! entering `dense_1` are rank deficient, so the 32 × 8 kernel Hessian has
//! at least 64 exact zero eigenvalues.
//!
//! ```text
//! RUST_LOG=info cargo run --release --example degenerate_expansion
//! ```
use anyhow::{Context, Result};
use degenerate_minima::{
    expansion::spectrum::render_histogram,
    model::{Dataset, activation::Activation},
    pipeline::{PipelineOptions, run},
};
use std::path::PathBuf;

const DEFAULT_MNIST_LIMIT: usize = 24;

fn load_dataset() -> Result<(Dataset, &'static str)> {
    match std::env::var_os("MNIST_DIR") {
        Some(dir) => {
            let dir = PathBuf::from(dir);
            let limit = match std::env::var("MNIST_LIMIT") {
                Ok(v) => v.parse().context("MNIST_LIMIT must be a positive integer")?,
                Err(_) => DEFAULT_MNIST_LIMIT,
            };
            let data = Dataset::from_idx_files(
                dir.join("train-images-idx3-ubyte"),
                dir.join("train-labels-idx1-ubyte"),
                Some(limit),
            )?;
            Ok((data, "mnist"))
        }
        None => Ok((Dataset::synthetic(24, 16, 4, 0)?, "synthetic")),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let (data, source) = load_dataset()?;
    let opts = PipelineOptions {
        hidden: vec![32, 8],
        activation: Activation::Tanh,
        ..PipelineOptions::default()
    };
    println!(
        "dataset: {source}, {} examples, {} inputs, {} classes",
        data.len(),
        data.input_dim(),
        data.n_classes()
    );

    let report = run(&data, &opts)?;
    let training = &report.training;
    let exp = &report.expansion;
    println!(
        "trained: loss {:.6e}, accuracy {:.3}, ||grad|| {:.3e}, {} iterations",
        training.loss, training.accuracy, training.grad_norm, training.optim.iterations
    );
    println!(
        "target {}: {} coordinates, {} degenerate (|λ| <= {:.0e})",
        opts.target, exp.hessian_dim, exp.null_dim, opts.expansion.spectral.zero_threshold
    );
    println!("\n|λ| histogram\n{}", render_histogram(&exp.histogram, 40));
    println!(
        "directions: degenerate λ = {:.3e}, non-degenerate λ = {:.3e}",
        exp.directions.degenerate.eigenvalue, exp.directions.non_degenerate.eigenvalue
    );
    let c = exp.coefficients;
    println!("c2 = {:.9e}\nc3 = {:.9e}\nc4 = {:.9e}", c.c2, c.c3, c.c4);
    Ok(())
}
