//! Regularization penalties over trainable parameters.
//!
//! Every regularizer follows the same contract: it is built from a
//! hyperparameter mapping, validates its weights against the trainable
//! parameters on [`Regularizer::apply`], and returns one scalar penalty to be
//! added to the training loss.

use std::fmt;

use kge_core::{Hyperparams, ParamValue, Result, Tensor};

use crate::weights::Lambda;

/// Hyperparameter holding the per-tensor weight.
pub const LAMBDA: &str = "lambda";

/// A regularization term over an ordered list of trainable tensors.
pub trait Regularizer: fmt::Debug + Send + Sync {
    /// Registry name of this regularizer.
    fn name(&self) -> &str;

    /// Current hyperparameter values, in declaration order.
    fn hyperparameters(&self) -> Vec<(&'static str, ParamValue)>;

    /// Validates the hyperparameters against `trainable_params`, broadcasting
    /// scalar weights to one per tensor.
    fn check_inputs(&mut self, trainable_params: &[Tensor]) -> Result<()>;

    /// Computes the penalty for `trainable_params`.
    fn compute_loss(&self, trainable_params: &[Tensor]) -> Result<f32>;

    /// Gradient of the penalty with respect to each trainable tensor.
    fn gradient(&self, trainable_params: &[Tensor]) -> Result<Vec<Tensor>>;

    /// Checks inputs, then computes the loss.
    fn apply(&mut self, trainable_params: &[Tensor]) -> Result<f32> {
        self.check_inputs(trainable_params)?;
        self.compute_loss(trainable_params)
    }
}

/// Logs the name and resolved hyperparameters of a regularizer.
pub fn log_summary(regularizer: &dyn Regularizer) {
    tracing::info!("------ Regularizer-----");
    tracing::info!(name = regularizer.name(), "Name:{}", regularizer.name());
    tracing::info!("Parameters:");
    for (key, value) in regularizer.hyperparameters() {
        tracing::info!("\t{}:{}", key, value);
    }
}

/// Reads `lambda` from a hyperparameter mapping, falling back to the default.
pub(crate) fn lambda_from(hyperparams: &Hyperparams) -> Result<Lambda> {
    match hyperparams.get(LAMBDA) {
        Some(value) => Lambda::from_param(value),
        None => Ok(Lambda::default()),
    }
}

fn weighted_sum<F>(lambda: &Lambda, trainable_params: &[Tensor], penalty: F) -> Result<f32>
where
    F: Fn(&Tensor) -> f32,
{
    let weights = lambda.resolve(trainable_params.len())?;
    Ok(weights
        .iter()
        .zip(trainable_params)
        .map(|(&w, param)| w as f32 * penalty(param))
        .sum())
}

fn weighted_grad<F>(lambda: &Lambda, trainable_params: &[Tensor], grad: F) -> Result<Vec<Tensor>>
where
    F: Fn(&Tensor, f32) -> Tensor,
{
    let weights = lambda.resolve(trainable_params.len())?;
    Ok(weights
        .iter()
        .zip(trainable_params)
        .map(|(&w, param)| grad(param, w as f32))
        .collect())
}

/// Performs no regularization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoRegularizer;

impl NoRegularizer {
    pub fn new() -> Self {
        Self
    }

    /// No hyperparameters are read.
    pub fn from_hyperparams(_hyperparams: &Hyperparams) -> Result<Self> {
        Ok(Self)
    }
}

impl Regularizer for NoRegularizer {
    fn name(&self) -> &str {
        "None"
    }

    fn hyperparameters(&self) -> Vec<(&'static str, ParamValue)> {
        Vec::new()
    }

    fn check_inputs(&mut self, _trainable_params: &[Tensor]) -> Result<()> {
        Ok(())
    }

    fn compute_loss(&self, _trainable_params: &[Tensor]) -> Result<f32> {
        Ok(0.0)
    }

    fn gradient(&self, trainable_params: &[Tensor]) -> Result<Vec<Tensor>> {
        Ok(trainable_params
            .iter()
            .map(|param| Tensor::zeros(param.shape()))
            .collect())
    }
}

macro_rules! norm_regularizer {
    (
        $(#[$meta:meta])*
        $ty:ident, $name:expr,
        penalty: $penalty:expr,
        grad: $grad:expr $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $ty {
            lambda: Lambda,
        }

        impl $ty {
            /// Creates the regularizer with the given weight.
            pub fn new(lambda: impl Into<Lambda>) -> Self {
                Self {
                    lambda: lambda.into(),
                }
            }

            /// Reads `lambda` (default `1e-5`).
            pub fn from_hyperparams(hyperparams: &Hyperparams) -> Result<Self> {
                Ok(Self {
                    lambda: lambda_from(hyperparams)?,
                })
            }

            /// Current weight, per tensor once inputs have been checked.
            pub fn lambda(&self) -> &Lambda {
                &self.lambda
            }
        }

        impl Regularizer for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn hyperparameters(&self) -> Vec<(&'static str, ParamValue)> {
                vec![(LAMBDA, self.lambda.to_param())]
            }

            fn check_inputs(&mut self, trainable_params: &[Tensor]) -> Result<()> {
                self.lambda.broadcast(trainable_params.len())?;
                Ok(())
            }

            fn compute_loss(&self, trainable_params: &[Tensor]) -> Result<f32> {
                weighted_sum(&self.lambda, trainable_params, $penalty)
            }

            fn gradient(&self, trainable_params: &[Tensor]) -> Result<Vec<Tensor>> {
                weighted_grad(&self.lambda, trainable_params, $grad)
            }
        }
    };
}

norm_regularizer! {
    /// L1 regularization: `sum_i lambda_i * sum(|x_i|)`.
    L1Regularizer, "L1",
    penalty: |param: &Tensor| param.abs().sum(),
    grad: |param: &Tensor, w: f32| param.sign().scale(w),
}

norm_regularizer! {
    /// L2 regularization: `sum_i lambda_i * sum(x_i^2)`.
    L2Regularizer, "L2",
    penalty: |param: &Tensor| param.sqr().sum(),
    grad: |param: &Tensor, w: f32| param.scale(2.0 * w),
}

norm_regularizer! {
    /// L3 regularization: `sum_i lambda_i * sum(|x_i|^3)`.
    L3Regularizer, "L3",
    penalty: |param: &Tensor| param.abs_powi(3).sum(),
    grad: |param: &Tensor, w: f32| param.map(|x| 3.0 * w * x * x.abs()),
}
