//! Per-tensor regularization weights.

use std::borrow::Cow;

use kge_core::{KgeError, ParamValue, Result};
use serde::{Deserialize, Serialize};

/// Weight applied when `lambda` is not supplied.
pub const DEFAULT_LAMBDA: f64 = 1e-5;

/// The `lambda` hyperparameter: one weight shared by every trainable tensor,
/// or one weight per tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lambda {
    /// Broadcast to every tensor on first use.
    Scalar(f64),
    /// Must have exactly one entry per trainable tensor.
    PerParam(Vec<f64>),
}

impl Default for Lambda {
    fn default() -> Self {
        Lambda::Scalar(DEFAULT_LAMBDA)
    }
}

impl From<f64> for Lambda {
    fn from(value: f64) -> Self {
        Lambda::Scalar(value)
    }
}

impl From<Vec<f64>> for Lambda {
    fn from(value: Vec<f64>) -> Self {
        Lambda::PerParam(value)
    }
}

impl Lambda {
    /// Reads a weight from a dynamic hyperparameter value.
    pub fn from_param(value: &ParamValue) -> Result<Self> {
        if let Some(v) = value.as_f64() {
            return Ok(Lambda::Scalar(v));
        }
        if let Some(items) = value.as_list() {
            let weights = items
                .iter()
                .map(ParamValue::as_f64)
                .collect::<Option<Vec<_>>>();
            if let Some(weights) = weights {
                return Ok(Lambda::PerParam(weights));
            }
        }
        let err = KgeError::InvalidWeight {
            message: value.to_string(),
        };
        tracing::error!(%err, "Rejected regularizer weight");
        Err(err)
    }

    /// Converts back into a dynamic hyperparameter value.
    pub fn to_param(&self) -> ParamValue {
        match self {
            Lambda::Scalar(v) => ParamValue::from(*v),
            Lambda::PerParam(v) => ParamValue::from(v.clone()),
        }
    }

    /// Broadcasts a scalar into one copy per tensor, then checks that the
    /// per-tensor list matches `num_params`.
    ///
    /// The broadcast is stored: once resolved the weights stay a list.
    pub fn broadcast(&mut self, num_params: usize) -> Result<&[f64]> {
        if let Lambda::Scalar(v) = *self {
            tracing::debug!(lambda = v, num_params, "Broadcasting scalar regularizer weight");
            *self = Lambda::PerParam(vec![v; num_params]);
        }
        let len = self.len();
        match self {
            Lambda::PerParam(weights) if len == num_params => Ok(weights.as_slice()),
            _ => Err(length_mismatch(num_params, len)),
        }
    }

    /// Number of stored weights. An unresolved scalar stores one.
    pub(crate) fn len(&self) -> usize {
        match self {
            Lambda::Scalar(_) => 1,
            Lambda::PerParam(weights) => weights.len(),
        }
    }

    /// True only for an empty per-tensor list; a scalar is never empty.
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the per-tensor weights for `num_params` tensors without
    /// storing the broadcast.
    pub fn resolve(&self, num_params: usize) -> Result<Cow<'_, [f64]>> {
        match self {
            Lambda::Scalar(v) => Ok(Cow::Owned(vec![*v; num_params])),
            Lambda::PerParam(weights) if weights.len() == num_params => {
                Ok(Cow::Borrowed(weights.as_slice()))
            }
            Lambda::PerParam(weights) => Err(length_mismatch(num_params, weights.len())),
        }
    }
}

fn length_mismatch(expected: usize, actual: usize) -> KgeError {
    let err = KgeError::WeightLengthMismatch { expected, actual };
    tracing::error!(%err, "Regularizer weight does not match trainable params");
    err
}
