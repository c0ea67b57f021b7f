//! Strongly typed regularizer configuration.
//!
//! [`RegularizerConfig`] is the serde-friendly alternative to building through
//! the registry by name: each variant carries its own typed hyperparameters.
//!
//! ```
//! use kge_regularizers::{Lambda, RegularizerConfig};
//!
//! let config = RegularizerConfig::from_json_str(r#"{"type": "L2", "lambda": [0.1, 0.01]}"#).unwrap();
//! assert_eq!(config, RegularizerConfig::L2 { lambda: Lambda::PerParam(vec![0.1, 0.01]) });
//! ```

use kge_core::{Hyperparams, KgeError, Result};
use serde::{Deserialize, Serialize};

use crate::regularizer::{
    lambda_from, log_summary, L1Regularizer, L2Regularizer, L3Regularizer, NoRegularizer,
    Regularizer, LAMBDA,
};
use crate::weights::Lambda;

/// Configuration for each built-in regularizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum RegularizerConfig {
    /// No regularization.
    #[default]
    None,
    /// L1 regularization.
    L1 {
        /// Weight per tensor (default: 1e-5).
        #[serde(default)]
        lambda: Lambda,
    },
    /// L2 regularization.
    L2 {
        /// Weight per tensor (default: 1e-5).
        #[serde(default)]
        lambda: Lambda,
    },
    /// L3 regularization.
    L3 {
        /// Weight per tensor (default: 1e-5).
        #[serde(default)]
        lambda: Lambda,
    },
}

impl RegularizerConfig {
    /// Parses a config such as `{"type": "L1", "lambda": 0.001}`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| {
            let err = KgeError::from(e);
            tracing::error!(%err, "Invalid regularizer config");
            err
        })
    }

    /// Reads a config from a registry name and hyperparameter mapping.
    pub fn from_hyperparams(name: &str, hyperparams: &Hyperparams) -> Result<Self> {
        match name {
            "None" => Ok(RegularizerConfig::None),
            "L1" => Ok(RegularizerConfig::L1 {
                lambda: lambda_from(hyperparams)?,
            }),
            "L2" => Ok(RegularizerConfig::L2 {
                lambda: lambda_from(hyperparams)?,
            }),
            "L3" => Ok(RegularizerConfig::L3 {
                lambda: lambda_from(hyperparams)?,
            }),
            _ => {
                let err = KgeError::UnknownRegularizer {
                    name: name.to_string(),
                };
                tracing::error!(%err, "Unknown regularizer config");
                Err(err)
            }
        }
    }

    /// Returns the registry name of the configured regularizer.
    pub fn name(&self) -> &'static str {
        match self {
            RegularizerConfig::None => "None",
            RegularizerConfig::L1 { .. } => "L1",
            RegularizerConfig::L2 { .. } => "L2",
            RegularizerConfig::L3 { .. } => "L3",
        }
    }

    /// Converts into the dynamic hyperparameter form.
    pub fn to_hyperparams(&self) -> Result<Hyperparams> {
        let mut params = Hyperparams::new();
        match self {
            RegularizerConfig::None => {}
            RegularizerConfig::L1 { lambda }
            | RegularizerConfig::L2 { lambda }
            | RegularizerConfig::L3 { lambda } => params.set(LAMBDA, lambda.to_param())?,
        }
        Ok(params)
    }

    /// Builds a fresh regularizer owning its own copy of the weights.
    pub fn build(&self, verbose: bool) -> Box<dyn Regularizer> {
        let regularizer: Box<dyn Regularizer> = match self {
            RegularizerConfig::None => Box::new(NoRegularizer::new()),
            RegularizerConfig::L1 { lambda } => Box::new(L1Regularizer::new(lambda.clone())),
            RegularizerConfig::L2 { lambda } => Box::new(L2Regularizer::new(lambda.clone())),
            RegularizerConfig::L3 { lambda } => Box::new(L3Regularizer::new(lambda.clone())),
        };
        if verbose {
            log_summary(regularizer.as_ref());
        }
        regularizer
    }
}
