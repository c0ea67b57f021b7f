//! Pluggable regularizers for knowledge graph embedding training.
//!
//! A regularizer turns the model's trainable tensors into one scalar penalty
//! that the training loop adds to its loss. Four variants are provided:
//!
//! - **None**: always zero
//! - **L1**: `sum_i lambda_i * sum(|x_i|)`
//! - **L2**: `sum_i lambda_i * sum(x_i^2)`
//! - **L3**: `sum_i lambda_i * sum(|x_i|^3)`
//!
//! `lambda` is either one weight shared by every tensor (broadcast on first
//! use) or a list with exactly one weight per tensor. It defaults to `1e-5`.
//!
//! # Building by name
//!
//! ```
//! use kge_core::{Hyperparams, Tensor};
//! use kge_regularizers::RegularizerRegistry;
//!
//! let registry = RegularizerRegistry::with_builtin();
//! let hyperparams = Hyperparams::new().with("lambda", vec![1.0, 1.0]).unwrap();
//! let mut l1 = registry.build("L1", &hyperparams, false).unwrap();
//!
//! let params = vec![Tensor::from_vec(vec![-1.0, 2.0]), Tensor::from_vec(vec![3.0])];
//! assert_eq!(l1.apply(&params).unwrap(), 6.0);
//! ```
//!
//! # Building from typed config
//!
//! ```
//! use kge_core::Tensor;
//! use kge_regularizers::{Lambda, RegularizerConfig};
//!
//! let config = RegularizerConfig::L3 { lambda: Lambda::Scalar(1.0) };
//! let mut l3 = config.build(false);
//! assert_eq!(l3.apply(&[Tensor::from_vec(vec![-2.0])]).unwrap(), 8.0);
//! ```

pub mod config;
pub mod registry;
pub mod regularizer;
pub mod weights;

pub use config::RegularizerConfig;
pub use registry::{HyperparamSpec, RegistryEntry, RegularizerFactory, RegularizerRegistry};
pub use regularizer::{
    log_summary, L1Regularizer, L2Regularizer, L3Regularizer, NoRegularizer, Regularizer, LAMBDA,
};
pub use weights::{Lambda, DEFAULT_LAMBDA};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::RegularizerConfig;
    pub use crate::registry::RegularizerRegistry;
    pub use crate::regularizer::{
        L1Regularizer, L2Regularizer, L3Regularizer, NoRegularizer, Regularizer,
    };
    pub use crate::weights::Lambda;
    pub use kge_core::{ErrorKind, Hyperparams, KgeError, ParamValue, Tensor};
}
