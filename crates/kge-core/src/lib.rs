//! Core types for knowledge graph embedding training.
//!
//! This crate provides the foundations shared by the training components:
//!
//! - **Error types**: [`KgeError`] with a configuration/value [`ErrorKind`].
//! - **Hyperparameters**: [`Hyperparams`], a name-keyed mapping of dynamically
//!   typed [`ParamValue`]s, buildable from JSON.
//! - **Tensors**: [`Tensor`], a dense `f32` array holding trainable parameters.
//!
//! # Example
//!
//! ```
//! use kge_core::{Hyperparams, ParamValue, Tensor};
//!
//! let params = Hyperparams::from_json_str(r#"{"lambda": 0.001}"#).unwrap();
//! assert_eq!(params.get("lambda"), Some(&ParamValue::Float(0.001)));
//!
//! let t = Tensor::from_data(&[2, 2], vec![1.0, -1.0, 2.0, -2.0]).unwrap();
//! assert_eq!(t.abs().sum(), 6.0);
//! ```

pub mod error;
pub mod hyperparams;
pub mod tensor;

pub use error::{ErrorKind, KgeError, Result};
pub use hyperparams::{Hyperparams, ParamValue};
pub use tensor::Tensor;
