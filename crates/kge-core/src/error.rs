//! Error types for the kge-core library.
//!
//! Two classes of failure exist: configuration errors (a hyperparameter or
//! registry name is missing or malformed) and value errors (a hyperparameter
//! is incompatible with the trainable parameters it is applied to).

use thiserror::Error;

/// Broad classification of a [`KgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration supplied by the caller is incomplete or malformed.
    Config,
    /// A configured value does not fit the inputs it is applied to.
    Value,
}

/// The main error type for kge operations.
#[derive(Debug, Error)]
pub enum KgeError {
    /// A hyperparameter without a default was not supplied.
    #[error("Some of the hyperparams for regularizer {regularizer} were not passed: missing {name}")]
    MissingHyperparameter {
        /// The regularizer being constructed.
        regularizer: String,
        /// The missing hyperparameter.
        name: String,
    },

    /// Error during configuration parsing or validation.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// A description of the configuration error.
        message: String,
    },

    /// Lookup of a name that was never registered.
    #[error("Regularizer {name} not found from list of known regularizers")]
    UnknownRegularizer {
        /// The requested name.
        name: String,
    },

    /// A name was registered twice.
    #[error("Duplicate regularizer registered for key {name}")]
    DuplicateRegularizer {
        /// The duplicated name.
        name: String,
    },

    /// The weight is neither a number nor a list of numbers.
    #[error("Regularizer weight must be a scalar or a list of numbers: {message}")]
    InvalidWeight {
        /// What was found instead.
        message: String,
    },

    /// A per-tensor weight list does not match the number of trainable tensors.
    #[error(
        "Regularizer weight must be a scalar or a list with length equal to number of params \
         passed: expected {expected}, got {actual}"
    )]
    WeightLengthMismatch {
        /// Number of trainable tensors.
        expected: usize,
        /// Length of the weight list.
        actual: usize,
    },

    /// Tensor data does not fit the requested shape.
    #[error("Shape mismatch: shape {shape:?} cannot hold {len} elements")]
    ShapeMismatch {
        /// The requested shape.
        shape: Vec<usize>,
        /// The number of elements supplied.
        len: usize,
    },

    /// Error when serialization or deserialization fails.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// A description of the serialization error.
        message: String,
    },
}

impl KgeError {
    /// Returns whether this is a configuration or a value error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KgeError::InvalidWeight { .. }
            | KgeError::WeightLengthMismatch { .. }
            | KgeError::ShapeMismatch { .. } => ErrorKind::Value,
            _ => ErrorKind::Config,
        }
    }
}

impl From<serde_json::Error> for KgeError {
    fn from(err: serde_json::Error) -> Self {
        KgeError::SerializationError {
            message: err.to_string(),
        }
    }
}

/// A specialized Result type for kge operations.
pub type Result<T> = std::result::Result<T, KgeError>;
