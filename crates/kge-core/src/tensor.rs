//! Dense tensor type for trainable parameters.
//!
//! Values are `f32` in row-major order. Only the element-wise operations and
//! reductions needed by penalty terms are provided.

use serde::{Deserialize, Serialize};

use crate::error::{KgeError, Result};

/// A multi-dimensional array of `f32`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    /// The shape of the tensor (dimensions)
    shape: Vec<usize>,
    /// The underlying data in row-major order
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new tensor with the given shape, filled with zeros.
    ///
    /// # Example
    ///
    /// ```
    /// use kge_core::tensor::Tensor;
    ///
    /// let t = Tensor::zeros(&[2, 3]);
    /// assert_eq!(t.shape(), &[2, 3]);
    /// assert_eq!(t.numel(), 6);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        let numel: usize = shape.iter().product();
        Self {
            shape: shape.to_vec(),
            data: vec![0.0; numel],
        }
    }

    /// Creates a new tensor with the given shape, filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        let numel: usize = shape.iter().product();
        Self {
            shape: shape.to_vec(),
            data: vec![1.0; numel],
        }
    }

    /// Creates a new tensor with the given shape and data.
    ///
    /// # Errors
    ///
    /// Returns [`KgeError::ShapeMismatch`] if the data length doesn't match
    /// the shape.
    pub fn from_data(shape: &[usize], data: Vec<f32>) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            let err = KgeError::ShapeMismatch {
                shape: shape.to_vec(),
                len: data.len(),
            };
            tracing::error!(%err, "Cannot build tensor");
            return Err(err);
        }
        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    /// Creates a 1-D tensor from a vector.
    ///
    /// ```
    /// use kge_core::tensor::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![-1.0, 2.0]);
    /// assert_eq!(t.shape(), &[2]);
    /// ```
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the total number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns a reference to the underlying data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Applies a function element-wise, keeping the shape.
    pub fn map<F>(&self, f: F) -> Tensor
    where
        F: Fn(f32) -> f32,
    {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Multiplies every element by a scalar.
    pub fn scale(&self, scalar: f32) -> Tensor {
        self.map(|x| x * scalar)
    }

    pub fn abs(&self) -> Tensor {
        self.map(f32::abs)
    }

    pub fn sqr(&self) -> Tensor {
        self.map(|x| x * x)
    }

    /// Element-wise `|x|^p`.
    pub fn abs_powi(&self, p: i32) -> Tensor {
        self.map(|x| x.abs().powi(p))
    }

    /// Element-wise sign with `sign(0) == 0`.
    pub fn sign(&self) -> Tensor {
        self.map(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}

impl From<Vec<f32>> for Tensor {
    fn from(data: Vec<f32>) -> Self {
        Tensor::from_vec(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_shape_check() {
        let t = Tensor::from_data(&[2, 2], vec![1.0, -2.0, 3.0, -4.0]).unwrap();
        assert_eq!(t.shape(), &[2, 2]);
        assert_eq!(t.numel(), 4);

        let err = Tensor::from_data(&[2, 3], vec![1.0; 4]).unwrap_err();
        assert!(err.to_string().contains("[2, 3]"));
    }

    #[test]
    fn test_reductions() {
        let t = Tensor::from_vec(vec![-1.0, 2.0, -3.0]);
        assert_eq!(t.sum(), -2.0);
        assert_eq!(t.abs().sum(), 6.0);
        assert_eq!(t.sqr().sum(), 14.0);
        assert_eq!(t.abs_powi(3).sum(), 36.0);
    }

    #[test]
    fn test_sign_and_scale() {
        let t = Tensor::from_vec(vec![-0.5, 0.0, 4.0]);
        assert_eq!(t.sign().data(), &[-1.0, 0.0, 1.0]);
        assert_eq!(t.scale(2.0).data(), &[-1.0, 0.0, 8.0]);
    }

    #[test]
    fn test_empty_tensor() {
        let t = Tensor::zeros(&[0]);
        assert_eq!(t.numel(), 0);
        assert_eq!(t.abs().sum(), 0.0);
    }
}
