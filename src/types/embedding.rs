//! Embedding result type.

use serde::{Deserialize, Serialize};

/// Dense embedding of a single text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
    pub model: String,
    pub dimensions: usize,
}

impl Embedding {
    /// Build an embedding, deriving `dimensions` from `values`.
    pub fn new(values: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            dimensions: values.len(),
            values,
            model: model.into(),
        }
    }
}
