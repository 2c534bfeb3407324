//! Public types for the Huginn API.

mod embedding;
mod generation;
pub mod prompt;

pub use embedding::Embedding;
pub use generation::{FallbackReason, Generation, Outcome};
