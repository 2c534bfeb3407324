//! Gateway orchestration

mod builder;
pub mod fallback;
mod service;

pub use builder::{Huginn, HuginnBuilder};
pub use fallback::{FallbackSynthesizer, GENERIC_FALLBACK};
pub use service::Gateway;
