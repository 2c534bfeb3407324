//! Caching subsystem.
//!
//! [`response::ResponseCache`] memoizes successful generations keyed on the
//! prompt's subject. Fallback text is never cached, so a later admitted
//! request gets a fresh chance at a real result.

pub mod response;

pub use response::{CacheConfig, ResponseCache};
