//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "gemini")
//! - `outcome`: how a gateway request ended: "cached", "generated", "fallback"
//! - `reason`: why a fallback was produced: "rate_limited", "exhausted", "empty"

/// Total gateway requests.
///
/// Labels: `outcome` ("cached" | "generated" | "fallback").
pub const REQUESTS_TOTAL: &str = "huginn_requests_total";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Total response cache misses (absent or expired).
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";

/// Total calls denied by the sliding-window rate limiter.
pub const RATE_LIMITED_TOTAL: &str = "huginn_rate_limited_total";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "huginn_retries_total";

/// Total synthesized fallbacks.
///
/// Labels: `reason`.
pub const FALLBACKS_TOTAL: &str = "huginn_fallbacks_total";

/// Duration of a single provider attempt in seconds.
///
/// Labels: `provider`.
pub const PROVIDER_DURATION_SECONDS: &str = "huginn_provider_duration_seconds";
