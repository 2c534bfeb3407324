//! Result types for gateway generation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text produced by [`Gateway::generate_detailed`](crate::Gateway::generate_detailed),
/// together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub outcome: Outcome,
}

/// Which path a gateway request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum Outcome {
    /// Served from the response cache without touching the provider.
    Cached,
    /// Produced by the provider (and cached when the prompt had a subject).
    Generated,
    /// Synthesized locally; never cached.
    Fallback(FallbackReason),
}

/// Why the gateway fell back to a synthesized description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The sliding-window limiter denied the call.
    RateLimited,
    /// Every retry attempt failed.
    Exhausted,
    /// The provider answered with empty or whitespace-only text.
    Empty,
}

impl Outcome {
    /// Metric label for this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Cached => "cached",
            Outcome::Generated => "generated",
            Outcome::Fallback(_) => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }
}

impl FallbackReason {
    /// Metric label for this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::RateLimited => "rate_limited",
            FallbackReason::Exhausted => "exhausted",
            FallbackReason::Empty => "empty",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Fallback(reason) => write!(f, "fallback ({})", reason.as_str()),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::Cached.to_string(), "cached");
        assert_eq!(
            Outcome::Fallback(FallbackReason::RateLimited).to_string(),
            "fallback (rate_limited)"
        );
    }

    #[test]
    fn outcome_serializes_with_reason() {
        let json = serde_json::to_value(Outcome::Fallback(FallbackReason::Empty)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "fallback", "reason": "empty"}));

        let json = serde_json::to_value(Outcome::Generated).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "generated"}));
    }
}
