//! Network-free fallback descriptions.

/// Returned when a prompt has no subject to build a description from.
pub const GENERIC_FALLBACK: &str =
    "Sorry, a description isn't available right now. Please try again shortly.";

/// Derives a deterministic description from a clip subject.
///
/// This is a template heuristic, not language understanding. The subject is
/// cut at its first `(` and trimmed. With two or more whitespace-separated
/// tokens left, the last token is the "action" and everything before it the
/// "name":
///
/// ```rust
/// # use huginn::FallbackSynthesizer;
/// let text = FallbackSynthesizer.synthesize("Aaron Judge hits a home run (Replay)");
/// assert_eq!(
///     text,
///     "Watch Aaron Judge hits a home make an impressive run in this highlight clip."
/// );
/// ```
///
/// With fewer tokens the cleaned subject is embedded verbatim:
///
/// ```rust
/// # use huginn::FallbackSynthesizer;
/// let text = FallbackSynthesizer.synthesize("Walk-off");
/// assert_eq!(text, "Watch this exciting baseball moment featuring Walk-off.");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    pub fn synthesize(&self, subject: &str) -> String {
        let clean = subject.split('(').next().unwrap_or_default().trim();
        let tokens: Vec<&str> = clean.split_whitespace().collect();

        match tokens.split_last() {
            Some((action, name)) if !name.is_empty() => format!(
                "Watch {} make an impressive {action} in this highlight clip.",
                name.join(" ")
            ),
            _ => format!("Watch this exciting baseball moment featuring {clean}."),
        }
    }

    /// Fallback for prompts without a subject.
    pub fn generic(&self) -> String {
        GENERIC_FALLBACK.to_string()
    }
}
