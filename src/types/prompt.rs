//! Prompt construction and inspection for the description use case.
//!
//! The gateway treats prompts as opaque text. The one exception is
//! [`subject_key`], which recognizes description prompts and pulls out the
//! subject used as the cache and fallback key. Everything that knows the
//! shape of a description prompt lives in this module.

/// Marker that introduces the subject in a description prompt.
pub const SUBJECT_MARKER: &str = "baseball video titled:";

/// Build the description prompt for a highlight clip title.
///
/// The title goes through [`normalize_title`] first, so `"X (Replay)"` and
/// `"X"` produce the same prompt. [`subject_key`] yields the normalized title
/// back (as long as it contains no `.`).
pub fn description_prompt(title: &str) -> String {
    let title = normalize_title(title);
    format!(
        "Generate a short and engaging description for the {SUBJECT_MARKER} {title}. \
         Keep your response to under 20 words. Your response should start with the \
         content and just one sentence. Do not include filler like OK, here is a short \
         and engaging description."
    )
}

/// Drop one trailing parenthetical such as `" (Replay)"` from a title.
///
/// Only a group closing the title counts; the whitespace before it goes too.
///
/// ```rust
/// # use huginn::types::prompt::normalize_title;
/// assert_eq!(normalize_title("Judge homers (Replay)"), "Judge homers");
/// assert_eq!(normalize_title("Soto (NYY) walks it off"), "Soto (NYY) walks it off");
/// ```
pub fn normalize_title(title: &str) -> &str {
    let Some(body) = title.strip_suffix(')') else {
        return title;
    };
    // The group opens at the first `(` after the last `)` in the body.
    let start = body.rfind(')').map_or(0, |i| i + 1);
    match body[start..].find('(') {
        Some(open) => body[..start + open].trim_end(),
        None => title,
    }
}

/// Extract the subject key from a description prompt.
///
/// The subject is the text between [`SUBJECT_MARKER`] and the next `.`,
/// trimmed, with internal whitespace runs collapsed to one space. Returns
/// `None` for prompts without the marker or with an empty subject.
///
/// ```rust
/// # use huginn::types::prompt::subject_key;
/// let prompt = "Describe the baseball video titled:  Judge  homers (Replay). Be brief.";
/// assert_eq!(subject_key(prompt).as_deref(), Some("Judge homers (Replay)"));
/// assert_eq!(subject_key("Tell me a joke."), None);
/// ```
pub fn subject_key(prompt: &str) -> Option<String> {
    let (_, rest) = prompt.split_once(SUBJECT_MARKER)?;
    let subject = rest.split('.').next().unwrap_or_default();
    let key = subject.split_whitespace().collect::<Vec<_>>().join(" ");
    (!key.is_empty()).then_some(key)
}

/// Final description from generated text.
///
/// Models sometimes preface the answer (`"Here it is: ..."`). When the text
/// contains a `:`, everything after the first one is the description;
/// otherwise the whole text is. Surrounding whitespace is trimmed either way.
pub fn extract_description(text: &str) -> &str {
    match text.split_once(':') {
        Some((_, after)) => after.trim(),
        None => text.trim(),
    }
}
