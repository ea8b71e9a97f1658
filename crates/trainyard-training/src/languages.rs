//! Supported language tags.

/// Tag used when the language is unknown or irrelevant (hub model overrides).
pub const UNKNOWN_LANGUAGE: &str = "unk";

pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("ar", "Arabic"),
    ("bn", "Bengali"),
    ("de", "German"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("hi", "Hindi"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("pt", "Portuguese"),
    ("sv", "Swedish"),
    ("tr", "Turkish"),
    ("zh", "Chinese"),
    (UNKNOWN_LANGUAGE, "Unknown"),
];

/// Trim and lowercase a raw language tag.
#[must_use]
pub fn canonicalize(tag: &str) -> String {
    tag.trim().to_lowercase()
}

#[must_use]
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

/// Whether `tag` is accepted at submission.
///
/// Composite `target2source` tags are accepted when both halves are concrete
/// supported languages.
#[must_use]
pub fn is_supported(tag: &str) -> bool {
    if language_name(tag).is_some() {
        return true;
    }
    match tag.split_once('2') {
        Some((target, source)) => {
            is_concrete_language(target) && is_concrete_language(source)
        }
        None => false,
    }
}

fn is_concrete_language(code: &str) -> bool {
    code != UNKNOWN_LANGUAGE && language_name(code).is_some()
}
