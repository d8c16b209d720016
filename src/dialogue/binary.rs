//! Yes/no grammar for confirmations

/// Affirmative phrases, compared after normalisation
pub const YES: &[&str] = &[
    "Yes.",
    "Of course.",
    "Sure.",
    "Yeah.",
    "Yes please.",
    "Yep.",
    "OK.",
    "Yes, thank you.",
];

pub const NO: &[&str] = &[
    "No.",
    "Nope.",
    "No no.",
    "Don't.",
    "Don't do it.",
    "No way.",
    "Not at all.",
];

/// Lowercase, drop punctuation other than apostrophes, collapse whitespace
fn normalise(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '\'')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Some(true)` for YES, `Some(false)` for NO, `None` when neither grammar matches
pub fn classify(utterance: &str) -> Option<bool> {
    let heard = normalise(utterance);
    if heard.is_empty() {
        return None;
    }
    if YES.iter().any(|p| normalise(p) == heard) {
        Some(true)
    } else if NO.iter().any(|p| normalise(p) == heard) {
        Some(false)
    } else {
        None
    }
}
