/// Lowercased, punctuation-free form of a question plus its whitespace tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
    pub text: String,
    pub tokens: Vec<String>,
}

/// Folds case, strips ASCII punctuation and splits on whitespace runs.
///
/// Only the 32 ASCII punctuation characters are removed; punctuation outside
/// ASCII (`¿`, `—`, curly quotes) is kept as-is.
pub fn normalize(text: &str) -> Normalized {
    let text: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    let tokens = text.split_whitespace().map(str::to_string).collect();

    Normalized { text, tokens }
}
