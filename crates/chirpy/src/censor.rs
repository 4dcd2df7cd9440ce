//! Profanity filter for chirp bodies.

use std::collections::HashSet;

/// Replacement for a censored word
pub const REDACTED: &str = "****";

/// Replaces listed words with [`REDACTED`].
///
/// The body is split on single spaces and each piece is compared, lowercased,
/// against the word list. Pieces with attached punctuation (`"fornax!"`) do
/// not match. Spacing is preserved exactly.
#[derive(Debug, Clone, Default)]
pub struct Censor {
    words: HashSet<String>,
}

impl Censor {
    /// Build a censor for the given words. Case is ignored.
    pub fn new<I>(words: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Return `text` with every listed word redacted.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        text.split(' ')
            .map(|word| {
                if self.words.contains(&word.to_lowercase()) {
                    REDACTED
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROFANE_WORDS;
    use rstest::rstest;

    #[rstest]
    #[case::clean("I had something interesting for breakfast", "I had something interesting for breakfast")]
    #[case::single("This is a kerfuffle opinion I need to share with the world", "This is a **** opinion I need to share with the world")]
    #[case::mixed_case("I hear Mastodon is better than Chirpy. sharbert I need to migrate", "I hear Mastodon is better than Chirpy. **** I need to migrate")]
    #[case::upper("I really need a KERFUFFLE to go to bed sooner, Fornax !", "I really need a **** to go to bed sooner, **** !")]
    #[case::punctuation_attached("what a Fornax!", "what a Fornax!")]
    #[case::double_space("fornax  sharbert", "****  ****")]
    #[case::empty("", "")]
    fn apply_redacts_listed_words(#[case] input: &str, #[case] expected: &str) {
        let censor = Censor::new(DEFAULT_PROFANE_WORDS);
        assert_eq!(censor.apply(input), expected);
    }

    #[test]
    fn word_list_is_case_insensitive() {
        let censor = Censor::new(["DARN"]);
        assert_eq!(censor.apply("darn it"), "**** it");
    }

    #[test]
    fn empty_word_list_changes_nothing() {
        let censor = Censor::default();
        assert_eq!(censor.apply("kerfuffle"), "kerfuffle");
    }
}
