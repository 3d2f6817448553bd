//! Canonicalization of Narrator answers.
//!
//! The Narrator is only ever allowed three answers. Raw model text is
//! normalized here before it can reach the transcript; anything the
//! model says outside the closed vocabulary collapses to "not relevant"
//! so an uninterpretable answer never becomes a useful signal for the
//! Investigator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of answers a Narrator may give to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalAnswer {
    Yes,
    No,
    NotRelevant,
}

impl CanonicalAnswer {
    /// Normalize raw model text into a canonical answer.
    ///
    /// Lowercases and trims, then matches against the game vocabulary.
    /// `sí` and the unaccented `si` are equivalent. A reply that leads
    /// with a canonical token and trails extra prose ("no,
    /// definitivamente no") still counts as that token; anything else
    /// maps to [`CanonicalAnswer::NotRelevant`], the conservative
    /// default.
    pub fn canonicalize(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();

        // Longest token first so "no es relevante" is not read as "no".
        for (token, answer) in [
            ("no es relevante", Self::NotRelevant),
            ("sí", Self::Yes),
            ("si", Self::Yes),
            ("no", Self::No),
        ] {
            if let Some(rest) = normalized.strip_prefix(token) {
                // Word boundary: "si" must not match "siempre".
                if rest.chars().next().map_or(true, |c| !c.is_alphanumeric()) {
                    return answer;
                }
            }
        }

        Self::NotRelevant
    }

    /// The token used in prompts and transcripts.
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Yes => "sí",
            Self::No => "no",
            Self::NotRelevant => "no es relevante",
        }
    }
}

impl fmt::Display for CanonicalAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn recognizes_affirmative_variants() {
        assert_eq!(CanonicalAnswer::canonicalize("sí"), CanonicalAnswer::Yes);
        assert_eq!(CanonicalAnswer::canonicalize("si"), CanonicalAnswer::Yes);
        assert_eq!(CanonicalAnswer::canonicalize("SÍ"), CanonicalAnswer::Yes);
        assert_eq!(CanonicalAnswer::canonicalize("  Si  "), CanonicalAnswer::Yes);
    }

    #[test]
    fn recognizes_negative_and_not_relevant() {
        assert_eq!(CanonicalAnswer::canonicalize("no"), CanonicalAnswer::No);
        assert_eq!(CanonicalAnswer::canonicalize(" No "), CanonicalAnswer::No);
        assert_eq!(
            CanonicalAnswer::canonicalize("No es relevante"),
            CanonicalAnswer::NotRelevant
        );
    }

    #[test]
    fn leading_token_with_trailing_prose_counts() {
        assert_eq!(
            CanonicalAnswer::canonicalize("No, definitivamente no"),
            CanonicalAnswer::No
        );
        assert_eq!(CanonicalAnswer::canonicalize("Sí."), CanonicalAnswer::Yes);
        assert_eq!(
            CanonicalAnswer::canonicalize("no es relevante para el caso"),
            CanonicalAnswer::NotRelevant
        );
    }

    #[test]
    fn token_prefix_of_a_longer_word_does_not_match() {
        assert_eq!(
            CanonicalAnswer::canonicalize("siempre"),
            CanonicalAnswer::NotRelevant
        );
        assert_eq!(
            CanonicalAnswer::canonicalize("normalmente"),
            CanonicalAnswer::NotRelevant
        );
    }

    #[test]
    fn unrecognized_text_defaults_to_not_relevant() {
        assert_eq!(
            CanonicalAnswer::canonicalize("quizás"),
            CanonicalAnswer::NotRelevant
        );
        assert_eq!(CanonicalAnswer::canonicalize(""), CanonicalAnswer::NotRelevant);
    }

    #[test]
    fn canonicalization_is_idempotent_over_tokens() {
        for answer in [
            CanonicalAnswer::Yes,
            CanonicalAnswer::No,
            CanonicalAnswer::NotRelevant,
        ] {
            assert_eq!(CanonicalAnswer::canonicalize(answer.as_token()), answer);
        }
    }

    proptest! {
        // Totality: any input maps to one of the three tokens, and
        // re-canonicalizing the result is a fixed point.
        #[test]
        fn canonicalization_is_total(raw in ".*") {
            let answer = CanonicalAnswer::canonicalize(&raw);
            prop_assert_eq!(CanonicalAnswer::canonicalize(answer.as_token()), answer);
        }
    }
}
