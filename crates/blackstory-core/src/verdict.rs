//! Final judgment of a game.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the Narrator's final judgment.
///
/// `Error` is reserved for a failed judging call; an unrecognized reply
/// from a successful call normalizes to `Loser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Winner,
    Loser,
    Error,
}

impl Verdict {
    /// Normalize a raw verdict reply.
    ///
    /// Case-insensitive, whitespace-trimmed exact match against the two
    /// verdict tokens. Anything else defaults to `Loser` - the same
    /// conservative-default policy as answer canonicalization.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "GANADOR" => Self::Winner,
            "PERDEDOR" => Self::Loser,
            _ => Self::Loser,
        }
    }

    /// The token used in reports.
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Winner => "GANADOR",
            Self::Loser => "PERDEDOR",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
