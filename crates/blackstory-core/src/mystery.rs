//! The mystery: a public enigma and a capability-scoped secret solution.

use serde::{Deserialize, Serialize};

/// A generated mystery.
///
/// The enigma is public game state. The solution is held behind an
/// explicit accessor: only Narrator-facing prompt builders and the
/// final judgment may read it, and it must never be interpolated into
/// an Investigator-facing prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mystery {
    enigma: String,
    solution: String,
}

impl Mystery {
    pub fn new(enigma: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            enigma: enigma.into(),
            solution: solution.into(),
        }
    }

    /// The public premise shown to the Investigator.
    pub fn enigma(&self) -> &str {
        &self.enigma
    }

    /// The secret solution. Narrator and Judge use only.
    pub fn solution(&self) -> &str {
        &self.solution
    }
}
