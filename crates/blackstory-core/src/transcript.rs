//! Turn-indexed game transcript.
//!
//! The transcript is append-only while the game runs. A turn is only
//! ever constructed whole: both the question and the canonical answer
//! must exist before [`Transcript::commit_turn`] assigns it an index.
//! Failed iterations leave no trace here, so completed turn indices are
//! contiguous with no holes.

use crate::answer::CanonicalAnswer;
use crate::verdict::Verdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel recorded when the Investigator's final hypothesis call fails.
pub const ERROR_RESOLUTION: &str = "ERROR_RESOLUCION";

/// One completed question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based position among completed turns.
    pub index: u32,
    pub question: String,
    pub answer: CanonicalAnswer,
}

/// The ordered record of a game in progress.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    resolution: Option<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a fully built turn, assigning the next index.
    ///
    /// This is the only way a turn enters the transcript; callers hold
    /// the pending question locally until the answer also succeeded.
    pub fn commit_turn(&mut self, question: impl Into<String>, answer: CanonicalAnswer) {
        let turn = Turn {
            index: self.turns.len() as u32 + 1,
            question: question.into(),
            answer,
        };
        self.turns.push(turn);
    }

    /// Record the Investigator's final hypothesis.
    pub fn set_resolution(&mut self, resolution: impl Into<String>) {
        self.resolution = Some(resolution.into());
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serialize the completed history for replay into a prompt.
    ///
    /// Only committed turns appear; skipped iterations are invisible.
    pub fn render_history(&self) -> String {
        let mut lines = Vec::with_capacity(self.turns.len() * 2 + 1);
        for turn in &self.turns {
            lines.push(format!("Investigador: {}", turn.question));
            lines.push(format!("Narrador: {}", turn.answer));
        }
        if let Some(resolution) = &self.resolution {
            lines.push(format!("Investigador (Resolución Final): {resolution}"));
        }
        lines.join("\n")
    }

    /// Finalize into an immutable record for the sink.
    pub fn finalize(
        self,
        enigma: String,
        solution: String,
        verdict: Verdict,
        meta: GameMeta,
    ) -> GameRecord {
        GameRecord {
            enigma,
            solution,
            turns: self.turns,
            resolution: self.resolution.unwrap_or_else(|| ERROR_RESOLUTION.to_string()),
            verdict,
            meta,
            finished_at: Utc::now(),
        }
    }
}

/// Who played, and under what cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMeta {
    /// Narrator label, e.g. "gemini (gemini-1.5-flash)".
    pub narrator: String,
    /// Investigator label.
    pub investigator: String,
    pub max_turns: u32,
}

/// The immutable outcome of a finished game, handed to the sink once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub enigma: String,
    pub solution: String,
    pub turns: Vec<Turn>,
    pub resolution: String,
    pub verdict: Verdict,
    pub meta: GameMeta,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_turns_are_indexed_contiguously() {
        let mut transcript = Transcript::new();
        transcript.commit_turn("¿Es humano?", CanonicalAnswer::No);
        // A failed iteration commits nothing.
        transcript.commit_turn("¿Es un animal?", CanonicalAnswer::Yes);

        let indices: Vec<u32> = transcript.turns().iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn history_rendering_excludes_nothing_but_uncommitted_turns() {
        let mut transcript = Transcript::new();
        transcript.commit_turn("¿Es humano?", CanonicalAnswer::No);

        let history = transcript.render_history();
        assert_eq!(history, "Investigador: ¿Es humano?\nNarrador: no");
    }

    #[test]
    fn resolution_appears_as_labeled_entry() {
        let mut transcript = Transcript::new();
        transcript.commit_turn("¿Es humano?", CanonicalAnswer::No);
        transcript.set_resolution("Era un pez.");

        let history = transcript.render_history();
        assert!(history.ends_with("Investigador (Resolución Final): Era un pez."));
    }

    #[test]
    fn empty_transcript_renders_empty_history() {
        assert_eq!(Transcript::new().render_history(), "");
    }

    #[test]
    fn finalize_without_resolution_records_the_sentinel() {
        let record = Transcript::new().finalize(
            "enigma".into(),
            "solución".into(),
            Verdict::Error,
            GameMeta {
                narrator: "mock".into(),
                investigator: "mock".into(),
                max_turns: 0,
            },
        );
        assert_eq!(record.resolution, ERROR_RESOLUTION);
    }
}
