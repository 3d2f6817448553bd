//! Progress events emitted at the console boundary.
//!
//! The orchestrator publishes structured events; how (or whether) they
//! are displayed is a presentation concern the core knows nothing
//! about. Event payloads on Investigator-facing paths never carry the
//! secret solution.

use crate::answer::CanonicalAnswer;
use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::fmt;

/// States of the game state machine.
///
/// `Aborted` is absorbing and reachable only from `GeneratingMystery`:
/// without a mystery there is no game to salvage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    GeneratingMystery,
    Interrogating,
    Resolving,
    Judging,
    Done,
    Aborted,
}

/// What a provider failure does to the game, per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The run ends with no transcript.
    Fatal,
    /// The current iteration is dropped; the loop continues.
    AbsorbTurn,
    /// A sentinel value is recorded and the game proceeds.
    Degrade,
    /// No provider call happens in this phase.
    None,
}

impl GamePhase {
    /// The failure policy for provider errors raised in this phase.
    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            Self::GeneratingMystery => FailurePolicy::Fatal,
            Self::Interrogating => FailurePolicy::AbsorbTurn,
            Self::Resolving | Self::Judging => FailurePolicy::Degrade,
            Self::Done | Self::Aborted => FailurePolicy::None,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GeneratingMystery => "generating-mystery",
            Self::Interrogating => "interrogating",
            Self::Resolving => "resolving",
            Self::Judging => "judging",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Which agent a call belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Narrator,
    Investigator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Narrator => f.write_str("Narrador"),
            Self::Investigator => f.write_str("Investigador"),
        }
    }
}

/// A structured progress event.
#[derive(Debug, Clone)]
pub enum GameEvent {
    PhaseEntered {
        phase: GamePhase,
    },
    MysteryCreated {
        enigma: String,
    },
    QuestionAsked {
        iteration: u32,
        max_turns: u32,
        question: String,
    },
    AnswerGiven {
        iteration: u32,
        answer: CanonicalAnswer,
    },
    /// An iteration was dropped; nothing was added to the transcript.
    TurnSkipped {
        iteration: u32,
        role: Role,
        cause: String,
    },
    ResolutionProduced {
        resolution: String,
    },
    VerdictIssued {
        verdict: Verdict,
    },
    GameAborted {
        cause: String,
    },
}

/// Consumer of progress events.
///
/// Implementations must not block: the orchestrator calls this inline
/// between provider calls.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &GameEvent);
}

/// Discards every event. The default when no presentation layer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: &GameEvent) {}
}
