//! # blackstory-core
//!
//! Deterministic game model for BlackStory, an automated two-agent
//! deduction game: a Narrator AI holds a secret solution, an
//! Investigator AI asks yes/no questions to uncover it.
//!
//! This crate holds everything that does not touch the network:
//! - the closed answer and verdict vocabularies with their
//!   conservative-default normalizers,
//! - the mystery with its capability-scoped secret solution,
//! - the append-only, turn-indexed transcript,
//! - the progress-event and transcript-sink boundaries.
//!
//! ## Key Guarantees
//!
//! 1. **Closed vocabularies**: raw model text never reaches the
//!    transcript unnormalized.
//! 2. **Whole turns only**: a turn is committed after both its question
//!    and answer exist; completed turn indices have no gaps.
//! 3. **Secret scoping**: the solution is read through one explicit
//!    accessor, used only by Narrator-facing code.
//!
//! Provider adapters and the game state machine live in
//! `blackstory-runtime`.

pub mod answer;
pub mod events;
pub mod mystery;
pub mod sink;
pub mod transcript;
pub mod verdict;

// Re-export main types at crate root
pub use answer::CanonicalAnswer;
pub use events::{EventSink, FailurePolicy, GameEvent, GamePhase, NullSink, Role};
pub use mystery::Mystery;
pub use sink::{SinkError, TranscriptSink};
pub use transcript::{GameMeta, GameRecord, Transcript, Turn, ERROR_RESOLUTION};
pub use verdict::Verdict;
