//! # blackstory-runtime
//!
//! Provider adapters and game orchestration for BlackStory.
//!
//! Four structurally different LLM backends hide behind the single
//! [`AiProvider`] capability: Ollama (local inference), OpenAI,
//! Anthropic, and Gemini. Each has its own request shape, role model,
//! and JSON-reliability characteristics; the adapters map the canonical
//! [`GenerationRequest`] onto each wire format and route unreliable
//! structured output through best-effort [`providers::recovery`].
//!
//! On top of that sits the [`GameOrchestrator`], the state machine
//! driving mystery generation, the interrogation loop, resolution, and
//! judgment, producing a turn-indexed [`blackstory_core::GameRecord`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use blackstory_runtime::{GameConfig, GameOrchestrator, ProviderRegistry};
//!
//! let registry = ProviderRegistry::with_defaults();
//! let narrator = registry.create("gemini", "gemini-1.5-flash")?;
//! let investigator = registry.create("ollama", "llama3.2")?;
//!
//! let game = GameOrchestrator::new(narrator, investigator, GameConfig::default());
//! let record = game.run().await?;
//! ```

pub mod orchestrator;
pub mod prompts;
pub mod providers;

// Re-export main types at crate root
pub use orchestrator::{GameConfig, GameError, GameOrchestrator};
pub use providers::{
    AiProvider, GenerationOptions, GenerationRequest, ProviderError, ProviderFactory,
    ProviderRegistry, BACKEND_KINDS,
};
