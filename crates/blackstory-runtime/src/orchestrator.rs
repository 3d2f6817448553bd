//! The game orchestrator: a turn-based state machine over two providers.
//!
//! Phases run `GeneratingMystery -> Interrogating -> Resolving ->
//! Judging -> Done`, with `Aborted` reachable from mystery generation
//! only. Each phase's failure policy comes from
//! [`GamePhase::failure_policy`]: fatal for mystery generation,
//! absorbed per turn during interrogation, degraded to sentinels for
//! resolution and judgment. The two provider calls inside one turn are
//! strictly sequential; the Narrator's answer depends on the
//! Investigator's question.

use std::sync::Arc;
use thiserror::Error;

use blackstory_core::{
    CanonicalAnswer, EventSink, GameEvent, GameMeta, GamePhase, GameRecord, Mystery, NullSink,
    Role, Transcript, Verdict, ERROR_RESOLUTION,
};

use crate::prompts;
use crate::providers::{AiProvider, GenerationOptions, GenerationRequest, ProviderError};

/// Errors that end a run with no transcript.
///
/// Only mystery generation is fatal; every later failure is absorbed or
/// degraded per the phase policy.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Mystery generation failed: {0}")]
    MysteryGeneration(#[from] ProviderError),
}

/// Caller-supplied game parameters.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Maximum number of interrogation turns before resolution.
    pub max_turns: u32,

    /// Tuning applied to every provider call.
    pub options: GenerationOptions,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_turns: 15,
            options: GenerationOptions::default(),
        }
    }
}

/// Drives one game between a Narrator and an Investigator provider.
///
/// The Narrator handle is the only component that ever receives the
/// secret solution; Investigator calls see the public enigma and the
/// completed transcript only.
pub struct GameOrchestrator {
    narrator: Arc<dyn AiProvider>,
    investigator: Arc<dyn AiProvider>,
    config: GameConfig,
    sink: Arc<dyn EventSink>,
}

impl GameOrchestrator {
    pub fn new(
        narrator: Arc<dyn AiProvider>,
        investigator: Arc<dyn AiProvider>,
        config: GameConfig,
    ) -> Self {
        Self {
            narrator,
            investigator,
            config,
            sink: Arc::new(NullSink),
        }
    }

    /// Attach a presentation-layer event sink.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Play one full game.
    ///
    /// Returns the finalized record once the state machine reaches
    /// `Done`. Returns an error only when mystery generation fails;
    /// the caller must not hand anything to a transcript sink in that
    /// case.
    pub async fn run(&self) -> Result<GameRecord, GameError> {
        self.enter(GamePhase::GeneratingMystery);
        let mystery = match self.generate_mystery().await {
            Ok(mystery) => mystery,
            Err(err) => {
                tracing::error!(phase = %GamePhase::GeneratingMystery, error = %err,
                    "mystery generation failed, aborting run");
                self.sink.publish(&GameEvent::GameAborted {
                    cause: err.to_string(),
                });
                self.enter(GamePhase::Aborted);
                return Err(GameError::MysteryGeneration(err));
            }
        };
        self.sink.publish(&GameEvent::MysteryCreated {
            enigma: mystery.enigma().to_string(),
        });

        self.enter(GamePhase::Interrogating);
        let mut transcript = Transcript::new();
        for iteration in 1..=self.config.max_turns {
            self.play_turn(iteration, &mystery, &mut transcript).await;
        }

        self.enter(GamePhase::Resolving);
        let resolution = self.resolve(&mystery, &transcript).await;
        self.sink.publish(&GameEvent::ResolutionProduced {
            resolution: resolution.clone(),
        });
        transcript.set_resolution(resolution);

        self.enter(GamePhase::Judging);
        let verdict = self.judge(&mystery, &transcript).await;
        self.sink.publish(&GameEvent::VerdictIssued { verdict });

        self.enter(GamePhase::Done);
        let meta = GameMeta {
            narrator: provider_label(self.narrator.as_ref()),
            investigator: provider_label(self.investigator.as_ref()),
            max_turns: self.config.max_turns,
        };
        Ok(transcript.finalize(
            mystery.enigma().to_string(),
            mystery.solution().to_string(),
            verdict,
            meta,
        ))
    }

    /// Ask the Narrator to invent the mystery.
    async fn generate_mystery(&self) -> Result<Mystery, ProviderError> {
        let request = self.request(prompts::narrator_system(), prompts::MYSTERY_GENERATION_PROMPT);
        let object = self.narrator.generate_structured(&request).await?;

        let enigma = object.get(prompts::ENIGMA_KEY).and_then(|v| v.as_str());
        let solution = object.get(prompts::SOLUTION_KEY).and_then(|v| v.as_str());
        match (enigma, solution) {
            (Some(enigma), Some(solution)) => Ok(Mystery::new(enigma, solution)),
            _ => Err(ProviderError::Parse {
                raw: serde_json::Value::Object(object).to_string(),
            }),
        }
    }

    /// One interrogation iteration: question, then answer.
    ///
    /// The question is held locally until the answer also succeeds; a
    /// failure on either side drops the whole iteration and the
    /// transcript stays untouched.
    async fn play_turn(&self, iteration: u32, mystery: &Mystery, transcript: &mut Transcript) {
        let request = self.request(
            prompts::investigator_system(),
            prompts::investigator_question(mystery.enigma(), &transcript.render_history()),
        );
        let question = match self.investigator.generate_text(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                self.skip_turn(iteration, Role::Investigator, &err);
                return;
            }
        };
        self.sink.publish(&GameEvent::QuestionAsked {
            iteration,
            max_turns: self.config.max_turns,
            question: question.clone(),
        });

        let request = self.request(
            prompts::narrator_system(),
            prompts::narrator_answer(mystery, &question),
        );
        let answer = match self.narrator.generate_text(&request).await {
            Ok(raw) => CanonicalAnswer::canonicalize(&raw),
            Err(err) => {
                self.skip_turn(iteration, Role::Narrator, &err);
                return;
            }
        };
        self.sink
            .publish(&GameEvent::AnswerGiven { iteration, answer });

        transcript.commit_turn(question, answer);
    }

    /// Ask the Investigator for its final hypothesis.
    ///
    /// Degrades to the [`ERROR_RESOLUTION`] sentinel on failure.
    async fn resolve(&self, mystery: &Mystery, transcript: &Transcript) -> String {
        let request = self.request(
            prompts::investigator_system(),
            prompts::investigator_resolution(mystery.enigma(), &transcript.render_history()),
        );
        match self.investigator.generate_text(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                tracing::warn!(phase = %GamePhase::Resolving, role = %Role::Investigator,
                    error = %err, "resolution failed, recording sentinel");
                ERROR_RESOLUTION.to_string()
            }
        }
    }

    /// Ask the Narrator to judge the finished game.
    ///
    /// Degrades to [`Verdict::Error`] on a call failure; an
    /// unrecognized reply from a successful call normalizes to Loser.
    async fn judge(&self, mystery: &Mystery, transcript: &Transcript) -> Verdict {
        // The judge speaks as Narrator only, without the common preamble.
        let request = self.request(
            prompts::NARRATOR_SYSTEM_PROMPT,
            prompts::narrator_judge(mystery, &transcript.render_history()),
        );
        match self.narrator.generate_text(&request).await {
            Ok(raw) => Verdict::normalize(&raw),
            Err(err) => {
                tracing::warn!(phase = %GamePhase::Judging, role = %Role::Narrator,
                    error = %err, "judging failed, recording error verdict");
                Verdict::Error
            }
        }
    }

    fn request(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> GenerationRequest {
        GenerationRequest::new(system_prompt, user_prompt)
            .with_options(self.config.options.clone())
    }

    fn enter(&self, phase: GamePhase) {
        tracing::debug!(%phase, policy = ?phase.failure_policy(), "entering phase");
        self.sink.publish(&GameEvent::PhaseEntered { phase });
    }

    fn skip_turn(&self, iteration: u32, role: Role, err: &ProviderError) {
        tracing::warn!(phase = %GamePhase::Interrogating, %role, iteration, error = %err,
            "turn skipped, nothing appended to transcript");
        self.sink.publish(&GameEvent::TurnSkipped {
            iteration,
            role,
            cause: err.to_string(),
        });
    }
}

fn provider_label(provider: &dyn AiProvider) -> String {
    format!("{} ({})", provider.name(), provider.model())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Map, Value as JsonValue};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock provider replaying a script of canned results and
    /// recording every request it receives.
    struct ScriptedProvider {
        text: Mutex<VecDeque<Result<String, ProviderError>>>,
        structured: Mutex<VecDeque<Result<Map<String, JsonValue>, ProviderError>>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                text: Mutex::new(VecDeque::new()),
                structured: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn text_ok(self, reply: &str) -> Self {
            self.text.lock().unwrap().push_back(Ok(reply.to_string()));
            self
        }

        fn text_err(self, err: ProviderError) -> Self {
            self.text.lock().unwrap().push_back(Err(err));
            self
        }

        fn structured_ok(self, object: JsonValue) -> Self {
            let map = object.as_object().expect("object literal").clone();
            self.structured.lock().unwrap().push_back(Ok(map));
            self
        }

        fn structured_err(self, err: ProviderError) -> Self {
            self.structured.lock().unwrap().push_back(Err(err));
            self
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn text_calls(&self) -> usize {
            self.requests().len()
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        async fn generate_text(
            &self,
            request: &GenerationRequest,
        ) -> Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            self.text
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Http("script exhausted".into())))
        }

        async fn generate_structured(
            &self,
            request: &GenerationRequest,
        ) -> Result<Map<String, JsonValue>, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            self.structured
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Http("script exhausted".into())))
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    /// Sink recording every published event.
    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<GameEvent>>,
    }

    impl EventSink for RecordingSink {
        fn publish(&self, event: &GameEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    impl RecordingSink {
        fn phases(&self) -> Vec<GamePhase> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    GameEvent::PhaseEntered { phase } => Some(*phase),
                    _ => None,
                })
                .collect()
        }
    }

    const GOLDFISH_OBJECT: &str = r#"{
        "enigma": "A man is found dead in a locked room with a fountain of water.",
        "solucion": "He is a goldfish; the room is an aquarium."
    }"#;

    fn goldfish_json() -> JsonValue {
        serde_json::from_str(GOLDFISH_OBJECT).unwrap()
    }

    fn config(max_turns: u32) -> GameConfig {
        GameConfig {
            max_turns,
            options: GenerationOptions::default(),
        }
    }

    #[tokio::test]
    async fn one_turn_game_produces_one_completed_turn() {
        let narrator = Arc::new(
            ScriptedProvider::new()
                .structured_ok(goldfish_json())
                .text_ok("No, definitivamente no") // answer to the question
                .text_ok("GANADOR"), // verdict
        );
        let investigator = Arc::new(
            ScriptedProvider::new()
                .text_ok("Is the victim human?")
                .text_ok("The victim was a goldfish in an aquarium."),
        );

        let orchestrator =
            GameOrchestrator::new(narrator.clone(), investigator.clone(), config(1));
        let record = orchestrator.run().await.unwrap();

        assert_eq!(record.turns.len(), 1);
        assert_eq!(record.turns[0].index, 1);
        assert_eq!(record.turns[0].question, "Is the victim human?");
        assert_eq!(record.turns[0].answer, CanonicalAnswer::No);
        assert_eq!(record.verdict, Verdict::Winner);
        assert_eq!(
            record.resolution,
            "The victim was a goldfish in an aquarium."
        );
    }

    #[tokio::test]
    async fn failed_investigator_iteration_appends_nothing() {
        let narrator = Arc::new(
            ScriptedProvider::new()
                .structured_ok(goldfish_json())
                .text_ok("sí") // only the surviving iteration reaches the narrator
                .text_ok("PERDEDOR"),
        );
        let investigator = Arc::new(
            ScriptedProvider::new()
                .text_err(ProviderError::Http("connection reset".into()))
                .text_ok("Is the room full of water?")
                .text_ok("final hypothesis"),
        );

        let orchestrator =
            GameOrchestrator::new(narrator.clone(), investigator.clone(), config(2));
        let record = orchestrator.run().await.unwrap();

        // The failed iteration left no hole: one turn, indexed 1.
        assert_eq!(record.turns.len(), 1);
        assert_eq!(record.turns[0].index, 1);
        assert_eq!(record.turns[0].answer, CanonicalAnswer::Yes);

        // max_turns interrogation calls plus one resolution call,
        // regardless of how many iterations failed.
        assert_eq!(investigator.text_calls(), 3);
    }

    #[tokio::test]
    async fn failed_narrator_answer_drops_the_turn() {
        let narrator = Arc::new(
            ScriptedProvider::new()
                .structured_ok(goldfish_json())
                .text_err(ProviderError::Api {
                    status: 500,
                    message: "overloaded".into(),
                })
                .text_ok("PERDEDOR"),
        );
        let investigator = Arc::new(
            ScriptedProvider::new()
                .text_ok("Is the victim human?")
                .text_ok("no idea"),
        );

        let orchestrator = GameOrchestrator::new(narrator, investigator, config(1));
        let record = orchestrator.run().await.unwrap();

        assert!(record.turns.is_empty());
        assert_eq!(record.verdict, Verdict::Loser);
    }

    #[tokio::test]
    async fn prose_only_mystery_aborts_with_no_transcript() {
        let narrator = Arc::new(ScriptedProvider::new().structured_err(ProviderError::Parse {
            raw: "I would love to, but I cannot produce JSON today.".into(),
        }));
        let investigator = Arc::new(ScriptedProvider::new());
        let sink = Arc::new(RecordingSink::default());

        let orchestrator = GameOrchestrator::new(narrator, investigator.clone(), config(3))
            .with_event_sink(sink.clone());
        let result = orchestrator.run().await;

        assert!(matches!(result, Err(GameError::MysteryGeneration(_))));
        // The investigator was never consulted.
        assert_eq!(investigator.text_calls(), 0);
        assert_eq!(
            sink.phases(),
            vec![GamePhase::GeneratingMystery, GamePhase::Aborted]
        );
    }

    #[tokio::test]
    async fn generation_reply_missing_keys_is_fatal() {
        let narrator = Arc::new(
            ScriptedProvider::new().structured_ok(json!({"enigma": "half a mystery"})),
        );
        let investigator = Arc::new(ScriptedProvider::new());

        let orchestrator = GameOrchestrator::new(narrator, investigator, config(1));
        match orchestrator.run().await {
            Err(GameError::MysteryGeneration(ProviderError::Parse { raw })) => {
                assert!(raw.contains("half a mystery"));
            }
            other => panic!("expected fatal parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolution_failure_degrades_to_sentinel() {
        let narrator = Arc::new(
            ScriptedProvider::new()
                .structured_ok(goldfish_json())
                .text_ok("no")
                .text_ok("PERDEDOR"),
        );
        let investigator = Arc::new(
            ScriptedProvider::new()
                .text_ok("Is the victim human?")
                .text_err(ProviderError::Timeout(std::time::Duration::from_secs(60))),
        );

        let orchestrator = GameOrchestrator::new(narrator, investigator, config(1));
        let record = orchestrator.run().await.unwrap();

        assert_eq!(record.resolution, ERROR_RESOLUTION);
        // A degraded resolution still reaches judgment.
        assert_eq!(record.verdict, Verdict::Loser);
    }

    #[tokio::test]
    async fn judging_failure_yields_error_verdict() {
        let narrator = Arc::new(
            ScriptedProvider::new()
                .structured_ok(goldfish_json())
                .text_ok("no")
                .text_err(ProviderError::Http("gone away".into())),
        );
        let investigator = Arc::new(
            ScriptedProvider::new()
                .text_ok("Is the victim human?")
                .text_ok("a goldfish"),
        );

        let orchestrator = GameOrchestrator::new(narrator, investigator, config(1));
        let record = orchestrator.run().await.unwrap();

        assert_eq!(record.verdict, Verdict::Error);
        assert_eq!(record.turns.len(), 1);
    }

    #[tokio::test]
    async fn investigator_requests_never_contain_the_solution() {
        let narrator = Arc::new(
            ScriptedProvider::new()
                .structured_ok(goldfish_json())
                .text_ok("no")
                .text_ok("no")
                .text_ok("GANADOR"),
        );
        let investigator = Arc::new(
            ScriptedProvider::new()
                .text_ok("Is the victim human?")
                .text_ok("Is the room underwater?")
                .text_ok("It was a goldfish."),
        );

        let orchestrator = GameOrchestrator::new(narrator, investigator.clone(), config(2));
        orchestrator.run().await.unwrap();

        let solution = "He is a goldfish; the room is an aquarium.";
        for request in investigator.requests() {
            assert!(
                !request.system_prompt.contains(solution)
                    && !request.user_prompt.contains(solution),
                "secret solution leaked into an Investigator prompt"
            );
        }
    }

    #[tokio::test]
    async fn unrecognized_verdict_reply_normalizes_to_loser() {
        let narrator = Arc::new(
            ScriptedProvider::new()
                .structured_ok(goldfish_json())
                .text_ok("no")
                .text_ok("El investigador estuvo cerca, pero no."),
        );
        let investigator = Arc::new(
            ScriptedProvider::new()
                .text_ok("Is the victim human?")
                .text_ok("hypothesis"),
        );

        let orchestrator = GameOrchestrator::new(narrator, investigator, config(1));
        let record = orchestrator.run().await.unwrap();
        assert_eq!(record.verdict, Verdict::Loser);
    }
}
