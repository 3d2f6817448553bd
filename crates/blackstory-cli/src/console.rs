//! Console rendering of game progress events.

use blackstory_core::{EventSink, GameEvent, GamePhase};

/// Renders [`GameEvent`]s as plain console lines.
///
/// The orchestrator knows nothing about presentation; this sink is the
/// whole display layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn publish(&self, event: &GameEvent) {
        match event {
            GameEvent::PhaseEntered { phase } => match phase {
                GamePhase::GeneratingMystery => {
                    println!("Narrador pensando el misterio...");
                }
                GamePhase::Interrogating => {
                    println!("\nComienza la investigación...");
                }
                GamePhase::Resolving => {
                    println!("\n--- FIN DE LA PARTIDA ---");
                    println!("Investigador formulando resolución final...");
                }
                GamePhase::Judging => {
                    println!("Narrador emitiendo veredicto...");
                }
                GamePhase::Done | GamePhase::Aborted => {}
            },
            GameEvent::MysteryCreated { enigma } => {
                println!("Misterio creado!\n");
                println!("=== El Misterio ===");
                println!("{enigma}");
            }
            GameEvent::QuestionAsked {
                iteration,
                max_turns,
                question,
            } => {
                println!("\n--- Turno {iteration}/{max_turns} ---");
                println!("Investigador: {question}");
            }
            GameEvent::AnswerGiven { answer, .. } => {
                println!("Narrador: {answer}");
            }
            GameEvent::TurnSkipped {
                iteration,
                role,
                cause,
            } => {
                println!("Turno {iteration} incompleto ({role}): {cause}");
                println!("No se añade al historial.");
            }
            GameEvent::ResolutionProduced { resolution } => {
                println!("\n=== Hipótesis Final ===");
                println!("{resolution}");
            }
            GameEvent::VerdictIssued { verdict } => {
                println!("\nVeredicto: {verdict}");
            }
            GameEvent::GameAborted { cause } => {
                println!("Error al crear el misterio: {cause}");
            }
        }
    }
}
