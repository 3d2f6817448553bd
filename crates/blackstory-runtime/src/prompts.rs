//! Game prompts for the two agents.
//!
//! The prompt stack is layered: a common system prompt shared by both
//! roles, a role-specific system prompt, and a per-phase task prompt.
//! Builders interpolate game state; only Narrator-facing builders take
//! the secret solution.

use blackstory_core::Mystery;

/// Shared system prompt: concise, role-bound, no pleasantries.
pub const COMMON_SYSTEM_PROMPT: &str = "Eres una IA participando en un juego de misterio 'Black Stories'. Sé conciso y céntrate estrictamente en tu rol. No añadas saludos ni texto innecesario.";

/// Narrator system prompt: guardian of the secret.
pub const NARRATOR_SYSTEM_PROMPT: &str = "Tu rol es ser el 'Narrador'. Eres el guardián del secreto. Nunca des pistas. Eres estricto, literal y misterioso. Nunca rompas las reglas del juego.";

/// Investigator system prompt: methodical yes/no questioner.
pub const INVESTIGATOR_SYSTEM_PROMPT: &str = "Tu rol es ser el 'Investigador'. Eres lógico, metódico y brillante. Tu objetivo es descubrir la verdad haciendo preguntas inteligentes de sí/no.";

/// Mystery-generation task prompt. The structured call extracts the
/// `enigma` and `solucion` keys from the reply.
pub const MYSTERY_GENERATION_PROMPT: &str = r#"
Rol: Eres un maestro de las 'Black Stories'. Tu trabajo es inventar un misterio macabro, inteligente e inesperado.
Tarea: Debes generar una historia con una premisa (enigma) corta y una solución (historia completa) que no sea obvia.
Formato OBLIGATORIO: Responde SOLAMENTE con un objeto JSON válido, sin ningún texto antes ni después. El JSON debe tener dos claves: `enigma` (string) y `solucion` (string).
"#;

/// JSON key for the public premise in the generation reply.
pub const ENIGMA_KEY: &str = "enigma";

/// JSON key for the secret solution in the generation reply.
pub const SOLUTION_KEY: &str = "solucion";

/// Full system prompt for the Narrator role.
pub fn narrator_system() -> String {
    format!("{COMMON_SYSTEM_PROMPT}\n{NARRATOR_SYSTEM_PROMPT}")
}

/// Full system prompt for the Investigator role.
pub fn investigator_system() -> String {
    format!("{COMMON_SYSTEM_PROMPT}\n{INVESTIGATOR_SYSTEM_PROMPT}")
}

/// Task prompt asking the Investigator for its next yes/no question.
///
/// Receives only public state: the enigma and the completed history.
pub fn investigator_question(enigma: &str, history: &str) -> String {
    format!(
        r#"
Rol: Eres un detective brillante resolviendo un misterio.
Reglas: Tu única herramienta son preguntas de 'sí' o 'no'. El Narrador solo puede responder 'sí', 'no', o 'no es relevante'. No hagas preguntas abiertas.
Contexto: Este es el enigma: `{enigma}`. Este es el historial de la investigación: `{history}`.
Tarea: Basándote en todo lo anterior, formula tu siguiente pregunta de 'sí' o 'no'. Responde SOLAMENTE con la pregunta, sin texto adicional.
"#
    )
}

/// Task prompt asking the Narrator to answer one question.
///
/// This is a Narrator-facing builder: it reads the secret solution.
pub fn narrator_answer(mystery: &Mystery, question: &str) -> String {
    format!(
        r#"
Rol: Eres el Narrador de una 'Black Stories'. Eres un guardián del secreto.
Reglas: Tu única respuesta permitida es ESTRICTAMENTE una de estas tres opciones: `sí`, `no`, `no es relevante`. No puedes dar pistas, ni explicaciones. Si la pregunta es parcialmente cierta, pero no del todo, responde `no`.
Contexto: Esta es la solución secreta que SÓLO TÚ CONOCES: `{solution}`.
Tarea: El investigador acaba de hacer esta pregunta: `{question}`. Compara la pregunta con la solución secreta y responde ESTRICTAMENTE con `sí`, `no`, o `no es relevante`. Responde SOLAMENTE con una de esas tres palabras.
"#,
        solution = mystery.solution(),
    )
}

/// Task prompt asking the Investigator for its final hypothesis.
///
/// Receives only public state, like the question prompt.
pub fn investigator_resolution(enigma: &str, history: &str) -> String {
    format!(
        r#"
Rol: Eres un detective brillante resolviendo un misterio.
Contexto: Este es el enigma: `{enigma}`. Este es el historial completo de la investigación: `{history}`.
Tarea: La investigación ha terminado. Expón tu hipótesis final sobre lo que realmente ocurrió, en un párrafo breve. Responde SOLAMENTE con la hipótesis.
"#
    )
}

/// Task prompt asking the Narrator to judge the finished game.
///
/// Narrator-facing: reads the secret solution. Used with
/// [`NARRATOR_SYSTEM_PROMPT`] alone, without the common preamble.
pub fn narrator_judge(mystery: &Mystery, history: &str) -> String {
    format!(
        r#"
Rol: Eres el Juez del juego 'Black Stories'.
Contexto: La partida ha terminado. Vas a decidir si el Investigador ha ganado o perdido.
Información: Esta es la solución secreta: `{solution}`.
Historial: Este es el historial completo de preguntas y respuestas: `{history}`.
Tarea: Compara el historial con la solución. Si el Investigador ha descubierto los puntos clave de la solución (incluso si no ha adivinado cada detalle), ha ganado. Si se ha quedado lejos o ha seguido pistas falsas, ha perdido.
Formato OBLIGATORIO: Responde SOLAMENTE con la palabra `GANADOR` o la palabra `PERDEDOR`.
"#,
        solution = mystery.solution(),
    )
}
