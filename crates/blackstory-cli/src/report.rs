//! Markdown transcript sink with an embedded mermaid flow diagram.

use blackstory_core::{GameRecord, SinkError, TranscriptSink};
use chrono::Local;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Persists finished games as timestamped markdown reports.
pub struct MarkdownSink {
    dir: PathBuf,
}

impl MarkdownSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn render(record: &GameRecord) -> String {
        let mut out = String::new();

        out.push_str("# BlackStory AI - Transcripción de Partida\n\n");
        let _ = writeln!(
            out,
            "**Fecha:** {}",
            record.finished_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "**Narrador:** {}", record.meta.narrator);
        let _ = writeln!(out, "**Investigador:** {}", record.meta.investigator);
        let _ = writeln!(out, "**Turnos:** {}\n", record.meta.max_turns);

        let _ = writeln!(out, "## Enigma\n{}\n", record.enigma);
        let _ = writeln!(out, "## Solución Secreta\n{}\n", record.solution);

        out.push_str("## Historial de Chat\n");
        for turn in &record.turns {
            let _ = writeln!(out, "- Investigador: {}", turn.question);
            let _ = writeln!(out, "- Narrador: {}", turn.answer);
        }
        let _ = writeln!(out, "- Investigador (Resolución Final): {}", record.resolution);

        let _ = writeln!(out, "\n## Veredicto Final\n{}\n", record.verdict);

        out.push_str("## Diagrama de Flujo (Mermaid)\n```mermaid\n");
        out.push_str(&mermaid_diagram(record));
        out.push_str("```\n");

        out
    }
}

impl TranscriptSink for MarkdownSink {
    fn persist(&self, record: &GameRecord) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.dir)?;
        let filename = format!(
            "partida_{}.md",
            record.finished_at.with_timezone(&Local).format("%Y%m%d_%H%M%S")
        );
        let path = self.dir.join(filename);
        fs::write(&path, Self::render(record))?;
        Ok(path)
    }
}

/// Render the game as a mermaid `graph TD` flow diagram.
fn mermaid_diagram(record: &GameRecord) -> String {
    let mut out = String::new();

    out.push_str("graph TD\n");
    out.push_str("    subgraph Misterio\n");
    out.push_str("        A[Enigma] --> B(Solución Secreta)\n");
    out.push_str("    end\n\n");
    out.push_str("    subgraph Investigación\n");
    out.push_str("        B -- Conocida por Narrador --> C(Narrador)\n");
    out.push_str("        A -- Conocida por Investigador --> D(Investigador)\n");
    out.push_str("    end\n\n");
    out.push_str("    subgraph Turnos\n");
    for turn in &record.turns {
        let _ = writeln!(
            out,
            "        D -- Pregunta {}: {} --> C",
            turn.index,
            sanitize(&turn.question)
        );
        let _ = writeln!(out, "        C -- Respuesta {}: {} --> D", turn.index, turn.answer);
    }
    out.push_str("    end\n\n");
    out.push_str("    subgraph Resultado\n");
    let _ = writeln!(
        out,
        "        D -- Veredicto: {} --> E(Fin de Partida)",
        record.verdict
    );
    out.push_str("    end\n");

    out
}

/// Mermaid edge labels cannot contain newlines.
fn sanitize(text: &str) -> String {
    text.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackstory_core::{CanonicalAnswer, GameMeta, Transcript, Verdict};

    fn sample_record() -> GameRecord {
        let mut transcript = Transcript::new();
        transcript.commit_turn("¿Es humano?", CanonicalAnswer::No);
        transcript.commit_turn("¿Está bajo el agua?", CanonicalAnswer::Yes);
        transcript.set_resolution("Era un pez de colores.");
        transcript.finalize(
            "Un hombre aparece muerto en una habitación cerrada.".into(),
            "Era un pez de colores; la habitación es un acuario.".into(),
            Verdict::Winner,
            GameMeta {
                narrator: "gemini (gemini-1.5-flash)".into(),
                investigator: "ollama (llama3.2)".into(),
                max_turns: 2,
            },
        )
    }

    #[test]
    fn report_contains_every_section() {
        let report = MarkdownSink::render(&sample_record());

        assert!(report.contains("## Enigma"));
        assert!(report.contains("## Solución Secreta"));
        assert!(report.contains("- Investigador: ¿Es humano?"));
        assert!(report.contains("- Narrador: no"));
        assert!(report.contains("Investigador (Resolución Final): Era un pez de colores."));
        assert!(report.contains("## Veredicto Final\nGANADOR"));
        assert!(report.contains("```mermaid"));
    }

    #[test]
    fn diagram_lists_turns_in_order() {
        let diagram = mermaid_diagram(&sample_record());

        let first = diagram.find("Pregunta 1").unwrap();
        let second = diagram.find("Pregunta 2").unwrap();
        assert!(first < second);
        assert!(diagram.contains("Veredicto: GANADOR"));
    }

    #[test]
    fn persist_writes_a_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MarkdownSink::new(dir.path());

        let path = sink.persist(&sample_record()).unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("partida_"));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("# BlackStory AI"));
    }
}
