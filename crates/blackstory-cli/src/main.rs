use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use blackstory_core::TranscriptSink;
use blackstory_runtime::{GameConfig, GameOrchestrator, ProviderRegistry, BACKEND_KINDS};

mod console;
mod report;

use console::ConsoleSink;
use report::MarkdownSink;

#[derive(Parser, Debug)]
#[command(name = "blackstory", version, about = "BlackStory AI: an AI-driven mystery game")]
struct Cli {
    /// Backend for the Narrator AI
    #[arg(long, value_name = "BACKEND", default_value = "gemini",
          value_parser = PossibleValuesParser::new(BACKEND_KINDS))]
    provider_narrador: String,

    /// Model name for the Narrator
    #[arg(long, value_name = "MODEL", default_value = "gemini-1.5-flash")]
    model_narrador: String,

    /// Backend for the Investigator AI
    #[arg(long, value_name = "BACKEND", default_value = "gemini",
          value_parser = PossibleValuesParser::new(BACKEND_KINDS))]
    provider_investigador: String,

    /// Model name for the Investigator
    #[arg(long, value_name = "MODEL", default_value = "gemini-1.5-flash")]
    model_investigador: String,

    /// Maximum number of questions before the solution is revealed
    #[arg(long, default_value_t = 15)]
    turnos: u32,

    /// Directory for saved game transcripts
    #[arg(long, value_name = "DIR", default_value = "historial_partidas")]
    out_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let registry = ProviderRegistry::with_defaults();
    let narrator = registry
        .create(&cli.provider_narrador, &cli.model_narrador)
        .context("could not construct the Narrator provider")?;
    let investigator = registry
        .create(&cli.provider_investigador, &cli.model_investigador)
        .context("could not construct the Investigator provider")?;

    println!("=== Iniciando BlackStory AI ===");
    println!("Narrador: {} ({})", cli.provider_narrador, cli.model_narrador);
    println!(
        "Investigador: {} ({})",
        cli.provider_investigador, cli.model_investigador
    );
    println!("Turnos máximos: {}\n", cli.turnos);

    let config = GameConfig {
        max_turns: cli.turnos,
        ..GameConfig::default()
    };
    let orchestrator = GameOrchestrator::new(narrator, investigator, config)
        .with_event_sink(Arc::new(ConsoleSink));

    let record = orchestrator
        .run()
        .await
        .context("the game aborted before producing a transcript")?;

    println!("\n=== La Verdad Revelada ===");
    println!("{}", record.solution);

    let sink = MarkdownSink::new(&cli.out_dir);
    let path = sink
        .persist(&record)
        .context("could not save the game transcript")?;
    println!("\nTranscripción guardada en: {}", path.display());

    Ok(())
}
