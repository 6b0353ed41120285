use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use prontuario_core::SummaryConfig;
use prontuario_intake::summarize_record_str;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Texto legado gravado em `ResumoGeralSaude`.
    Text,
    /// Resumo estruturado em JSON.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "prontuario-cli",
    about = "Gera o resumo do prontuário a partir do JSON de cadastro do paciente."
)]
struct Args {
    /// Caminho do arquivo JSON do paciente.
    #[arg(short, long)]
    input: PathBuf,

    /// Data de referência para o cálculo da idade (AAAA-MM-DD). Padrão: hoje.
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<NaiveDate>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn parse_as_of(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| format!("data inválida: {err}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("prontuario=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Não foi possível ler o arquivo {:?}", args.input))?;

    let config = SummaryConfig {
        as_of: args.as_of,
        ..SummaryConfig::default()
    };
    let summary = summarize_record_str(&data, &config)
        .with_context(|| format!("Não foi possível gerar o resumo de {:?}", args.input))?;

    tracing::info!(
        flags = summary.flags.len(),
        lines = summary.narrative_lines.len(),
        "resumo gerado"
    );

    match args.format {
        OutputFormat::Text => println!("{}", summary.text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Falha ao serializar o resumo")?
        ),
    }

    Ok(())
}
