use std::fs;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use vizparse::grammar::Semantics;
use vizparse::{interpret, Config, PlotRequest, SchemaContext, VisualizationGrammar};

/// Resultado de una sentencia
#[derive(Debug, Serialize)]
struct Report<'a> {
    query: &'a str,
    score: f64,
    semantics: &'a Semantics,
    plot: Option<PlotRequest>,
    error: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    let context = load_context(&config)?;

    let grammar = match &config.grammar {
        Some(path) => {
            let spec = fs::read_to_string(path)
                .with_context(|| format!("Error leyendo gramática '{}'", path.display()))?;
            VisualizationGrammar::from_spec(&spec)
                .with_context(|| format!("Gramática inválida en '{}'", path.display()))?
        }
        None => VisualizationGrammar::new().context("Gramática incluida inválida")?,
    };

    // Obtener consultas
    let queries: Vec<String> = if let Some(path) = &config.input {
        fs::read_to_string(path)
            .with_context(|| format!("Error leyendo archivo '{}'", path.display()))?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    } else if let Some(query) = &config.query {
        vec![query.clone()]
    } else {
        bail!("No se proporcionó ninguna consulta (use un argumento o --input)");
    };

    let mut reports_json = Vec::new();
    let mut lines = Vec::new();
    for query in &queries {
        for parse in grammar.parse(query, &context) {
            let (plot, error) = match interpret(&parse, &context) {
                Ok(plot) => (Some(plot), None),
                Err(e) => (None, Some(e.to_string())),
            };
            if config.json {
                let report = Report {
                    query,
                    score: parse.score(),
                    semantics: parse.semantics(),
                    plot,
                    error,
                };
                reports_json.push(serde_json::to_value(&report)?);
            } else {
                let kind = match (&plot, &error) {
                    (Some(plot), _) => plot.kind.to_string(),
                    (None, Some(e)) => format!("error: {}", e),
                    (None, None) => String::new(),
                };
                lines.push(format!(
                    "{}\t{:.4}\t{}\t{}",
                    query,
                    parse.score(),
                    kind,
                    parse.semantics_display()
                ));
            }
        }
    }

    let output = if config.json {
        serde_json::to_string_pretty(&reports_json)?
    } else {
        lines.join("\n")
    };

    // Escribir resultado
    match &config.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Error escribiendo archivo '{}'", path.display()))?,
        None => println!("{}", output),
    }
    Ok(())
}

fn load_context(config: &Config) -> Result<SchemaContext> {
    match &config.schema {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Error leyendo esquema '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Esquema JSON inválido en '{}'", path.display()))
        }
        None => Ok(SchemaContext::new(&config.frame, config.columns.iter().cloned())),
    }
}
