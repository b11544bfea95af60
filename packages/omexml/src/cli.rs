//! Command-line interface for converting and inspecting OME-XML documents.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use serde::Serialize;

use crate::config::ParseOptions;
use crate::error::Result;
use crate::model::GraphSummary;
use crate::parse::{parse_document_with_options, ParsedModel};
use crate::schema::Schema;
use crate::serialize::to_xml_string;

/// OME-XML object-graph mapper - parse, link and re-serialize OME-XML.
#[derive(Parser)]
#[command(name = "omexml")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a document, resolve its references and write it back out.
    Convert {
        /// Input XML file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat element name mismatches and unresolved references as errors
        #[arg(long)]
        strict: bool,

        /// Leave out child entities that fail to parse
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Print a summary of the entities and links in a document.
    Inspect {
        /// Input XML file
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Summary printed by `inspect --json`.
#[derive(Debug, Serialize)]
struct InspectReport {
    #[serde(flatten)]
    summary: GraphSummary,
    warnings: Vec<String>,
    unresolved: Vec<String>,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            strict,
            skip_invalid,
        } => {
            let options = ParseOptions::default()
                .with_strict_tag_names(strict)
                .with_skip_invalid_entities(skip_invalid);
            convert_command(&input, output.as_deref(), options, strict)
        }
        Commands::Inspect { input, json } => inspect_command(&input, json),
    }
}

fn load(input: &Path, options: ParseOptions) -> Result<ParsedModel<'static>> {
    let xml = std::fs::read_to_string(input)?;
    parse_document_with_options(&xml, Schema::v2010_04(), options)
}

fn report_problems(parsed: &ParsedModel<'_>) {
    for warning in &parsed.warnings {
        eprintln!("{} {}", style("warning:").yellow().bold(), warning);
    }
    for error in &parsed.resolution.errors {
        eprintln!("{} {}", style("unresolved:").red().bold(), error);
    }
}

/// Execute the convert command.
fn convert_command(
    input: &Path,
    output: Option<&Path>,
    options: ParseOptions,
    require_resolved: bool,
) -> Result<()> {
    let parsed = load(input, options)?;
    report_problems(&parsed);
    let parsed = if require_resolved {
        parsed.ensure_resolved()?
    } else {
        parsed
    };

    let xml = to_xml_string(&parsed.graph)?;
    match output {
        Some(path) => {
            std::fs::write(path, xml)?;
            println!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => print!("{xml}"),
    }
    Ok(())
}

/// Execute the inspect command.
fn inspect_command(input: &Path, json: bool) -> Result<()> {
    let parsed = load(input, ParseOptions::default())?;
    let summary = parsed.graph.summary();

    if json {
        let report = InspectReport {
            summary,
            warnings: parsed.warnings.iter().map(ToString::to_string).collect(),
            unresolved: parsed
                .resolution
                .errors
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", style("Document").bold(), style(input.display()).cyan());
    println!("  Entities: {}", summary.entities);
    for (kind, count) in &summary.kinds {
        println!("    {kind}: {count}");
    }
    println!("  References: {}", summary.references);
    println!("  Identified: {}", summary.identified);
    if !parsed.warnings.is_empty() {
        println!("  Warnings: {}", style(parsed.warnings.len()).yellow().bold());
    }
    if !parsed.resolution.is_complete() {
        println!(
            "  Unresolved: {}",
            style(parsed.resolution.errors.len()).red().bold()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::parse_from(["omexml", "convert", "plate.xml"]);

        let Commands::Convert {
            input,
            output,
            strict,
            skip_invalid,
        } = cli.command
        else {
            panic!("expected convert");
        };
        assert_eq!(input, PathBuf::from("plate.xml"));
        assert!(output.is_none());
        assert!(!strict);
        assert!(!skip_invalid);
    }

    #[test]
    fn test_cli_parse_convert_with_flags() {
        let cli = Cli::parse_from([
            "omexml",
            "convert",
            "plate.xml",
            "-o",
            "out.xml",
            "--strict",
            "--skip-invalid",
        ]);

        let Commands::Convert {
            output,
            strict,
            skip_invalid,
            ..
        } = cli.command
        else {
            panic!("expected convert");
        };
        assert_eq!(output, Some(PathBuf::from("out.xml")));
        assert!(strict);
        assert!(skip_invalid);
    }

    #[test]
    fn test_cli_parse_inspect() {
        let cli = Cli::parse_from(["omexml", "inspect", "plate.xml", "--json"]);

        let Commands::Inspect { input, json } = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(input, PathBuf::from("plate.xml"));
        assert!(json);
    }
}
