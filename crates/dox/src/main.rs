//! dox CLI - documentation-comment XML to Markdown.
//!
//! Converts XML documentation comments (as emitted by a compiler's
//! AST-introspection tool) to Markdown. Reads the given files, or all
//! of stdin as one document when no files are given.

mod error;
mod output;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dox_comment::{DeclarationBuilder, DeclarationExtractor};
use dox_markdown::{CaptureMode, MarkdownConverter};

use error::CliError;
use output::Output;

/// Convert documentation-comment XML to Markdown.
#[derive(Parser)]
#[command(name = "dox", version, about)]
struct Cli {
    /// Input files; with none, reads stdin as one document.
    files: Vec<PathBuf>,

    /// Print only the raw declaration signature.
    #[arg(long, conflicts_with = "json")]
    declaration: bool,

    /// Print the extracted declaration record as JSON.
    #[arg(long)]
    json: bool,

    /// Fail on malformed XML instead of printing partial output.
    #[arg(long)]
    fail_fast: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli, &output) {
        output.error(&err.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli, output: &Output) -> Result<(), CliError> {
    let documents = read_documents(&cli.files)?;
    for xml in &documents {
        process(cli, output, xml)?;
    }
    Ok(())
}

/// Read each input file, or stdin as one document with no files.
fn read_documents(files: &[PathBuf]) -> Result<Vec<String>, CliError> {
    if files.is_empty() {
        let mut xml = String::new();
        std::io::stdin().read_to_string(&mut xml)?;
        return Ok(vec![xml]);
    }
    files
        .iter()
        .map(|path| std::fs::read_to_string(path).map_err(CliError::from))
        .collect()
}

/// Convert one document and print diagnostics plus its output.
fn process(cli: &Cli, output: &Output, xml: &str) -> Result<(), CliError> {
    tracing::debug!(bytes = xml.len(), "converting document");
    let mut converter = MarkdownConverter::new().with_fail_fast(cli.fail_fast);

    if cli.declaration {
        let mut extractor = DeclarationExtractor::new();
        converter.convert(xml, Some(&mut extractor))?;
        report(&mut converter, output);
        output.document(extractor.finish().as_deref().unwrap_or_default());
    } else if cli.json {
        let mut builder = DeclarationBuilder::new();
        converter.convert(xml, Some(&mut builder))?;
        report(&mut converter, output);
        output.document(&serde_json::to_string_pretty(&builder.finish())?);
    } else {
        converter.begin_capture(CaptureMode::Markdown);
        converter.convert(xml, None)?;
        report(&mut converter, output);
        output.document(&converter.end_capture());
    }
    Ok(())
}

/// Print `ERROR:` lines for any diagnostics the conversion recorded.
fn report(converter: &mut MarkdownConverter, output: &Output) {
    for diagnostic in converter.take_diagnostics() {
        output.error(&diagnostic.to_string());
    }
}
