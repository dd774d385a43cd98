//! Extract command - pull fields out of a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info};

use lendoc_core::{ExtractorRegistry, GeminiClient, ResultEnvelope};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Document file (PDF, image, or DOCX)
    #[arg(required = true)]
    input: PathBuf,

    /// Document type, as a key ("legal_report") or label ("Legal Report")
    #[arg(short = 't', long = "type")]
    document_type: String,

    /// Case identifier stamped on the result
    #[arg(long, default_value = "test_case")]
    case_id: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one row per field)
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Resolve the type first so a typo fails before any network work.
    let extractor = ExtractorRegistry::builtin().get_extractor(&args.document_type)?;
    let document_type = extractor.key();

    info!("Processing {} as {}", args.input.display(), document_type);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb.set_message(format!("Extracting {}...", document_type));

    let case_id = args.case_id.clone();
    let input = args.input.clone();
    // The blocking HTTP client must be created and dropped off the async runtime.
    let envelope = tokio::task::spawn_blocking(move || -> anyhow::Result<ResultEnvelope> {
        let client = GeminiClient::from_config(&config)?;
        Ok(extractor.extract_details(&case_id, &input, &client)?)
    })
    .await??;

    pb.finish_and_clear();

    let output = format_envelope(&envelope, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_envelope(envelope: &ResultEnvelope, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(envelope)?),
        OutputFormat::Csv => format_csv(envelope),
        OutputFormat::Text => Ok(format_text(envelope)),
    }
}

fn format_csv(envelope: &ResultEnvelope) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["case_id", "document_type", "field", "value"])?;

    for (field, value) in envelope.extracted_data().flatten() {
        let shown = display_value(value);
        wtr.write_record([
            envelope.case_id(),
            envelope.document_type(),
            field.as_str(),
            shown.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(envelope: &ResultEnvelope) -> String {
    let mut output = String::new();

    output.push_str(&format!("Case: {}\n", envelope.case_id()));
    output.push_str(&format!("Document type: {}\n", envelope.document_type()));
    output.push_str(&format!("File: {}\n", envelope.file_path().display()));
    output.push('\n');

    let fields = envelope.extracted_data().flatten();
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    output.push_str("Fields:\n");
    for (field, value) in &fields {
        let shown = display_value(value);
        let shown = if shown.is_empty() { "-".to_string() } else { shown };
        output.push_str(&format!("  {:<width$}  {}\n", field, shown, width = width));
    }

    output
}

/// Strings without quotes, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
