//! Batch command - extract every document of a case manifest.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use lendoc_core::{extract_document, GeminiClient, ResultEnvelope};

use super::extract::{format_envelope, OutputFormat};
use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Case manifest (JSON)
    #[arg(required = true)]
    manifest: PathBuf,

    /// Output directory (default: JSON array on stdout)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document written to the output directory
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of documents extracted at once
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// A case and the documents that belong to it.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub case_id: String,
    pub documents: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub document_type: String,
    pub file_path: PathBuf,
}

impl Manifest {
    /// Read a manifest; relative document paths are taken from the manifest's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut manifest: Manifest = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid manifest {}: {}", path.display(), e))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for entry in &mut manifest.documents {
            if entry.file_path.is_relative() {
                entry.file_path = base.join(&entry.file_path);
            }
        }
        Ok(manifest)
    }
}

/// Result of extracting a single manifest entry.
struct DocumentResult {
    index: usize,
    entry: ManifestEntry,
    envelope: Option<ResultEnvelope>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let manifest = Manifest::load(&args.manifest)?;

    if manifest.documents.is_empty() {
        anyhow::bail!("Manifest lists no documents: {}", args.manifest.display());
    }

    eprintln!(
        "{} Case {}: {} documents to process",
        style("ℹ").blue(),
        manifest.case_id,
        manifest.documents.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(manifest.documents.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")
            .unwrap()
            .progress_chars("=>-"),
    );

    // The blocking HTTP client is created, used and dropped on blocking threads only.
    let service = Arc::new(
        tokio::task::spawn_blocking(move || GeminiClient::from_config(&config)).await??,
    );
    let case_id = manifest.case_id.clone();

    let mut pending = stream::iter(manifest.documents.into_iter().enumerate())
        .map(|(index, entry)| {
            let service = Arc::clone(&service);
            let case_id = case_id.clone();
            let pb = overall_pb.clone();
            async move {
                let file_start = Instant::now();
                let job_entry = entry.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    extract_document(
                        service.as_ref(),
                        &case_id,
                        &job_entry.document_type,
                        &job_entry.file_path,
                    )
                })
                .await;
                pb.inc(1);

                let (envelope, error) = match outcome {
                    Ok(Ok(envelope)) => (Some(envelope), None),
                    Ok(Err(e)) => (None, Some(e.to_string())),
                    Err(e) => (None, Some(format!("extraction task failed: {}", e))),
                };
                DocumentResult {
                    index,
                    entry,
                    envelope,
                    error,
                    processing_time_ms: file_start.elapsed().as_millis() as u64,
                }
            }
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(result) = pending.next().await {
        if let Some(ref message) = result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.entry.file_path.display(), message);
            } else {
                error!("Failed to process {}: {}", result.entry.file_path.display(), message);
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", message);
            }
        }
        results.push(result);
    }
    drop(pending);
    tokio::task::spawn_blocking(move || drop(service)).await?;

    overall_pb.finish_with_message("Complete");
    results.sort_by_key(|r| r.index);

    let successful: Vec<_> = results.iter().filter(|r| r.envelope.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    match &args.output_dir {
        Some(output_dir) => write_outputs(output_dir, &manifest.case_id, &successful, args.format)?,
        None => {
            let envelopes: Vec<_> = successful.iter().filter_map(|r| r.envelope.as_ref()).collect();
            println!("{}", serde_json::to_string_pretty(&envelopes)?);
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed documents:").red());
        for result in &failed {
            eprintln!(
                "  - {} ({}): {}",
                result.entry.file_path.display(),
                result.entry.document_type,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_outputs(
    output_dir: &Path,
    case_id: &str,
    results: &[&DocumentResult],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    for envelope in results.iter().filter_map(|r| r.envelope.as_ref()) {
        let stem = format!("{}_{}", case_id, envelope.document_type());
        let count = seen.entry(stem.clone()).or_insert(0);
        *count += 1;
        let name = if *count == 1 {
            stem
        } else {
            format!("{}_{}", stem, count)
        };

        let output_path = output_dir.join(format!("{}.{}", name, format.extension()));
        fs::write(&output_path, format_envelope(envelope, format)?)?;
        debug!("Wrote output to {}", output_path.display());
    }
    Ok(())
}

/// Number of fields the model actually filled in.
fn filled_fields(envelope: &ResultEnvelope) -> usize {
    envelope
        .extracted_data()
        .flatten()
        .into_iter()
        .filter(|(_, v)| match v {
            Value::String(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Null => false,
            _ => true,
        })
        .count()
}

fn write_summary(path: &Path, results: &[DocumentResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "document_type",
        "file_path",
        "status",
        "fields_filled",
        "fields_total",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let file_path = result.entry.file_path.display().to_string();
        let time = result.processing_time_ms.to_string();
        let (file_path, time) = (file_path.as_str(), time.as_str());

        match &result.envelope {
            Some(envelope) => {
                let filled = filled_fields(envelope).to_string();
                let total = envelope.extracted_data().flatten().len().to_string();
                wtr.write_record([
                    envelope.document_type(),
                    file_path,
                    "success",
                    filled.as_str(),
                    total.as_str(),
                    time,
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    result.entry.document_type.as_str(),
                    file_path,
                    "failed",
                    "",
                    "",
                    time,
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendoc_core::{ExtractorRegistry, ModelResponse, ModelServiceError};
    use serde_json::json;

    #[test]
    fn test_manifest_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        fs::write(
            &path,
            r#"{"case_id": "C-1", "documents": [
                {"document_type": "kyc", "file_path": "docs/id.png"},
                {"document_type": "Legal Report", "file_path": "/abs/report.pdf"}
            ]}"#,
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.case_id, "C-1");
        assert_eq!(manifest.documents[0].file_path, dir.path().join("docs/id.png"));
        assert_eq!(manifest.documents[1].file_path, PathBuf::from("/abs/report.pdf"));
    }

    #[test]
    fn test_manifest_rejects_missing_documents_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        fs::write(&path, r#"{"case_id": "C-1"}"#).unwrap();
        assert!(Manifest::load(&path).is_err());
    }

    #[test]
    fn test_filled_fields_ignores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.png");
        fs::write(&path, b"png").unwrap();

        let service = |_: &Path, _: &str| -> Result<ModelResponse, ModelServiceError> {
            Ok(ModelResponse::structured(
                json!({"name": "Asha Rao", "gender": "", "dob": null}),
                "",
            ))
        };
        let envelope = ExtractorRegistry::builtin()
            .get_extractor("kyc")
            .unwrap()
            .extract_details("C-1", &path, &service)
            .unwrap();

        assert_eq!(filled_fields(&envelope), 1);
    }

    fn stub_result(index: usize, dir: &Path, document_type: &str) -> DocumentResult {
        let file_path = dir.join(format!("doc{}.pdf", index));
        fs::write(&file_path, b"%PDF").unwrap();

        let service = |_: &Path, _: &str| -> Result<ModelResponse, ModelServiceError> {
            Ok(ModelResponse::structured(
                json!({"name": "Asha Rao", "dpn": {"leadID": "L-1"}}),
                "{}",
            ))
        };
        let envelope = extract_document(&service, "C", document_type, &file_path).unwrap();

        DocumentResult {
            index,
            entry: ManifestEntry {
                document_type: document_type.to_string(),
                file_path,
            },
            envelope: Some(envelope),
            error: None,
            processing_time_ms: 5,
        }
    }

    #[test]
    fn test_outputs_suffix_repeated_types() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            stub_result(0, dir.path(), "kyc"),
            stub_result(1, dir.path(), "Agreement"),
            stub_result(2, dir.path(), "KYC"),
        ];
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();

        let refs: Vec<&DocumentResult> = results.iter().collect();
        write_outputs(&out, "C", &refs, OutputFormat::Json).unwrap();

        let mut names: Vec<String> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["C_agreement.json", "C_kyc.json", "C_kyc_2.json"]);

        let second: Value =
            serde_json::from_str(&fs::read_to_string(out.join("C_kyc_2.json")).unwrap()).unwrap();
        assert_eq!(second["file_path"], json!(dir.path().join("doc2.pdf")));
    }

    #[test]
    fn test_summary_counts_flattened_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut failed = stub_result(1, dir.path(), "kyc");
        failed.envelope = None;
        failed.error = Some("file not found: x.png".to_string());
        let results = vec![stub_result(0, dir.path(), "agreement"), failed];

        let path = dir.path().join("summary.csv");
        write_summary(&path, &results).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);

        assert_eq!(&rows[0][0], "agreement");
        assert_eq!(&rows[0][2], "success");
        assert_eq!(&rows[0][3], "1");
        assert_eq!(&rows[0][4], "6");
        assert_eq!(&rows[0][5], "5");

        assert_eq!(&rows[1][0], "kyc");
        assert_eq!(&rows[1][2], "failed");
        assert_eq!(&rows[1][3], "");
        assert_eq!(&rows[1][6], "file not found: x.png");
    }
}
