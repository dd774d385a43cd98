//! Config command - inspect and edit the lendoc configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use lendoc_core::models::config::{LendocConfig, Provider};

use super::load_config;

/// Settings that hold credentials and are never printed.
const SECRET_KEYS: [&str; 2] = ["model.api_key", "model.access_token"];

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration (file plus environment overrides)
    Show,

    /// Write a configuration file with default settings
    Init(InitArgs),

    /// Print one effective setting (e.g., "model.location")
    Get {
        /// Dotted setting name
        key: String,
    },

    /// Change one setting in the configuration file
    Set {
        /// Dotted setting name
        key: String,
        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Endpoint the new file targets
    #[arg(long, value_enum, default_value = "vertex")]
    provider: ProviderArg,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ProviderArg {
    GeminiApi,
    Vertex,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::GeminiApi => Provider::GeminiApi,
            ProviderArg::Vertex => Provider::Vertex,
        }
    }
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let file = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(config_path),
        ConfigCommand::Init(init_args) => init_config(&file, init_args),
        ConfigCommand::Get { key } => get_config(config_path, &key),
        ConfigCommand::Set { key, value } => set_config(&file, &key, &value),
        ConfigCommand::Path => show_path(&file),
    }
}

/// `<config_dir>/lendoc/config.json`, or `LENDOC_CONFIG` when set.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("LENDOC_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lendoc")
        .join("config.json")
}

fn show_config(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&redacted(&config)?)?);

    let ready = match config.model.provider {
        Provider::GeminiApi => config.model.api_key.is_some(),
        Provider::Vertex => config.model.access_token.is_some(),
    };
    if !ready {
        eprintln!(
            "{} No credentials for the configured provider; set {}.",
            style("⚠").yellow(),
            credential_var(config.model.provider)
        );
    }

    Ok(())
}

fn init_config(path: &Path, args: InitArgs) -> anyhow::Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut config = LendocConfig::default();
    config.model.provider = args.provider.into();
    config.save(path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    println!(
        "  Credentials are read from {}; keep them out of the file.",
        credential_var(config.model.provider)
    );

    Ok(())
}

fn get_config(config_path: Option<&str>, key: &str) -> anyhow::Result<()> {
    check_key(key)?;
    let config = load_config(config_path)?;
    let json = redacted(&config)?;

    let value = lookup(&json, key).unwrap_or(&Value::Null);
    match value {
        Value::String(s) => println!("{}", s),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }

    Ok(())
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = if path.exists() {
        LendocConfig::from_file(path)?
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        LendocConfig::default()
    };

    let updated = apply_setting(&config, key, value)?;
    updated.save(path)?;

    let shown = if SECRET_KEYS.contains(&key) {
        "\"***\"".to_string()
    } else {
        serde_json::to_string(lookup(&serde_json::to_value(&updated)?, key).unwrap_or(&Value::Null))?
    };
    println!("{} Set {} = {}", style("✓").green(), key, shown);

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'lendoc config init' to create a configuration file.");
    }

    Ok(())
}

fn credential_var(provider: Provider) -> &'static str {
    match provider {
        Provider::GeminiApi => "GEMINI_API_KEY",
        Provider::Vertex => "VERTEX_AI_ACCESS_TOKEN",
    }
}

/// Every dotted setting name, credentials included.
fn known_keys() -> Vec<String> {
    let mut full = LendocConfig::default();
    full.model.api_key = Some(String::new());
    full.model.access_token = Some(String::new());

    let mut keys = Vec::new();
    if let Ok(Value::Object(sections)) = serde_json::to_value(&full) {
        for (section, fields) in sections {
            if let Value::Object(fields) = fields {
                keys.extend(fields.keys().map(|field| format!("{}.{}", section, field)));
            }
        }
    }
    keys
}

fn check_key(key: &str) -> anyhow::Result<()> {
    if known_keys().iter().any(|k| k == key) {
        Ok(())
    } else {
        anyhow::bail!(
            "Unknown configuration key: {} (known keys: {})",
            key,
            known_keys().join(", ")
        )
    }
}

/// `config` with `key` replaced by `value`, validated against the config types.
fn apply_setting(config: &LendocConfig, key: &str, value: &str) -> anyhow::Result<LendocConfig> {
    check_key(key)?;
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;

    let parsed: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(config)?;
    json.get_mut(section)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration section: {}", section))?
        .insert(field.to_string(), parsed);

    serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, value, e))
}

/// Config as JSON with credentials masked.
fn redacted(config: &LendocConfig) -> anyhow::Result<Value> {
    let mut json = serde_json::to_value(config)?;
    for key in SECRET_KEYS {
        let (section, field) = key.split_once('.').unwrap_or((key, ""));
        if let Some(slot) = json.get_mut(section).and_then(|s| s.get_mut(field)) {
            *slot = Value::String("***".to_string());
        }
    }
    Ok(json)
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_include_credentials() {
        let keys = known_keys();
        assert!(keys.contains(&"model.location".to_string()));
        assert!(keys.contains(&"model.api_key".to_string()));
        assert!(keys.contains(&"documents.first_page_only".to_string()));
    }

    #[test]
    fn test_set_typed_values() {
        let config = LendocConfig::default();
        let config = apply_setting(&config, "model.provider", "gemini_api").unwrap();
        let config = apply_setting(&config, "model.max_output_tokens", "4096").unwrap();
        let config = apply_setting(&config, "documents.first_page_only", "false").unwrap();

        assert_eq!(config.model.provider, Provider::GeminiApi);
        assert_eq!(config.model.max_output_tokens, 4096);
        assert!(!config.documents.first_page_only);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let err = apply_setting(&LendocConfig::default(), "model.temprature", "0.2").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key: model.temprature"));
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let err = apply_setting(&LendocConfig::default(), "model.provider", "openai").unwrap_err();
        assert!(err.to_string().starts_with("Invalid value for model.provider: openai"));

        let err =
            apply_setting(&LendocConfig::default(), "model.max_output_tokens", "many").unwrap_err();
        assert!(err.to_string().starts_with("Invalid value for model.max_output_tokens"));
    }

    #[test]
    fn test_redacted_masks_credentials() {
        let mut config = LendocConfig::default();
        config.model.api_key = Some("AIza-secret".to_string());

        let json = redacted(&config).unwrap();
        assert_eq!(json["model"]["api_key"], "***");
        assert!(json["model"].get("access_token").is_none());
        assert!(!json.to_string().contains("AIza-secret"));
        assert_eq!(json["model"]["location"], "asia-south1");
    }

    #[test]
    fn test_lookup_nested() {
        let json = redacted(&LendocConfig::default()).unwrap();
        assert_eq!(lookup(&json, "model.model"), Some(&Value::from("gemini-1.5-pro-002")));
        assert_eq!(lookup(&json, "model.nope"), None);
    }
}
