use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelectionConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            seed: default_seed(),
        }
    }
}

fn default_max_results() -> usize {
    50
}
fn default_seed() -> u64 {
    7
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SummaryConfig {
    /// Optional override for the built-in prompt template.
    #[serde(default)]
    pub prompt_template_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            reasoning_effort: default_reasoning_effort(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_reasoning_effort() -> String {
    "low".to_string()
}
fn default_temperature() -> f64 {
    1.0
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// A minimal config for paths that don't need a config file (tests,
    /// degenerate commands). Generation stays disabled.
    #[allow(dead_code)]
    pub fn minimal() -> Self {
        Self {
            corpus: CorpusConfig {
                path: PathBuf::from("cellartracker.txt"),
            },
            selection: SelectionConfig::default(),
            summary: SummaryConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate selection
    if config.selection.max_results == 0 {
        anyhow::bail!("selection.max_results must be > 0");
    }

    // Validate generation
    if config.generation.is_enabled() && config.generation.model.is_none() {
        anyhow::bail!(
            "generation.model must be specified when provider is '{}'",
            config.generation.provider
        );
    }

    match config.generation.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    match config.generation.reasoning_effort.as_str() {
        "minimal" | "low" | "medium" | "high" => {}
        other => anyhow::bail!(
            "Unknown reasoning effort: '{}'. Must be minimal, low, medium, or high.",
            other
        ),
    }

    Ok(config)
}
