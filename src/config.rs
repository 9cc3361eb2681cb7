use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Runtime configuration, loaded from the YAML file named by `WORDAGG_CONFIG`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// zstd-compressed vibrato system dictionary
    pub dictionary: Option<PathBuf>,
    /// part-of-speech value that routes a morpheme into the numeral parser
    pub numeral_tag: String,
    /// upper bound on alias strings produced from one analysis
    pub max_expansions: usize,
    pub features: FeatureFields,
    pub conceptnet: ConceptNetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: None,
            numeral_tag: "数".to_string(),
            max_expansions: 256,
            features: FeatureFields::default(),
            conceptnet: ConceptNetConfig::default(),
        }
    }
}

/// Column indices into a dictionary feature string (IPADIC layout by default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFields {
    pub pos_field: usize,
    pub lemma_field: usize,
    pub reading_field: usize,
}

impl Default for FeatureFields {
    fn default() -> Self {
        Self {
            pos_field: 1,
            lemma_field: 6,
            reading_field: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptNetConfig {
    pub enabled: bool,
    pub base_url: String,
    pub language: String,
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for ConceptNetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.conceptnet.io/".to_string(),
            language: "ja".to_string(),
            limit: 50,
            timeout_secs: 10,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading config {}", path.display()))?;
    let cfg: Config = serde_yaml::from_str(&text)
        .with_context(|| format!("Parsing config {}", path.display()))?;
    Ok(cfg)
}

/// Config file (if any) with environment overrides applied.
pub fn resolve_config() -> Result<Config> {
    let mut cfg = if let Ok(p) = std::env::var("WORDAGG_CONFIG") {
        debug!("Using config file from WORDAGG_CONFIG: {}", p);
        load_config(Path::new(&p))?
    } else {
        debug!("WORDAGG_CONFIG not set, using defaults");
        Config::default()
    };
    apply_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(dict) = var("WORDAGG_DICTIONARY") {
        cfg.dictionary = Some(PathBuf::from(dict));
    }
    if let Some(url) = var("WORDAGG_CONCEPTNET_URL") {
        cfg.conceptnet.base_url = url;
    }
    if var("WORDAGG_OFFLINE").is_some() {
        cfg.conceptnet.enabled = false;
    }
}
