//! Configuration loading and the provider factory.
//!
//! One `scriptmark.toml` carries both the grading section and the analysis
//! section; the analysis provider is chosen once here, at process
//! configuration time, and handed to the augmenter as a value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use scriptmark_core::engine::GraderConfig;

use crate::augmenter::{AnalysisAugmenter, AnalysisProvider};
use crate::gemini::GeminiProvider;
use crate::mistral::MistralProvider;

/// Configuration for a single analysis provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Mistral {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            ProviderConfig::Mistral {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Mistral")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

/// The `[analysis]` section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Whether the post-grading analysis step runs at all.
    #[serde(default)]
    pub enabled: bool,
    /// Which provider entry to use when enabled.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            providers: HashMap::new(),
        }
    }
}

/// Top-level scriptmark configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptmarkConfig {
    /// Grading engine settings.
    #[serde(default)]
    pub grading: GraderConfig,
    /// Analysis augmenter settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
        } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
        ProviderConfig::Mistral {
            api_key,
            base_url,
            model,
        } => ProviderConfig::Mistral {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `scriptmark.toml` in the current directory
/// 2. `~/.config/scriptmark/config.toml`
///
/// Environment variable overrides: `SCRIPTMARK_GEMINI_KEY`,
/// `SCRIPTMARK_MISTRAL_KEY`.
pub fn load_config() -> Result<ScriptmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ScriptmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("scriptmark.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ScriptmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ScriptmarkConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("SCRIPTMARK_GEMINI_KEY") {
        config
            .analysis
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(ProviderConfig::Gemini { api_key, .. }) =
            config.analysis.providers.get_mut("gemini")
        {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("SCRIPTMARK_MISTRAL_KEY") {
        config
            .analysis
            .providers
            .entry("mistral".into())
            .or_insert(ProviderConfig::Mistral {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(ProviderConfig::Mistral { api_key, .. }) =
            config.analysis.providers.get_mut("mistral")
        {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .analysis
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.analysis.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("scriptmark"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Box<dyn AnalysisProvider> {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            model,
        } => Box::new(GeminiProvider::new(
            api_key,
            base_url.clone(),
            model.clone(),
        )),
        ProviderConfig::Mistral {
            api_key,
            base_url,
            model,
        } => Box::new(MistralProvider::new(
            api_key,
            base_url.clone(),
            model.clone(),
        )),
    }
}

/// Build the augmenter the configuration asks for: disabled when the
/// feature is off, otherwise backed by the selected provider.
pub fn augmenter_from_config(config: &ScriptmarkConfig) -> Result<AnalysisAugmenter> {
    if !config.analysis.enabled {
        return Ok(AnalysisAugmenter::disabled());
    }

    let name = &config.analysis.provider;
    let provider_config = config.analysis.providers.get(name).with_context(|| {
        format!(
            "analysis provider '{}' not found in config. Available: {:?}",
            name,
            config.analysis.providers.keys().collect::<Vec<_>>()
        )
    })?;

    let provider: Arc<dyn AnalysisProvider> = Arc::from(create_provider(provider_config));
    Ok(AnalysisAugmenter::new(provider))
}
