//! Configuration file loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cognitex_core::flows::FlowCatalog;
use cognitex_core::invoker::InvokerSettings;
use cognitex_core::model::Locale;
use cognitex_core::traits::TextGenerator;

use crate::anthropic::AnthropicProvider;
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single generative-text backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    /// Offline canned replies, keyed by flow id.
    Mock {
        #[serde(default)]
        responses: HashMap<String, String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { responses } => f
                .debug_struct("Mock")
                .field("responses", &responses.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level cognitex configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitexConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used when none is given on the command line.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model requested from the provider.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Language of prompts and built-in messages.
    #[serde(default)]
    pub locale: Locale,
    /// Replacement template text keyed by flow id.
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    InvokerSettings::default().model
}
fn default_temperature() -> f64 {
    InvokerSettings::default().temperature
}
fn default_max_tokens() -> u32 {
    InvokerSettings::default().max_tokens
}

impl Default for CognitexConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            locale: Locale::default(),
            templates: HashMap::new(),
        }
    }
}

impl CognitexConfig {
    /// Settings the prompt invoker is built with.
    pub fn invoker_settings(&self) -> InvokerSettings {
        InvokerSettings {
            model: self.default_model.clone(),
            temperature: self.default_temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// The flow catalog for `locale` with configured template overrides applied.
    pub fn flow_catalog(&self, locale: Locale) -> FlowCatalog {
        FlowCatalog::new(locale).with_template_overrides(&self.templates)
    }

    /// Look up a provider by name.
    ///
    /// `ollama` and `mock` work without a config entry since they need no
    /// credentials.
    pub fn provider_config(&self, name: &str) -> Result<ProviderConfig> {
        if let Some(config) = self.providers.get(name) {
            return Ok(config.clone());
        }
        match name {
            "ollama" => Ok(ProviderConfig::Ollama {
                base_url: default_ollama_url(),
            }),
            "mock" => Ok(ProviderConfig::Mock {
                responses: HashMap::new(),
            }),
            _ => anyhow::bail!(
                "provider '{name}' is not configured (run `cognitex init` or set COGNITEX_{}_KEY)",
                name.to_uppercase()
            ),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as is; references inside them are not
/// expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(&api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
            org_id: org_id.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(&api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(&base_url),
        },
        mock @ ProviderConfig::Mock { .. } => mock,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `cognitex.toml` in the current directory
/// 2. `~/.config/cognitex/config.toml`
///
/// Environment variable overrides: `COGNITEX_OPENAI_KEY`, `COGNITEX_ANTHROPIC_KEY`.
pub fn load_config() -> Result<CognitexConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CognitexConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => default_config_path(),
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CognitexConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CognitexConfig::default(),
    };

    apply_key_overrides(
        &mut config,
        std::env::var("COGNITEX_OPENAI_KEY").ok(),
        std::env::var("COGNITEX_ANTHROPIC_KEY").ok(),
    );

    config.providers = config
        .providers
        .into_iter()
        .map(|(k, v)| (k, resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from("cognitex.toml");
    if local.exists() {
        return Some(local);
    }
    let global = dirs_path()?.join("config.toml");
    global.exists().then_some(global)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("cognitex"))
}

fn apply_key_overrides(
    config: &mut CognitexConfig,
    openai_key: Option<String>,
    anthropic_key: Option<String>,
) {
    if let Some(key) = anthropic_key {
        let entry = config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Anthropic { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Some(key) = openai_key {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }
}

/// Create a generator instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn TextGenerator>> {
    tracing::debug!(provider = name, ?config, "creating provider");
    let provider: Box<dyn TextGenerator> = match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            Box::new(AnthropicProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        )?),
        ProviderConfig::Ollama { base_url } => Box::new(OllamaProvider::new(base_url)?),
        ProviderConfig::Mock { responses } => Box::new(MockProvider::canned(responses.clone())),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognitex_core::flows::FlowKind;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_COGNITEX_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_COGNITEX_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_COGNITEX_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no ${closing"), "no ${closing");
        std::env::remove_var("_COGNITEX_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_expanded_again() {
        std::env::set_var("_COGNITEX_TEST_SELF", "${_COGNITEX_TEST_SELF}");
        std::env::set_var("_COGNITEX_TEST_OTHER", "a}b");
        assert_eq!(
            resolve_env_vars("${_COGNITEX_TEST_SELF}"),
            "${_COGNITEX_TEST_SELF}"
        );
        assert_eq!(
            resolve_env_vars("${_COGNITEX_TEST_OTHER}-${_COGNITEX_TEST_UNSET}-x"),
            "a}b--x"
        );
        std::env::remove_var("_COGNITEX_TEST_SELF");
        std::env::remove_var("_COGNITEX_TEST_OTHER");
    }

    #[test]
    fn default_config() {
        let config = CognitexConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4.1-mini");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
default_provider = "anthropic"
default_model = "claude-sonnet-4-20250514"
default_temperature = 0.3
locale = "vi"

[providers.anthropic]
type = "anthropic"
api_key = "sk-test"

[providers.openai]
type = "openai"
api_key = "sk-openai"

[providers.ollama]
type = "ollama"

[providers.offline]
type = "mock"
responses = { provideMotivationalSupport = '{"message": "hi"}' }

[templates]
provideMoodBasedInsights = "Mood today: {{{mood}}}"
"#;
        let config: CognitexConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 4);
        assert_eq!(config.locale, Locale::Vi);
        assert_eq!(config.max_tokens, 2048);
        assert!(matches!(
            config.providers.get("ollama"),
            Some(ProviderConfig::Ollama { base_url }) if base_url == "http://localhost:11434"
        ));

        let settings = config.invoker_settings();
        assert_eq!(settings.model, "claude-sonnet-4-20250514");
        assert_eq!(settings.temperature, 0.3);

        let catalog = config.flow_catalog(config.locale);
        assert_eq!(
            catalog.get(FlowKind::MoodInsights).template().as_str(),
            "Mood today: {{{mood}}}"
        );
    }

    #[test]
    fn debug_masks_keys() {
        let config = ProviderConfig::OpenAI {
            api_key: "sk-very-secret".into(),
            base_url: None,
            org_id: Some("org-1".into()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("***"));
        assert!(debug.contains("org-1"));
    }

    #[test]
    fn key_overrides_create_or_replace_entries() {
        let mut config = CognitexConfig::default();
        config.providers.insert(
            "openai".into(),
            ProviderConfig::OpenAI {
                api_key: "old".into(),
                base_url: Some("http://proxy".into()),
                org_id: None,
            },
        );

        apply_key_overrides(&mut config, Some("new-openai".into()), Some("new-anthropic".into()));

        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAI { api_key, base_url: Some(url), .. })
                if api_key == "new-openai" && url == "http://proxy"
        ));
        assert!(matches!(
            config.providers.get("anthropic"),
            Some(ProviderConfig::Anthropic { api_key, .. }) if api_key == "new-anthropic"
        ));
    }

    #[test]
    fn provider_lookup_falls_back_for_keyless_backends() {
        let config = CognitexConfig::default();
        assert!(matches!(
            config.provider_config("mock").unwrap(),
            ProviderConfig::Mock { .. }
        ));
        assert!(matches!(
            config.provider_config("ollama").unwrap(),
            ProviderConfig::Ollama { .. }
        ));
        let err = config.provider_config("openai").unwrap_err();
        assert!(err.to_string().contains("COGNITEX_OPENAI_KEY"));
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cognitex.toml");
        std::fs::write(
            &path,
            "default_provider = \"mock\"\n\n[providers.ollama]\ntype = \"ollama\"\nbase_url = \"${_COGNITEX_TEST_OLLAMA}\"\n",
        )
        .unwrap();
        std::env::set_var("_COGNITEX_TEST_OLLAMA", "http://gpu-box:11434");

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "mock");
        assert!(matches!(
            config.providers.get("ollama"),
            Some(ProviderConfig::Ollama { base_url }) if base_url == "http://gpu-box:11434"
        ));
        std::env::remove_var("_COGNITEX_TEST_OLLAMA");
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/cognitex.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn mock_provider_from_config() {
        let provider = create_provider(
            "offline",
            &ProviderConfig::Mock {
                responses: HashMap::new(),
            },
        )
        .unwrap();
        assert_eq!(provider.name(), "mock");
    }
}
