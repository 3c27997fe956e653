//! cognitex-providers — generative-text backends and configuration.
//!
//! Implements the `TextGenerator` trait for OpenAI, Anthropic, Ollama and an
//! offline mock, and loads the `cognitex.toml` that selects between them.

pub mod anthropic;
pub mod config;
pub mod error;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, CognitexConfig, ProviderConfig};
pub use error::ProviderError;
pub use mock::MockProvider;
