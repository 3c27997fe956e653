//! Subcommand implementations.

pub mod arena;
pub mod chat;
pub mod flows;
pub mod init;
pub mod mood;
pub mod play;
pub mod quest;
pub mod score;
pub mod validate_deck;

use std::sync::Arc;

use anyhow::Result;

use cognitex_core::flows::FlowCatalog;
use cognitex_core::invoker::PromptInvoker;
use cognitex_core::model::Locale;
use cognitex_providers::config::{create_provider, load_config_from};

use crate::ServiceArgs;

/// Everything a command needs to call a flow.
pub struct Runtime {
    pub locale: Locale,
    pub catalog: FlowCatalog,
    pub invoker: PromptInvoker,
}

impl Runtime {
    /// Load config and build the invoker and flow catalog, applying
    /// command-line overrides.
    pub fn load(args: &ServiceArgs) -> Result<Self> {
        let config = load_config_from(args.config.as_deref())?;
        let locale = args.locale.unwrap_or(config.locale);
        let provider_name = args
            .provider
            .clone()
            .unwrap_or_else(|| config.default_provider.clone());

        let provider_config = config.provider_config(&provider_name)?;
        let generator = create_provider(&provider_name, &provider_config)?;

        let mut settings = config.invoker_settings();
        if let Some(model) = &args.model {
            settings.model = model.clone();
        }
        tracing::debug!(provider = %provider_name, model = %settings.model, %locale, "runtime ready");

        Ok(Self {
            locale,
            catalog: config.flow_catalog(locale),
            invoker: PromptInvoker::new(Arc::from(generator), settings),
        })
    }
}
