//! Contract-checked invocation of the generative-text service.
//!
//! A [`PromptContract`] pairs an input schema, an output schema, and a
//! template. [`PromptInvoker::invoke`] validates the input, renders the
//! template, submits it, and validates the response before deserializing it
//! into the caller's output type. There are no retries and no caching here;
//! callers decide what to do with a failure.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::InvokeError;
use crate::schema::Schema;
use crate::template::Template;
use crate::traits::{extract_json_payload, GenerateRequest, TextGenerator};

/// One generative flow: what goes in, what must come out, and the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContract {
    name: String,
    input_schema: Schema,
    output_schema: Schema,
    template: Template,
}

impl PromptContract {
    pub fn new(
        name: impl Into<String>,
        input_schema: Schema,
        output_schema: Schema,
        template: Template,
    ) -> Self {
        Self {
            name: name.into(),
            input_schema,
            output_schema,
            template,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The same contract with different prompt text.
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    /// Template placeholders that no input field can fill.
    pub fn unbound_placeholders(&self) -> Vec<String> {
        let fields = self.input_schema.field_names();
        self.template
            .placeholders()
            .into_iter()
            .filter(|p| !fields.contains(p))
            .map(str::to_string)
            .collect()
    }
}

/// Sampling settings applied to every request.
#[derive(Debug, Clone)]
pub struct InvokerSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for InvokerSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

/// Submits contracts to a [`TextGenerator`].
#[derive(Clone)]
pub struct PromptInvoker {
    generator: Arc<dyn TextGenerator>,
    settings: InvokerSettings,
}

impl PromptInvoker {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: InvokerSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &InvokerSettings {
        &self.settings
    }

    /// Invoke `contract` with a typed input and deserialize the typed output.
    pub async fn invoke<I, O>(&self, contract: &PromptContract, input: &I) -> Result<O, InvokeError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let input = serde_json::to_value(input).map_err(|e| InvokeError::SchemaValidation {
            contract: contract.name().to_string(),
            reason: format!("input is not serializable: {e}"),
        })?;

        let output = self.invoke_value(contract, input).await?;

        serde_json::from_value(output).map_err(|e| InvokeError::Upstream {
            contract: contract.name().to_string(),
            reason: format!("response does not match the expected shape: {e}"),
        })
    }

    /// Invoke `contract` with an untyped input and return the validated
    /// output document.
    #[instrument(skip(self, contract, input), fields(contract = %contract.name(), model = %self.settings.model))]
    pub async fn invoke_value(&self, contract: &PromptContract, input: Value) -> Result<Value, InvokeError> {
        let result = self.run_contract(contract, input).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "contract invocation failed");
        }
        result
    }

    async fn run_contract(&self, contract: &PromptContract, input: Value) -> Result<Value, InvokeError> {
        let schema_error = |reason: String| InvokeError::SchemaValidation {
            contract: contract.name().to_string(),
            reason,
        };
        let upstream_error = |reason: String| InvokeError::Upstream {
            contract: contract.name().to_string(),
            reason,
        };

        contract
            .input_schema()
            .validate(&input)
            .map_err(|e| schema_error(e.to_string()))?;

        let Value::Object(fields) = &input else {
            return Err(schema_error("input must be an object".to_string()));
        };
        let rendered_prompt = contract
            .template()
            .render(fields)
            .map_err(|e| schema_error(e.to_string()))?;

        let request = GenerateRequest {
            template_id: contract.name().to_string(),
            rendered_prompt,
            output_schema: contract.output_schema().to_json_schema(),
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let start = Instant::now();
        let response = self
            .generator
            .generate(&request)
            .await
            .map_err(|e| upstream_error(format!("{e:#}")))?;

        let payload = extract_json_payload(&response.content);
        let output: Value = serde_json::from_str(&payload)
            .map_err(|e| upstream_error(format!("response is not valid JSON: {e}")))?;
        contract
            .output_schema()
            .validate(&output)
            .map_err(|e| upstream_error(format!("response violates output schema: {e}")))?;

        tracing::debug!(
            backend = self.generator.name(),
            latency_ms = start.elapsed().as_millis() as u64,
            total_tokens = response.token_usage.total_tokens,
            "contract invoked"
        );
        Ok(output)
    }
}
