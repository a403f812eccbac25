//! Validated run configuration
//!
//! Everything the action needs is resolved here, once, before any network
//! call is made. A missing required input is a fatal `ConfigError`.

use std::time::Duration;

use crate::providers::ProviderModelConfig;
use crate::secrets::SecretStore;
use crate::types::{SamplingParams, ToolChoice};

use super::traits::{ConfigError, ConfigResult, InputSource};

/// Action input names
pub mod inputs {
    pub const OPENAI_BASE_URL: &str = "openai_base_url";
    pub const OPENAI_API_KEY: &str = "openai_api_key";
    pub const OPENAI_MODEL: &str = "openai_model";
    pub const OPENAI_TEMPERATURE: &str = "openai_temperature";
    pub const OPENAI_TOP_P: &str = "openai_top_p";
    pub const OPENAI_FREQUENCY_PENALTY: &str = "openai_frequency_penalty";
    pub const OPENAI_PRESENCE_PENALTY: &str = "openai_presence_penalty";
    pub const SYSTEM_PROMPT: &str = "system_prompt";
    pub const USER_INPUT: &str = "user_input";
    pub const GITHUB_TOKEN: &str = "github_token";
    pub const AVAILABLE_TOOLS: &str = "available_tools";
    pub const MAX_TURNS: &str = "max_turns";
    pub const REQUEST_TIMEOUT_SECS: &str = "request_timeout_secs";
    pub const TOOL_CHOICE: &str = "tool_choice";
}

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TOOLS: &str = "closeIssue,lockIssue,commentIssue";
pub const DEFAULT_MAX_TURNS: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Everything one run needs, already validated
#[derive(Clone)]
pub struct RunConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub sampling: SamplingParams,
    pub system_prompt: String,
    pub user_input: String,
    pub github_token: String,
    /// Enabled operation names, in the order given, without duplicates
    pub enabled_operations: Vec<String>,
    /// Upper bound on model calls per run
    pub max_turns: usize,
    /// Timeout applied to each model and GitHub call
    pub request_timeout: Duration,
    /// Whether the model may, must, or must not call operations
    pub tool_choice: ToolChoice,
    /// Optional inputs that were present but ignored
    pub warnings: Vec<String>,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("sampling", &self.sampling)
            .field("system_prompt_len", &self.system_prompt.len())
            .field("user_input_len", &self.user_input.len())
            .field("github_token", &"<redacted>")
            .field("enabled_operations", &self.enabled_operations)
            .field("max_turns", &self.max_turns)
            .field("request_timeout", &self.request_timeout)
            .field("tool_choice", &self.tool_choice)
            .finish()
    }
}

impl RunConfig {
    /// Resolve and validate the configuration.
    ///
    /// `secrets` is consulted only when the API key or the token input is
    /// empty.
    pub fn resolve(source: &dyn InputSource, secrets: &dyn SecretStore) -> ConfigResult<Self> {
        let mut warnings = Vec::new();

        let api_base = source
            .get(inputs::OPENAI_BASE_URL)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = source
            .get(inputs::OPENAI_API_KEY)
            .or_else(|| secrets.get("openai"))
            .ok_or_else(|| ConfigError::MissingInput(inputs::OPENAI_API_KEY.to_string()))?;

        let model = source
            .get(inputs::OPENAI_MODEL)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut sampling = SamplingParams::default();
        sampling.temperature = optional_number(source, inputs::OPENAI_TEMPERATURE, &mut warnings);
        sampling.top_p = optional_number(source, inputs::OPENAI_TOP_P, &mut warnings);
        sampling.frequency_penalty =
            optional_number(source, inputs::OPENAI_FREQUENCY_PENALTY, &mut warnings);
        sampling.presence_penalty =
            optional_number(source, inputs::OPENAI_PRESENCE_PENALTY, &mut warnings);

        let system_prompt = required(source, inputs::SYSTEM_PROMPT)?;
        let user_input = required(source, inputs::USER_INPUT)?;

        let github_token = source
            .get(inputs::GITHUB_TOKEN)
            .or_else(|| secrets.get("github"))
            .ok_or_else(|| ConfigError::MissingInput(inputs::GITHUB_TOKEN.to_string()))?;

        let tools = source
            .get(inputs::AVAILABLE_TOOLS)
            .unwrap_or_else(|| DEFAULT_TOOLS.to_string());
        let enabled_operations = parse_tool_list(&tools);
        if enabled_operations.is_empty() {
            return Err(ConfigError::invalid(
                inputs::AVAILABLE_TOOLS,
                "no operation names given",
            ));
        }

        let max_turns = positive_integer(source, inputs::MAX_TURNS)?
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_TURNS);
        let timeout_secs = positive_integer(source, inputs::REQUEST_TIMEOUT_SECS)?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let tool_choice = match source.get(inputs::TOOL_CHOICE) {
            Some(raw) => raw
                .parse::<ToolChoice>()
                .map_err(|message| ConfigError::invalid(inputs::TOOL_CHOICE, message))?,
            None => ToolChoice::default(),
        };

        Ok(Self {
            api_base,
            api_key,
            model,
            sampling,
            system_prompt,
            user_input,
            github_token,
            enabled_operations,
            max_turns,
            request_timeout: Duration::from_secs(timeout_secs),
            tool_choice,
            warnings,
        })
    }

    /// Model settings for the provider
    pub fn model_config(&self) -> ProviderModelConfig {
        ProviderModelConfig::new(&self.model)
            .with_api_key(&self.api_key)
            .with_api_base(&self.api_base)
    }
}

fn required(source: &dyn InputSource, name: &str) -> ConfigResult<String> {
    source
        .get(name)
        .ok_or_else(|| ConfigError::MissingInput(name.to_string()))
}

/// Sampling inputs are lenient: anything that is not a finite number means
/// "use the provider default".
fn optional_number(source: &dyn InputSource, name: &str, warnings: &mut Vec<String>) -> Option<f64> {
    let raw = source.get(name)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warnings.push(format!("{name}: ignoring non-numeric value {raw:?}"));
            None
        }
    }
}

fn positive_integer(source: &dyn InputSource, name: &str) -> ConfigResult<Option<u64>> {
    let Some(raw) = source.get(name) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(name, "must be greater than zero")),
        Ok(n) => Ok(Some(n)),
        Err(e) => Err(ConfigError::invalid(name, e.to_string())),
    }
}

/// Split a comma-separated operation list.
///
/// Items are trimmed, empty items skipped, and repeats dropped so the model
/// never sees the same function twice.
pub fn parse_tool_list(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !names.iter().any(|n| n == item) {
            names.push(item.to_string());
        }
    }
    names
}
