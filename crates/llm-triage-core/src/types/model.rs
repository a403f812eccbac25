//! Model sampling configuration

use serde::{Deserialize, Serialize};

/// Optional sampling parameters forwarded to the model endpoint
///
/// `None` means "use the provider default" and is omitted from requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
}

impl SamplingParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }

    pub fn with_top_p(mut self, value: f64) -> Self {
        self.top_p = Some(value);
        self
    }

    pub fn with_frequency_penalty(mut self, value: f64) -> Self {
        self.frequency_penalty = Some(value);
        self
    }

    pub fn with_presence_penalty(mut self, value: f64) -> Self {
        self.presence_penalty = Some(value);
        self
    }

    /// True when every parameter is left to the provider
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
