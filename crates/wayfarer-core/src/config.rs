use std::fmt;
use std::time::Duration;

use crate::generator::ModelParams;

/// Generator configuration: credentials, endpoint and model parameters.
///
/// Loaded once at startup and shared read-only by every agent.
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Bearer token for the completions endpoint.
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API, without the endpoint path.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one generator call, applied by the agent.
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &str = "gpt-4";
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 2000;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Build a config with the given key and every other field defaulted.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// The model parameters sent with each request.
    pub fn params(&self) -> ModelParams {
        ModelParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let cfg = GeneratorConfig::new("sk-test");
        assert_eq!(cfg.base_url, "https://api.openai.com/v1");
        assert_eq!(cfg.model, "gpt-4");
        assert_eq!(cfg.max_tokens, 2000);
        assert_eq!(cfg.timeout, Duration::from_secs(60));
    }

    #[test]
    fn params_mirror_config() {
        let cfg = GeneratorConfig {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            ..GeneratorConfig::new("sk-test")
        };
        let params = cfg.params();
        assert_eq!(params.model, "gpt-4o-mini");
        assert_eq!(params.temperature, 0.2);
        assert_eq!(params.max_tokens, 2000);
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", GeneratorConfig::new("sk-very-secret"));
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
