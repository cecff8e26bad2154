//! AI providers that turn natural language into PowerShell.
//!
//! Every provider implements [`LlmProvider::complete`]; command generation,
//! explanation and raw questions are built on top of it. Generated commands
//! always pass through the compliance checker before they are returned.

use std::sync::LazyLock;

use regex::Regex;
use termigenius_core::powershell;
use tracing::{debug, warn};

use crate::{config::Settings, context::SystemContext, env::Environment, prompt, Error, Result};

const NO_RESPONSE: &str = "[No response from AI provider]";
const NO_EXPLANATION: &str = "No explanation could be generated.";

/// Trait for AI providers, enables testing with mocks.
pub trait LlmProvider: Send + Sync {
    /// Send a raw prompt and return the response text.
    ///
    /// # Errors
    /// Returns an error if the provider API call fails.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is configured and available.
    fn is_available(&self) -> bool;

    /// Generate a compliant PowerShell command for `request`.
    ///
    /// # Errors
    /// Returns an error if the API call fails or the response holds no command.
    fn generate_command(&self, request: &str, ctx: &SystemContext) -> Result<String> {
        let response = self.complete(&prompt::command_prompt(ctx, request))?;
        let command = extract_command(&response);
        if command.is_empty() {
            return Err(Error::Llm("Empty response from AI provider".into()));
        }

        let verdict = powershell::validate(&command);
        if !verdict.is_valid {
            warn!(reason = %verdict.message, "generated command failed compliance");
        } else if !verdict.issues.is_empty() {
            debug!(reason = %verdict.message, "generated command corrected");
        }
        Ok(verdict.corrected)
    }

    /// Explain what `command` does.
    ///
    /// # Errors
    /// Returns an error if the provider API call fails.
    fn explain_command(&self, command: &str, ctx: &SystemContext) -> Result<String> {
        let response = self.complete(&prompt::explain_prompt(ctx, command))?;
        if response.trim().is_empty() {
            return Ok(NO_EXPLANATION.to_string());
        }
        Ok(response)
    }

    /// Ask a question without any system context.
    ///
    /// # Errors
    /// Returns an error if the provider API call fails.
    fn ask(&self, question: &str) -> Result<String> {
        let response = self.complete(question)?;
        if response.trim().is_empty() {
            return Ok(NO_RESPONSE.to_string());
        }
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// NoOpProvider, fallback when no API key is configured
// ---------------------------------------------------------------------------

/// A provider that refuses every request. Used when no API key is configured.
pub struct NoOpProvider;

impl LlmProvider for NoOpProvider {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::Llm(
            "AI provider is not configured. Set GEMINI_API_KEY or run `termigenius config set-key`"
                .into(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// GeminiProvider, calls the Generative Language API
// ---------------------------------------------------------------------------

#[cfg(feature = "llm")]
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Provider that calls the Gemini `generateContent` API.
#[cfg(feature = "llm")]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "llm")]
impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, settings: &Settings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(settings.llm_timeout_ms))
            .build()?;
        Ok(Self {
            api_key,
            model: settings.model.clone(),
            client,
        })
    }
}

#[cfg(feature = "llm")]
impl LlmProvider for GeminiProvider {
    fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [
                {"parts": [{"text": prompt}]}
            ]
        });

        let resp = self
            .client
            .post(format!("{GEMINI_ENDPOINT}/{}:generateContent", self.model))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()?;

        let status = resp.status();
        let text = resp.text()?;

        if !status.is_success() {
            return Err(Error::Llm(format!("Gemini API error ({status}): {text}")));
        }
        parse_gemini_response(&text)
    }

    fn is_available(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// MockLlmProvider, for testing
// ---------------------------------------------------------------------------

/// A mock provider that returns pre-configured responses.
#[derive(Debug, Clone)]
pub struct MockLlmProvider {
    /// Raw response returned for command generation and questions.
    pub response: String,
    /// Returned by [`LlmProvider::explain_command`].
    pub explanation: String,
    /// When set, every call fails with this message.
    pub error: Option<String>,
    pub available: bool,
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self {
            response: String::new(),
            explanation: String::new(),
            error: None,
            available: true,
        }
    }
}

impl MockLlmProvider {
    /// Mock that answers every prompt with `response`.
    #[must_use]
    pub fn responding(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }
}

impl LlmProvider for MockLlmProvider {
    fn complete(&self, _prompt: &str) -> Result<String> {
        match &self.error {
            Some(message) => Err(Error::Llm(message.clone())),
            None => Ok(self.response.clone()),
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn explain_command(&self, _command: &str, _ctx: &SystemContext) -> Result<String> {
        match &self.error {
            Some(message) => Err(Error::Llm(message.clone())),
            None => Ok(self.explanation.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create an AI provider based on the settings and environment.
///
/// `GEMINI_API_KEY` in the environment wins over the key stored in the
/// settings file. Returns `NoOpProvider` if no key is found.
#[must_use]
pub fn create_provider(settings: &Settings, env: &dyn Environment) -> Box<dyn LlmProvider> {
    let api_key = env
        .var(crate::config::API_KEY_ENV)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .or_else(|| settings.api_key().map(String::from));

    #[cfg_attr(not(feature = "llm"), allow(unused_variables))]
    let Some(key) = api_key else {
        debug!("no AI API key found, using NoOpProvider");
        return Box::new(NoOpProvider);
    };

    match settings.ai_provider.as_str() {
        #[cfg(feature = "llm")]
        "gemini" => match GeminiProvider::new(key, settings) {
            Ok(p) => Box::new(p),
            Err(e) => {
                warn!(error = %e, "failed to create Gemini provider");
                Box::new(NoOpProvider)
            }
        },
        other => {
            warn!(provider = other, "unsupported AI provider, using NoOpProvider");
            Box::new(NoOpProvider)
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing helpers
// ---------------------------------------------------------------------------

/// Concatenate the text parts of the first Gemini candidate.
fn parse_gemini_response(body: &str) -> Result<String> {
    let json: serde_json::Value = serde_json::from_str(body)?;
    let parts = json["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .ok_or_else(|| Error::Llm("Empty response from Gemini".into()))?;

    Ok(parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect::<String>())
}

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[\w-]*\n?(.*?)\n?```").expect("valid regex"));

/// Pull the command out of a model response: the first fenced code block,
/// otherwise the first non-empty line that is not a `#` comment.
#[must_use]
pub fn extract_command(response: &str) -> String {
    if let Some(block) = CODE_BLOCK.captures(response).and_then(|c| c.get(1)) {
        return block.as_str().trim().to_string();
    }
    response
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or_else(|| response.trim())
        .to_string()
}
