pub mod gemini;
pub(crate) mod http_errors;
pub mod huggingface;

use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::config::Credential;

/// How the credential travels with the outbound request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Appended as `?key=<credential>`.
    QueryKey(String),
    /// Sent as `Authorization: Bearer <credential>`.
    Bearer(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QueryKey(_) => f.write_str("QueryKey(<redacted>)"),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// A fully built provider call. `url` never carries the credential.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: String,
    pub auth: Auth,
    pub body: Value,
}

/// Remote completion APIs with their request and response shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    HuggingFace,
}

impl Provider {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            other => Err(anyhow!(
                "Unsupported LLM_PROVIDER='{}'. Supported providers: gemini, huggingface.",
                other
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::HuggingFace => "huggingface",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            Self::Gemini => gemini::API_KEY_ENV,
            Self::HuggingFace => huggingface::API_TOKEN_ENV,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => gemini::DEFAULT_MODEL,
            Self::HuggingFace => huggingface::DEFAULT_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => gemini::DEFAULT_BASE_URL,
            Self::HuggingFace => huggingface::DEFAULT_BASE_URL,
        }
    }

    pub fn endpoint(&self, base_url: &str, model: &str) -> String {
        match self {
            Self::Gemini => gemini::endpoint(base_url, model),
            Self::HuggingFace => huggingface::endpoint(base_url, model),
        }
    }

    pub fn build_request(
        &self,
        endpoint: &str,
        credential: &Credential,
        prompt: &str,
    ) -> OutboundRequest {
        let (auth, body) = match self {
            Self::Gemini => (
                Auth::QueryKey(credential.expose().to_string()),
                gemini::request_body(prompt),
            ),
            Self::HuggingFace => (
                Auth::Bearer(credential.expose().to_string()),
                huggingface::request_body(prompt),
            ),
        };

        OutboundRequest {
            url: endpoint.to_string(),
            auth,
            body,
        }
    }

    /// Pulls the answer text out of a decoded response body, if the shape matches.
    pub fn extract_answer(&self, body: &Value) -> Option<String> {
        match self {
            Self::Gemini => gemini::extract_answer(body),
            Self::HuggingFace => huggingface::extract_answer(body),
        }
    }
}
