use anyhow::Result;
use std::fmt;
use tracing::{debug, warn};

use crate::config::{Config, Credential};
use crate::providers::Provider;
use crate::transport::{HttpTransport, Transport};

/// Result of one question sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answer(String),
    /// No credential was passed or configured; nothing was sent.
    NoCredential { env_var: &'static str },
    TransportError(String),
    /// The call succeeded but the answer field was missing. Holds the raw body.
    UnexpectedShape(String),
}

impl QueryOutcome {
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer(_))
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answer(text) => f.write_str(text),
            Self::NoCredential { env_var } => write!(
                f,
                "Error: No API key provided. Please set {env_var} in .env. \
                 (Mock Response: This is a simulated answer.)"
            ),
            Self::TransportError(detail) => write!(f, "Request failed: {detail}"),
            Self::UnexpectedShape(raw_body) => {
                write!(f, "API Error: Unexpected response format. {raw_body}")
            }
        }
    }
}

pub struct QueryClient<T = HttpTransport> {
    provider: Provider,
    endpoint: String,
    credential: Option<Credential>,
    transport: T,
}

impl QueryClient<HttpTransport> {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let transport = HttpTransport::new(cfg.timeout_secs)?;
        Ok(Self::with_transport(cfg, transport))
    }
}

impl<T> QueryClient<T> {
    pub fn with_transport(cfg: &Config, transport: T) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.provider.endpoint(&cfg.base_url, &cfg.model),
            credential: cfg.credential.clone(),
            transport,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// An explicit non-empty credential wins over the configured one.
    fn resolve_credential(&self, explicit: Option<&str>) -> Option<Credential> {
        explicit
            .and_then(Credential::new)
            .or_else(|| self.credential.clone())
    }
}

impl<T> QueryClient<T>
where
    T: Transport,
{
    /// Sends `prompt` to the provider. Never fails: every error becomes an outcome.
    pub async fn query(&self, prompt: &str, credential: Option<&str>) -> QueryOutcome {
        let Some(credential) = self.resolve_credential(credential) else {
            debug!(
                provider = self.provider.as_str(),
                env_var = self.provider.credential_env_var(),
                "no credential available, returning mock response"
            );
            return QueryOutcome::NoCredential {
                env_var: self.provider.credential_env_var(),
            };
        };

        let request = self
            .provider
            .build_request(&self.endpoint, &credential, prompt);
        debug!(
            provider = self.provider.as_str(),
            api_url = %self.endpoint,
            prompt_len = prompt.len(),
            "dispatching llm query"
        );

        let body = match self.transport.post_json(request).await {
            Ok(body) => body,
            Err(err) => return QueryOutcome::TransportError(format!("{err:#}")),
        };

        match self.provider.extract_answer(&body) {
            Some(answer) => {
                debug!(answer_len = answer.len(), "extracted llm answer");
                QueryOutcome::Answer(answer)
            }
            None => {
                warn!(
                    provider = self.provider.as_str(),
                    "llm response did not match the expected shape"
                );
                QueryOutcome::UnexpectedShape(body.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{QueryClient, QueryOutcome};
    use crate::config::Config;
    use crate::providers::{Auth, OutboundRequest, Provider};
    use crate::transport::{Transport, TransportFuture};

    #[derive(Debug)]
    enum StubOutcome {
        Ok(Value),
        Err(String),
    }

    #[derive(Debug)]
    struct StubTransport {
        calls: AtomicUsize,
        requests: Mutex<Vec<OutboundRequest>>,
        outcome: StubOutcome,
    }

    impl StubTransport {
        fn ok(body: Value) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                outcome: StubOutcome::Ok(body),
            }
        }

        fn err(message: impl Into<String>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                outcome: StubOutcome::Err(message.into()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for StubTransport {
        fn post_json<'a>(&'a self, request: OutboundRequest) -> TransportFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests
                .lock()
                .expect("requests lock should not be poisoned")
                .push(request);
            let result = match &self.outcome {
                StubOutcome::Ok(body) => Ok(body.clone()),
                StubOutcome::Err(message) => Err(anyhow!(message.clone())),
            };
            Box::pin(async move { result })
        }
    }

    fn test_config(provider: Provider, credential: Option<&str>) -> Config {
        let mut vars = vec![("LLM_PROVIDER", provider.as_str().to_string())];
        if let Some(value) = credential {
            vars.push((provider.credential_env_var(), value.to_string()));
        }
        Config::from_env_with(|key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.clone())
        })
        .expect("test config should load")
    }

    fn gemini_success(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
    }

    #[tokio::test]
    async fn missing_credential_returns_mock_without_network_call() {
        let client = QueryClient::with_transport(
            &test_config(Provider::Gemini, None),
            StubTransport::ok(gemini_success("unused")),
        );

        let outcome = client.query("anything", None).await;

        assert_eq!(
            outcome,
            QueryOutcome::NoCredential {
                env_var: "GEMINI_API_KEY"
            }
        );
        assert!(outcome.to_string().contains("Mock Response"));
        assert!(outcome.to_string().contains("GEMINI_API_KEY"));
        assert_eq!(client.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_explicit_credential_falls_back_to_missing() {
        let client = QueryClient::with_transport(
            &test_config(Provider::Gemini, None),
            StubTransport::ok(gemini_success("unused")),
        );

        let outcome = client.query("anything", Some("")).await;

        assert!(matches!(outcome, QueryOutcome::NoCredential { .. }));
        assert_eq!(client.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn success_returns_extracted_text_unmodified() {
        let answer = "  Rust is a systems language.\n\n- fast\n- safe  ";
        let client = QueryClient::with_transport(
            &test_config(Provider::Gemini, None),
            StubTransport::ok(gemini_success(answer)),
        );

        let outcome = client.query("What is Rust?", Some("valid-key")).await;

        assert_eq!(outcome, QueryOutcome::Answer(answer.to_string()));
        assert_eq!(outcome.to_string(), answer);
        assert_eq!(client.transport.call_count(), 1);
    }

    #[tokio::test]
    async fn explicit_credential_overrides_configured_one() {
        let client = QueryClient::with_transport(
            &test_config(Provider::Gemini, Some("configured-key")),
            StubTransport::ok(gemini_success("ok")),
        );

        client.query("hi", Some("explicit-key")).await;
        client.query("hi", None).await;

        let requests = client
            .transport
            .requests
            .lock()
            .expect("requests lock should not be poisoned");
        assert_eq!(requests[0].auth, Auth::QueryKey("explicit-key".to_string()));
        assert_eq!(requests[1].auth, Auth::QueryKey("configured-key".to_string()));
        assert_eq!(
            requests[0].body,
            json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }

    #[tokio::test]
    async fn transport_failure_is_reported_not_raised() {
        let client = QueryClient::with_transport(
            &test_config(Provider::Gemini, Some("valid-key")),
            StubTransport::err("LLM request failed with status 500 Internal Server Error: boom"),
        );

        let outcome = client.query("hi", None).await;

        assert!(matches!(outcome, QueryOutcome::TransportError(_)));
        let text = outcome.to_string();
        assert!(text.starts_with("Request failed: "), "unexpected text: {text}");
        assert!(text.contains("500"), "unexpected text: {text}");
        assert_eq!(client.transport.call_count(), 1);
    }

    #[tokio::test]
    async fn unexpected_shape_embeds_raw_body() {
        let client = QueryClient::with_transport(
            &test_config(Provider::Gemini, Some("valid-key")),
            StubTransport::ok(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        );

        let outcome = client.query("hi", None).await;

        assert!(matches!(outcome, QueryOutcome::UnexpectedShape(_)));
        let text = outcome.to_string();
        assert!(text.contains("Unexpected response format"), "unexpected text: {text}");
        assert!(text.contains("blockReason"), "unexpected text: {text}");
        assert!(text.contains("SAFETY"), "unexpected text: {text}");
    }

    #[tokio::test]
    async fn huggingface_provider_uses_bearer_and_list_shape() {
        let client = QueryClient::with_transport(
            &test_config(Provider::HuggingFace, Some("hf_token")),
            StubTransport::ok(json!([{"generated_text": "Paris"}])),
        );

        let outcome = client.query("Capital of France?", None).await;

        assert_eq!(outcome, QueryOutcome::Answer("Paris".to_string()));
        let requests = client
            .transport
            .requests
            .lock()
            .expect("requests lock should not be poisoned");
        assert_eq!(requests[0].auth, Auth::Bearer("hf_token".to_string()));
        assert_eq!(requests[0].body, json!({"inputs": "Capital of France?"}));
        assert_eq!(
            client.endpoint(),
            "https://api-inference.huggingface.co/models/google/flan-t5-large"
        );
        assert_eq!(requests[0].url, client.endpoint());
    }

    #[test]
    fn only_answer_counts_as_answer() {
        assert!(QueryOutcome::Answer("x".to_string()).is_answer());
        assert!(!QueryOutcome::TransportError("x".to_string()).is_answer());
        assert!(!QueryOutcome::UnexpectedShape("{}".to_string()).is_answer());
    }
}
