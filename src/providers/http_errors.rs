use anyhow::anyhow;
use std::error::Error as StdError;
use std::io::ErrorKind;

fn error_chain_has_kind(
    err: &(dyn StdError + 'static),
    kind: ErrorKind,
    needle: &str,
) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_kind(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_kind(err, ErrorKind::TimedOut, "timed out")
}

/// Maps a reqwest failure to an actionable message.
///
/// The URL is stripped from the error first: the Gemini credential rides in
/// the query string and must not end up in user-visible text.
pub(crate) fn model_api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> anyhow::Error {
    let err = err.without_url();

    if err.is_timeout() || error_chain_has_timeout(&err) {
        return anyhow!(
            "LLM request timed out after {}s while calling '{}'. \
             Increase LLM_TIMEOUT_SECS or check provider responsiveness.",
            timeout_secs,
            api_url
        );
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return anyhow!(
                "Connection refused by LLM API at '{}'. \
                 Ensure the provider is reachable and LLM_BASE_URL is correct.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to LLM API at '{}'. \
             Check LLM_BASE_URL and network connectivity.",
            api_url
        );
    }

    anyhow!("Failed to call LLM API at '{}': {}", api_url, err)
}
