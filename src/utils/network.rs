use crate::error::{AnfError, Result};
use reqwest::Client;
use std::time::Duration;

/// Configuration for HTTP client with proper timeouts
pub struct NetworkConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            user_agent: format!("anf-sample/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a properly configured HTTP client with timeouts
pub fn create_http_client(config: &NetworkConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| AnfError::network(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a transport failure into a message naming the management endpoint
pub fn classify_network_error(error: &reqwest::Error, url: &str) -> AnfError {
    let host = extract_host(url);

    if error.is_timeout() {
        return AnfError::network(format!(
            "Request to '{}' timed out. The management endpoint may be unreachable.",
            host
        ));
    }

    if error.is_connect() {
        if error
            .to_string()
            .to_lowercase()
            .contains("connection refused")
        {
            return AnfError::network(format!("Connection to '{}' was refused.", host));
        }

        return AnfError::network(format!(
            "Failed to connect to '{}'. Please check your network connection.",
            host
        ));
    }

    if let Some(status) = error.status() {
        match status.as_u16() {
            503 => {
                return AnfError::network(format!(
                    "'{}' is temporarily unavailable (503). Please try again later.",
                    host
                ))
            }
            502 | 504 => {
                return AnfError::network(format!(
                    "Gateway error ({}) when calling '{}'.",
                    status.as_u16(),
                    host
                ))
            }
            _ => {}
        }
    }

    AnfError::network(format!("Network error when calling '{}': {}", host, error))
}

fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "management endpoint".to_string())
}

/// Check if an error is worth retrying
pub fn is_retryable_error(error: &AnfError) -> bool {
    match error {
        AnfError::NetworkError(msg) => {
            let msg_lower = msg.to_lowercase();
            msg_lower.contains("timed out")
                || msg_lower.contains("temporarily")
                || msg_lower.contains("503")
                || msg_lower.contains("502")
                || msg_lower.contains("504")
        }
        AnfError::AzureApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            msg_lower.contains("http 429")
                || msg_lower.contains("http 503")
                || msg_lower.contains("http 502")
                || msg_lower.contains("http 504")
                || msg_lower.contains("throttled")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host() {
        let url = "https://management.azure.com/subscriptions/x?api-version=2023-11-01";
        assert_eq!(extract_host(url), "management.azure.com");
        assert_eq!(extract_host("not a url"), "management endpoint");
    }

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error(&AnfError::network("request timed out")));
        assert!(is_retryable_error(&AnfError::azure_api("HTTP 429: Too many requests")));
        assert!(!is_retryable_error(&AnfError::azure_api("HTTP 400: bad request")));
        assert!(!is_retryable_error(&AnfError::not_found("vol")));
        assert!(!is_retryable_error(&AnfError::timeout("vol", 3)));
    }
}
