use crate::utils::error::{HubError, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// TLS postures tried in order for one outbound call, strongest first.
/// Several of the upstream government endpoints terminate TLS on appliances
/// that a strict default handshake refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPosture {
    Default,
    Tls12Compat,
    Insecure,
}

impl TlsPosture {
    pub const CASCADE: [TlsPosture; 3] = [
        TlsPosture::Default,
        TlsPosture::Tls12Compat,
        TlsPosture::Insecure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TlsPosture::Default => "default",
            TlsPosture::Tls12Compat => "tls12_compat",
            TlsPosture::Insecure => "insecure",
        }
    }

    fn build_client(&self, timeout: Duration) -> reqwest::Result<Client> {
        let builder = Client::builder().timeout(timeout).use_rustls_tls();
        match self {
            TlsPosture::Default => builder,
            TlsPosture::Tls12Compat => builder.min_tls_version(reqwest::tls::Version::TLS_1_2),
            TlsPosture::Insecure => builder.danger_accept_invalid_certs(true),
        }
        .build()
    }
}

/// Builds the fully resolved request URL: fixed provider parameters plus the
/// caller's filters, already merged by the adapter.
pub fn resolve_url(base_url: &str, params: &[(String, String)]) -> Result<Url> {
    Url::parse_with_params(base_url, params).map_err(|e| HubError::InvalidConfigValue {
        field: "base_url".to_string(),
        value: base_url.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

/// Transport acquisition for a single call. Candidates are tried in cascade
/// order and the first that completes the HTTP exchange wins; an HTTP error
/// status is a completed exchange, not a transport fault. Posture selection
/// is per-call; a mode that worked for the previous call is not assumed to
/// still work. Clients live inside the call and are dropped on every exit
/// path.
#[derive(Debug, Clone)]
pub struct ClientCascade {
    timeout: Duration,
}

impl ClientCascade {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// GET `url`, substituting progressively weaker TLS postures until one
    /// completes. If every candidate faults, the last fault propagates.
    pub async fn get(&self, url: &Url) -> Result<(TlsPosture, Response)> {
        let mut last_err: Option<reqwest::Error> = None;

        for posture in TlsPosture::CASCADE {
            let client = match posture.build_client(self.timeout) {
                Ok(client) => client,
                Err(e) => {
                    tracing::warn!(mode = posture.as_str(), error = %e, "client build failed");
                    last_err = Some(e);
                    continue;
                }
            };

            match client.get(url.clone()).send().await {
                Ok(response) => {
                    tracing::debug!(
                        mode = posture.as_str(),
                        status = %response.status(),
                        "transport candidate succeeded"
                    );
                    return Ok((posture, response));
                }
                Err(e) => {
                    tracing::warn!(
                        mode = posture.as_str(),
                        error = %e,
                        "transport candidate failed, trying next"
                    );
                    last_err = Some(e);
                }
            }
        }

        // CASCADE is non-empty, so at least one candidate recorded a fault.
        Err(HubError::Transport(
            last_err.expect("cascade attempted at least one candidate"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_resolve_url_merges_params() {
        let params = vec![
            ("pageNo".to_string(), "1".to_string()),
            ("serviceKey".to_string(), "abc".to_string()),
        ];
        let url = resolve_url("https://example.com/api", &params).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api?pageNo=1&serviceKey=abc");
    }

    #[test]
    fn test_resolve_url_rejects_garbage() {
        assert!(resolve_url("not a url", &[]).is_err());
    }

    #[tokio::test]
    async fn test_first_candidate_wins() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/ping");
            then.status(200).body("pong");
        });

        let cascade = ClientCascade::new(Duration::from_secs(5));
        let url = Url::parse(&server.url("/ping")).unwrap();
        let (posture, response) = cascade.get(&url).await.unwrap();

        mock.assert();
        assert_eq!(posture, TlsPosture::Default);
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_http_error_status_is_not_a_transport_fault() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/boom");
            then.status(500);
        });

        let cascade = ClientCascade::new(Duration::from_secs(5));
        let url = Url::parse(&server.url("/boom")).unwrap();
        let (posture, response) = cascade.get(&url).await.unwrap();

        assert_eq!(posture, TlsPosture::Default);
        assert_eq!(response.status(), 500);
    }

    #[tokio::test]
    async fn test_exhausted_cascade_propagates_last_fault() {
        // Nothing listens on this port; every posture faults.
        let cascade = ClientCascade::new(Duration::from_secs(2));
        let url = Url::parse("http://127.0.0.1:1/unreachable").unwrap();
        let err = cascade.get(&url).await.unwrap_err();
        assert!(matches!(err, HubError::Transport(_)));
    }
}
