//! HTTP transport for the chat and store connectors
//!
//! ## Design Decisions
//!
//! The connectors need four things from HTTP: a method, a URL, an optional
//! body with a content type, and the status plus body of the response.
//! [`HttpTransport`] is exactly that and nothing more, which keeps the
//! connectors testable with a recording fake.
//!
//! ### Status Handling
//!
//! ureq reports 4xx/5xx as errors. [`UreqTransport`] turns them back into
//! [`HttpResponse`]s, so a transport `Err` always means the request never
//! got an answer (DNS, TLS, timeout). The caller decides what a status
//! means: the chat and store writes accept any 2xx, the threshold read
//! requires 200.
//!
//! ### No Retries
//!
//! Delivery is best-effort. A failed request is logged by the connector and
//! the next edge or heartbeat carries fresher state anyway.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("VayuVeer/{}", vayuveer_core::VERSION),
        }
    }
}

impl HttpConfig {
    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Request methods the connectors use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// Outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Full URL; may carry secrets, never log it
    pub url: String,
    pub content_type: Option<&'static str>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            content_type: None,
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, content_type: &'static str, body: String) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            content_type: Some(content_type),
            body: Some(body),
        }
    }

    pub fn put(url: impl Into<String>, content_type: &'static str, body: String) -> Self {
        Self {
            method: HttpMethod::Put,
            url: url.into(),
            content_type: Some(content_type),
            body: Some(body),
        }
    }

    /// Bytes of body sent with this request
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, String::len)
    }
}

/// Response status and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP client seam
pub trait HttpTransport {
    /// Send `request`; any received status is `Ok`
    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

/// [`HttpTransport`] over a ureq agent
///
/// Clones share the agent's connection pool.
#[cfg(feature = "http")]
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl UreqTransport {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build();

        Self { agent }
    }
}

#[cfg(feature = "http")]
impl HttpTransport for UreqTransport {
    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut call = self.agent.request(request.method.as_str(), &request.url);
        if let Some(content_type) = request.content_type {
            call = call.set("Content-Type", content_type);
        }

        let result = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string()?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => Ok(HttpResponse {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(crate::ConnectorError::Transport(e.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = HttpConfig::default().timeout_secs(3).user_agent("probe/1");

        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.user_agent, "probe/1");
    }

    #[test]
    fn test_default_user_agent_carries_version() {
        let config = HttpConfig::default();
        assert!(config.user_agent.starts_with("VayuVeer/"));
        assert!(config.user_agent.ends_with(vayuveer_core::VERSION));
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
    }

    #[test]
    fn test_request_builders() {
        let get = HttpRequest::get("https://example.com/a.json");
        assert_eq!(get.method, HttpMethod::Get);
        assert_eq!(get.body_len(), 0);

        let put = HttpRequest::put("https://example.com/a.json", "application/json", "{}".into());
        assert_eq!(put.method.as_str(), "PUT");
        assert_eq!(put.content_type, Some("application/json"));
        assert_eq!(put.body_len(), 2);
    }
}
