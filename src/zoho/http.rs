//! HTTP utilities for Zoho Books REST API calls

use crate::error::{Error, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// HTTP client wrapper for Zoho Books API calls
#[derive(Clone, Debug)]
pub struct ZohoHttpClient {
    client: Client,
}

impl ZohoHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("zohobooks/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::remote(None, format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, auth: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!("GET {}", url);
        let request = self.client.get(url).query(query);
        self.send(request, auth).await
    }

    /// Make a POST request with an optional JSON body
    pub async fn post(
        &self,
        url: &str,
        auth: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!("POST {}", url);
        self.send(self.with_body(Method::POST, url, query, body), auth)
            .await
    }

    /// Make a PUT request with an optional JSON body
    pub async fn put(
        &self,
        url: &str,
        auth: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!("PUT {}", url);
        self.send(self.with_body(Method::PUT, url, query, body), auth)
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, auth: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!("DELETE {}", url);
        let request = self.client.delete(url).query(query);
        self.send(request, auth).await
    }

    fn with_body(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> RequestBuilder {
        let mut request = self.client.request(method, url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    /// Send a request and unwrap the Zoho response envelope
    async fn send(&self, request: RequestBuilder, auth: &str) -> Result<Value> {
        let response = request
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| Error::remote(None, format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                Error::remote(
                    Some(status.as_u16()),
                    format!("Failed to read response body: {}", e),
                )
            })?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            let (code, message) = parse_envelope_error(&body);
            let mut msg = format!("API request failed: {}", status.as_u16());
            if let Some(message) = message {
                msg.push_str(&format!(" - {}", message));
            }
            return Err(Error::api(status.as_u16(), code, msg));
        }

        // Handle empty response
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            Error::remote(
                Some(status.as_u16()),
                format!("Failed to parse response JSON: {}", e),
            )
        })?;

        check_code(status.as_u16(), value)
    }
}

/// Zoho reports application failures with a non-zero `code`, sometimes on a 2xx
fn check_code(status: u16, value: Value) -> Result<Value> {
    match value.get("code").and_then(Value::as_i64) {
        Some(0) | None => Ok(value),
        Some(code) => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            tracing::error!("API returned code {}: {}", code, message);
            Err(Error::api(
                status,
                Some(code),
                format!("API returned code {} - {}", code, message),
            ))
        }
    }
}

fn parse_envelope_error(body: &str) -> (Option<i64>, Option<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return (None, None);
    };
    let code = value.get("code").and_then(Value::as_i64);
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    (code, message)
}

/// Actionable hint for well-known HTTP failures
pub fn hint_for_status(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("Authentication failed. Check access_token or ZOHO_ACCESS_TOKEN."),
        403 => Some("Permission denied. Check the OAuth scopes granted to the token."),
        404 => Some("Resource not found. Check organization_id and api_domain."),
        429 => Some("Rate limit exceeded. Please try again later."),
        500 | 502 | 503 => Some("Zoho Books service temporarily unavailable. Please try again."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = "é".repeat(300);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
    }

    #[test]
    fn test_check_code_passes_success_envelope() {
        let value = json!({"code": 0, "message": "success", "items": []});
        assert_eq!(check_code(200, value.clone()).unwrap(), value);
    }

    #[test]
    fn test_check_code_rejects_nonzero() {
        let err = check_code(200, json!({"code": 1002, "message": "Item does not exist."}))
            .unwrap_err();
        assert_eq!(err.status(), Some(200));
        assert!(err.to_string().contains("Item does not exist."));
    }

    #[test]
    fn test_parse_envelope_error() {
        let (code, message) = parse_envelope_error(r#"{"code":57,"message":"Not authorized"}"#);
        assert_eq!(code, Some(57));
        assert_eq!(message.as_deref(), Some("Not authorized"));
        assert_eq!(parse_envelope_error("<html>"), (None, None));
    }

    #[test]
    fn test_hints() {
        assert!(hint_for_status(401).unwrap().contains("ZOHO_ACCESS_TOKEN"));
        assert!(hint_for_status(418).is_none());
    }
}
