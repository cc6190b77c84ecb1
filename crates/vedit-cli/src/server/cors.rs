//! Origin allow-list for the edit endpoint.
//!
//! Only listed origins get CORS headers; a preflight from any other origin is
//! refused outright.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue};
use regex::Regex;
use vedit_config::ServerConfig;

const ALLOWED_HEADERS: &str = "Content-Type, x-api-key";
const ALLOWED_METHODS: &str = "POST, OPTIONS";

#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    patterns: Vec<Regex>,
}

impl OriginPolicy {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    pub fn from_config(config: &ServerConfig) -> vedit_config::Result<Self> {
        Ok(Self::new(config.compile_origins()?))
    }

    /// Whether `origin` matches one of the anchored patterns.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(origin))
    }

    /// The request's `Origin` header, when it is allowed.
    pub fn allowed_origin<'h>(&self, headers: &'h HeaderMap) -> Option<&'h HeaderValue> {
        headers
            .get(axum::http::header::ORIGIN)
            .filter(|value| value.to_str().is_ok_and(|origin| self.is_allowed(origin)))
    }

    /// Headers for an actual request from an allowed origin.
    pub fn response_headers(&self, origin: &HeaderValue) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
        headers.insert(VARY, HeaderValue::from_static("Origin"));
        headers
    }

    /// Headers answering a preflight from an allowed origin.
    pub fn preflight_headers(&self, origin: &HeaderValue) -> HeaderMap {
        let mut headers = self.response_headers(origin);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
        headers
    }
}
