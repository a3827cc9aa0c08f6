//! Bearer credential lookup.
//!
//! Order: body field -> query parameter -> header named like the field ->
//! `Authorization: Bearer <token>` (RFC 6750 section 2.1).

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, header, request::Parts};
use serde_json::{Map, Value};

/// Read-only view of an inbound request, as seen by the strategy.
///
/// Header keys are case-insensitive because `HeaderMap` stores them lower-cased.
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    pub headers: HeaderMap,
    pub query: HashMap<String, String>,
    pub body: Option<Map<String, Value>>,
}

impl TokenRequest {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Build from axum request parts; the query string is decoded here.
    pub fn from_parts(parts: &Parts, body: Option<Map<String, Value>>) -> Self {
        Self {
            headers: parts.headers.clone(),
            query: parse_query(parts.uri.query()),
            body,
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = parse_query(Some(query));
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }
}

/// First value of each key wins, matching how most frameworks expose `req.query`.
fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    if let Some(query) = query {
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            out.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }
    }
    out
}

pub fn lookup(req: &TokenRequest, field: &str) -> Option<String> {
    if let Some(token) = req
        .body
        .as_ref()
        .and_then(|body| body.get(field))
        .and_then(truthy)
    {
        return Some(token);
    }

    if let Some(token) = req.query.get(field).filter(|v| !v.is_empty()) {
        return Some(token.clone());
    }

    if let Some(token) = header_value(&req.headers, field) {
        return Some(token);
    }

    req.headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
        .map(str::to_owned)
}

/// Parse `Bearer <token>`; the scheme is case-insensitive.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, credentials) = value.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = credentials.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

fn header_value(headers: &HeaderMap, field: &str) -> Option<String> {
    // Not every field name is a legal header name; those simply never match.
    let name = HeaderName::from_bytes(field.to_ascii_lowercase().as_bytes()).ok()?;
    headers
        .get(&name)?
        .to_str()
        .ok()
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn truthy(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}
