//! Inbound request → outbound request descriptor.
//!
//! # Responsibilities
//! - Strip the relay prefix from the path
//! - Rebuild the query with keys in first-appearance order
//! - Drop hop-by-hop and relay routing headers
//! - Attach the body only for methods that carry one
//!
//! The body is handled as opaque bytes from end to end.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Method, Request, Uri};
use bytes::Bytes;
use url::Url;

use crate::config::ProxyConfig;
use crate::error::RelayError;

/// Headers that never leave the relay, besides the configured routing headers.
const HOP_BY_HOP: [HeaderName; 4] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
];

/// Ordered key → values query representation.
pub type Query = Vec<(String, Vec<String>)>;

/// A request as it reached the relay.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A fully resolved request ready to be forwarded once.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// Resolved `host[:port]` of the target.
    pub target: String,
    pub method: Method,
    /// Path with the relay prefix removed; never empty.
    pub path: String,
    pub query: Query,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ProxyRequest {
    /// Plain-HTTP URL of the target resource.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("http://{}{}", self.target, self.path))?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, values) in &self.query {
                for value in values {
                    pairs.append_pair(key, value);
                }
            }
        }
        Ok(url)
    }

    /// Build the outbound `http::Request`.
    pub fn into_http(self) -> Result<Request<Body>, RelayError> {
        let url = self
            .url()
            .map_err(|e| RelayError::Setup(format!("Invalid URL: {e}")))?;
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| RelayError::Setup(format!("Invalid URL: {e}")))?;

        let mut builder = Request::builder().method(self.method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = self.headers;
        }

        let body = self.body.map(Body::from).unwrap_or_else(Body::empty);
        builder
            .body(body)
            .map_err(|e| RelayError::Setup(e.to_string()))
    }
}

/// Turns inbound requests into [`ProxyRequest`]s.
#[derive(Debug, Clone)]
pub struct Translator {
    prefix: String,
    excluded: Vec<HeaderName>,
}

impl Translator {
    /// Create a translator for `prefix`, also dropping the given routing headers.
    pub fn new(prefix: impl Into<String>, routing_headers: &[HeaderName]) -> Self {
        let mut excluded = HOP_BY_HOP.to_vec();
        excluded.extend_from_slice(routing_headers);
        Self {
            prefix: prefix.into(),
            excluded,
        }
    }

    /// Build from the proxy section of the config.
    ///
    /// Header names are validated at startup. An unparsable one is skipped
    /// with a warning; no inbound header can carry such a name.
    pub fn from_config(config: &ProxyConfig) -> Self {
        let routing: Vec<HeaderName> = [&config.target_header, &config.sender_header]
            .into_iter()
            .filter_map(|name| match HeaderName::try_from(name.as_str()) {
                Ok(header) => Some(header),
                Err(_) => {
                    tracing::warn!(header = %name, "Skipping unparsable routing header name");
                    None
                }
            })
            .collect();
        Self::new(config.prefix.clone(), &routing)
    }

    /// Translate an inbound request aimed at `target`.
    pub fn translate(&self, inbound: InboundRequest, target: String) -> ProxyRequest {
        let path = self.strip_prefix(inbound.uri.path());
        let query = inbound.uri.query().map(parse_query).unwrap_or_default();
        let headers = self.filter_headers(&inbound.headers);

        let body = if carries_body(&inbound.method) && !inbound.body.is_empty() {
            Some(inbound.body)
        } else {
            None
        };

        ProxyRequest {
            target,
            method: inbound.method,
            path,
            query,
            headers,
            body,
        }
    }

    fn strip_prefix(&self, path: &str) -> String {
        match path.strip_prefix(self.prefix.as_str()) {
            Some("") => "/".to_string(),
            Some(rest) => rest.to_string(),
            None => path.to_string(),
        }
    }

    fn filter_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(inbound.len());
        for (name, value) in inbound {
            if !self.excluded.contains(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        headers
    }
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Group query pairs by key, keeping the order in which keys first appear.
fn parse_query(raw: &str) -> Query {
    let mut query: Query = Vec::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match query.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => query.push((key.into_owned(), vec![value.into_owned()])),
        }
    }
    query
}
