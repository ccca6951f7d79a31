//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network; the host (the server's transport, or ureq in the
//! integration tests) executes the actual I/O.
//!
//! All fields use owned types (`String`, `Vec`) so values can be moved into an
//! async task or a blocking agent without lifetime concerns.

use std::fmt;

/// HTTP method for a request. Only the verbs the table API needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `TableClient::build_*` methods. `url` is absolute and already
/// carries the encoded query string.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// `url` without its query string. Login filters carry the password
    /// digest in the query, so this is the only form that may be logged.
    pub fn endpoint(&self) -> &str {
        self.url
            .split_once('?')
            .map_or(self.url.as_str(), |(endpoint, _)| endpoint)
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the host after executing an `HttpRequest`, then passed
/// to `TableClient::parse_*` methods.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 204,
            headers: vec![("Content-Range".to_string(), "*/0".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("content-range"), Some("*/0"));
        assert_eq!(response.header("prefer"), None);
    }

    #[test]
    fn endpoint_drops_the_query() {
        let mut request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://db.local/rest/v1/users?login=eq.a&hashed_password=eq.ff".to_string(),
            headers: Vec::new(),
            body: None,
        };
        assert_eq!(request.endpoint(), "http://db.local/rest/v1/users");
        request.url = "http://db.local/rest/v1/data".to_string();
        assert_eq!(request.endpoint(), "http://db.local/rest/v1/data");
    }

    #[test]
    fn only_2xx_is_success() {
        let mut response = HttpResponse {
            status: 201,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(response.is_success());
        response.status = 409;
        assert!(!response.is_success());
        response.status = 302;
        assert!(!response.is_success());
    }
}
