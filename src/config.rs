//! Configuration types for nestreq

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::params::Params;

/// HTTP method enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// Whether a request body may be attached to this method.
    pub fn allows_body(self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        write!(f, "{}", method)
    }
}

impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(()),
        }
    }
}

/// What a concrete request type supplies: where to send it and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub base_url: String,
    pub method: HttpMethod,
}

impl RequestSpec {
    pub fn new(base_url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            base_url: base_url.into(),
            method,
        }
    }

    pub fn get(base_url: impl Into<String>) -> Self {
        Self::new(base_url, HttpMethod::Get)
    }

    pub fn post(base_url: impl Into<String>) -> Self {
        Self::new(base_url, HttpMethod::Post)
    }

    pub fn put(base_url: impl Into<String>) -> Self {
        Self::new(base_url, HttpMethod::Put)
    }

    pub fn delete(base_url: impl Into<String>) -> Self {
        Self::new(base_url, HttpMethod::Delete)
    }
}

/// Proxy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }
}

/// Settings for the reqwest-backed transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub verify_certs: bool,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            verify_certs: true,
            user_agent: None,
        }
    }
}

/// Mutable per-request state, editable until the request is executed.
///
/// `form` and `json` are mutually exclusive; the conflict is reported by
/// `Request::execute`, not on assignment.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub base_url: String,
    pub method: HttpMethod,
    pub query_params: Params,
    pub form: Option<Params>,
    pub json: Option<Params>,
    pub headers: Vec<(String, String)>,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
    pub proxy: Option<ProxyConfig>,
}

impl RequestConfig {
    pub fn from_spec(spec: RequestSpec) -> Self {
        RequestConfig {
            base_url: spec.base_url,
            method: spec.method,
            query_params: Params::new(),
            form: None,
            json: None,
            headers: Vec::new(),
            cookie: None,
            user_agent: None,
            proxy: None,
        }
    }
}
