//! HTTP request module
//!
//! This module holds the request executor, the transport seam it sends
//! through, and the raw response handed to response processors.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use url::Url;

use crate::config::{HttpMethod, ProxyConfig};
use crate::error::Result;

pub mod request;
pub mod response;
pub mod transport;

pub use request::{Request, RequestState};
pub use response::{process_fn, Json, ProcessFn, RawResponse, ResponseProcessor, StatusText, Text};
pub use transport::ReqwestTransport;

/// A fully assembled request, ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub proxy: Option<ProxyConfig>,
}

/// The network collaborator a [`Request`] sends through.
///
/// Implementations perform a single attempt and report failures unchanged.
/// Cancellation is applied by the caller dropping the returned future, so
/// implementations must not detach work that outlives it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse>;
}
