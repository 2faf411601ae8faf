//! Raw responses and response processors

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{RequestError, Result};

/// A buffered response as returned by a transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(RequestError::Http)?;
        Ok(Self::new(status, headers, body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Turns a raw response into a request's result.
///
/// Processors decide whether a status is an error; the executor never does.
#[async_trait]
pub trait ResponseProcessor: Send + Sync {
    type Output: Send;

    async fn process(&self, response: RawResponse) -> Result<Self::Output>;
}

/// Yields the status code as a string, e.g. `"405"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusText;

#[async_trait]
impl ResponseProcessor for StatusText {
    type Output = String;

    async fn process(&self, response: RawResponse) -> Result<String> {
        Ok(response.status().as_u16().to_string())
    }
}

/// Yields the body as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

#[async_trait]
impl ResponseProcessor for Text {
    type Output = String;

    async fn process(&self, response: RawResponse) -> Result<String> {
        Ok(response.text())
    }
}

/// Deserializes the body as JSON regardless of status.
#[derive(Debug)]
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    pub fn new() -> Self {
        Json(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> ResponseProcessor for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    async fn process(&self, response: RawResponse) -> Result<T> {
        response.json()
    }
}

/// Processor backed by an async closure, see [`process_fn`].
pub struct ProcessFn<F> {
    f: F,
}

/// Wrap an async closure as a [`ResponseProcessor`].
pub fn process_fn<F, Fut, T>(f: F) -> ProcessFn<F>
where
    F: Fn(RawResponse) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    ProcessFn { f }
}

#[async_trait]
impl<F, Fut, T> ResponseProcessor for ProcessFn<F>
where
    F: Fn(RawResponse) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn process(&self, response: RawResponse) -> Result<T> {
        (self.f)(response).await
    }
}
