//! Request assembly and execution

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, USER_AGENT};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{ReqwestTransport, ResponseProcessor, Transport, TransportRequest};
use crate::config::{ProxyConfig, RequestConfig, RequestSpec, TransportConfig};
use crate::error::{RequestError, Result};
use crate::observer::{LogObserver, RequestObserver};
use crate::params::{flatten_pairs, Params};
use crate::utils::{FormUtils, UrlUtils};

const FORM_AND_JSON_CONFLICT: &str = "Can not simultaneously send form and json in one request.";

/// Lifecycle of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestState {
    Idle = 0,
    Building = 1,
    Sent = 2,
    Completed = 3,
    Failed = 4,
    Aborted = 5,
}

impl RequestState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RequestState::Idle,
            1 => RequestState::Building,
            2 => RequestState::Sent,
            3 => RequestState::Completed,
            4 => RequestState::Failed,
            _ => RequestState::Aborted,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Completed | RequestState::Failed | RequestState::Aborted
        )
    }
}

/// A single-use HTTP request.
///
/// Configuration is editable through [`Request::config_mut`] until
/// [`Request::execute`] is called. Each instance owns one cancellation token;
/// [`Request::abort`] or a clone from [`Request::abort_handle`] fires it.
pub struct Request<P: ResponseProcessor> {
    config: RequestConfig,
    transport: Arc<dyn Transport>,
    processor: P,
    observer: Arc<dyn RequestObserver>,
    cancel: CancellationToken,
    state: AtomicU8,
}

impl<P: ResponseProcessor> Request<P> {
    /// Create a request sent through a default [`ReqwestTransport`].
    pub fn new(spec: RequestSpec, processor: P) -> Result<Self> {
        let transport = ReqwestTransport::new(TransportConfig::default())?;
        Ok(Self::with_transport(spec, Arc::new(transport), processor))
    }

    pub fn with_transport(spec: RequestSpec, transport: Arc<dyn Transport>, processor: P) -> Self {
        Self {
            config: RequestConfig::from_spec(spec),
            transport,
            processor,
            observer: Arc::new(LogObserver),
            cancel: CancellationToken::new(),
            state: AtomicU8::new(RequestState::Idle as u8),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn query_params(mut self, params: Params) -> Self {
        self.config.query_params = params;
        self
    }

    pub fn form(mut self, form: Params) -> Self {
        self.config.form = Some(form);
        self
    }

    pub fn json(mut self, json: Params) -> Self {
        self.config.json = Some(json);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.config.cookie = Some(cookie.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RequestConfig {
        &mut self.config
    }

    pub fn state(&self) -> RequestState {
        RequestState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// URL from the base URL alone.
    pub fn build_url(&self) -> Result<Url> {
        UrlUtils::parse_base(&self.config.base_url)
    }

    /// URL with the flattened query parameters appended in order.
    pub fn build_url_with_params(&self) -> Result<Url> {
        let mut url = self.build_url()?;
        let pairs = flatten_pairs(&self.config.query_params)?;
        UrlUtils::append_query(&mut url, &pairs);
        Ok(url)
    }

    /// Cancel the request. Idempotent and safe in any state.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// A handle that aborts this request from another task.
    pub fn abort_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Build, send and process the request.
    ///
    /// May be called once; later calls fail with
    /// [`RequestError::AlreadyExecuted`]. The state becomes `Completed` once the
    /// transport returns, even if the response processor then fails.
    pub async fn execute(&self) -> Result<P::Output> {
        self.state
            .compare_exchange(
                RequestState::Idle as u8,
                RequestState::Building as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|_| RequestError::AlreadyExecuted)?;

        let request = match self.prepare() {
            Ok(request) => request,
            Err(e) => {
                debug!("Request assembly failed: {}", e);
                self.set_state(RequestState::Failed);
                return Err(e);
            }
        };

        let method = request.method;
        let url = request.url.clone();
        self.observer.on_request(method, &url);
        self.set_state(RequestState::Sent);

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RequestError::Aborted),
            result = self.transport.send(request) => result,
        };

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                let state = if e.is_aborted() {
                    warn!("{} {} aborted", method, url);
                    RequestState::Aborted
                } else {
                    RequestState::Failed
                };
                self.set_state(state);
                self.observer.on_finish(method, &url, state);
                return Err(e);
            }
        };

        self.set_state(RequestState::Completed);
        self.observer.on_finish(method, &url, RequestState::Completed);
        self.processor.process(response).await
    }

    fn set_state(&self, state: RequestState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    fn prepare(&self) -> Result<TransportRequest> {
        let url = self.build_url_with_params()?;
        let config = &self.config;

        if config.form.is_some() && config.json.is_some() {
            return Err(RequestError::Config(FORM_AND_JSON_CONFLICT.to_string()));
        }

        let mut headers = HeaderMap::new();
        let body = if let Some(form) = &config.form {
            let pairs = flatten_pairs(form)?;
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
            Some(Bytes::from(FormUtils::encode(&pairs)))
        } else if let Some(json) = &config.json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Some(Bytes::from(serde_json::to_vec(json)?))
        } else {
            None
        };

        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::InvalidHeader(format!("'{}': {}", name, e)))?;
            headers.insert(name, header_value(value)?);
        }

        // Dedicated fields go last so they replace explicit headers.
        if let Some(cookie) = &config.cookie {
            headers.insert(COOKIE, header_value(cookie)?);
        }
        if let Some(user_agent) = &config.user_agent {
            headers.insert(USER_AGENT, header_value(user_agent)?);
        }

        debug!(
            "Prepared {} {} with {} header(s){}",
            config.method,
            url,
            headers.len(),
            if body.is_some() { " and a body" } else { "" }
        );

        Ok(TransportRequest {
            method: config.method,
            url,
            headers,
            body,
            proxy: config.proxy.clone(),
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| RequestError::InvalidHeader(format!("'{}': {}", value, e)))
}
