//! Request observation hooks

use log::{debug, info};
use url::Url;

use crate::config::HttpMethod;
use crate::http::RequestState;

/// Receives notifications about a request's progress.
pub trait RequestObserver: Send + Sync {
    /// Called right before the request is handed to the transport.
    fn on_request(&self, method: HttpMethod, url: &Url);

    /// Called once the request reaches a terminal state.
    fn on_finish(&self, _method: HttpMethod, _url: &Url, _state: RequestState) {}
}

/// Writes request activity to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl RequestObserver for LogObserver {
    fn on_request(&self, method: HttpMethod, url: &Url) {
        info!("Requesting URL: {} {}", method, url);
    }

    fn on_finish(&self, method: HttpMethod, url: &Url, state: RequestState) {
        debug!("{} {} finished: {:?}", method, url, state);
    }
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {
    fn on_request(&self, _method: HttpMethod, _url: &Url) {}
}
