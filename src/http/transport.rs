//! reqwest-backed transport

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, ClientBuilder};

use super::{RawResponse, Transport, TransportRequest};
use crate::config::{ProxyConfig, TransportConfig};
use crate::error::{RequestError, Result};

/// Transport that sends requests with a shared `reqwest::Client`.
///
/// Requests carrying a proxy are sent through a client built for that proxy.
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Create a new transport with the given configuration
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = build_client(&config, None)?;
        Ok(Self { client, config })
    }

    fn client_for(&self, proxy: Option<&ProxyConfig>) -> Result<Client> {
        match proxy {
            Some(proxy) => {
                debug!("Routing request through proxy {}", proxy.url);
                build_client(&self.config, Some(proxy))
            }
            None => Ok(self.client.clone()),
        }
    }
}

fn build_client(config: &TransportConfig, proxy: Option<&ProxyConfig>) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout);

    if let Some(proxy_config) = proxy {
        let proxy = reqwest::Proxy::all(&proxy_config.url)
            .map_err(|e| RequestError::Proxy(format!("Invalid proxy: {}", e)))?;

        let proxy = if let (Some(username), Some(password)) =
            (&proxy_config.username, &proxy_config.password)
        {
            proxy.basic_auth(username, password)
        } else {
            proxy
        };

        builder = builder.proxy(proxy);
    }

    if !config.verify_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder.build().map_err(RequestError::Http)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        if request.body.is_some() && !request.method.allows_body() {
            return Err(RequestError::BodyNotAllowed(
                "Request with GET/HEAD method cannot have body".to_string(),
            ));
        }

        let client = self.client_for(request.proxy.as_ref())?;
        let mut builder = client
            .request(request.method.as_reqwest(), request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(RequestError::Http)?;
        RawResponse::from_reqwest(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpMethod;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use url::Url;

    #[tokio::test]
    async fn get_with_body_is_rejected_before_sending() {
        let transport = ReqwestTransport::new(TransportConfig::default()).expect("transport");
        let request = TransportRequest {
            method: HttpMethod::Get,
            // Port 9 (discard) is never contacted: the check happens first.
            url: Url::parse("http://127.0.0.1:9/").expect("url"),
            headers: HeaderMap::new(),
            body: Some(Bytes::from_static(b"a=1")),
            proxy: None,
        };

        let err = transport.send(request).await.expect_err("body on GET");
        assert!(matches!(err, RequestError::BodyNotAllowed(_)));
        assert_eq!(
            err.to_string(),
            "Request with GET/HEAD method cannot have body"
        );
    }

    #[test]
    fn invalid_proxy_url_is_reported() {
        let transport = ReqwestTransport::new(TransportConfig::default()).expect("transport");
        let proxy = ProxyConfig::new("::not a proxy::");
        let err = transport.client_for(Some(&proxy)).expect_err("bad proxy");
        assert!(matches!(err, RequestError::Proxy(_)));
    }
}
