//! [`reqwest`]-backed implementation of [`Transport`].

use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

use super::{FormRequest, HttpResponse, Method, Transport, TransportError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to `http://{ip}:{port}` with a pooled [`reqwest::Client`].
///
/// Redirects are never followed: `PUTVAL` answers 308 on success and the
/// client has to see that status as is.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(ip: &str, port: u16) -> Result<Self, TransportError> {
        Self::with_timeout(ip, port, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(ip: &str, port: u16, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = format!("http://{ip}:{port}");
        reqwest::Url::parse(&base_url).map_err(|_| TransportError::InvalidAddress(base_url.clone()))?;

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { inner, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: FormRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        let url = format!("{}/{}", self.base_url, request.path);
        let builder = match request.method {
            Method::Post => self.inner.post(&url),
            Method::Put => self.inner.put(&url),
        }
        .form(&request.fields);

        async move {
            debug!("{} {}", request.method.as_str(), url);
            let resp = builder.send().await.map_err(|e| {
                if e.is_connect() {
                    TransportError::Unreachable(e.to_string())
                } else {
                    TransportError::Http(e)
                }
            })?;
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            debug!("{} {} -> {}", request.method.as_str(), url, status);

            Ok(HttpResponse { status, body })
        }
        .boxed()
    }
}
