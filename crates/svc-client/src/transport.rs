//! The mechanism through which requests reach the service.
use anyhow::Context;
use log::trace;
use reqwest::{header::HeaderMap, Method, StatusCode};
use serde_json::Value;

/// Performs a single HTTP request.
///
/// Implementations report network level failures as errors; any response, regardless of
/// status, is returned as is.
pub trait Transport {
    fn send(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> anyhow::Result<(StatusCode, String)>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> anyhow::Result<(StatusCode, String)> {
        (**self).send(method, url, headers, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> anyhow::Result<(StatusCode, String)> {
        (**self).send(method, url, headers, body)
    }
}

/// A transport backed by a blocking [`reqwest`] client.
#[derive(Clone, Debug)]
pub struct HttpTransport(reqwest::blocking::Client);

impl HttpTransport {
    pub fn try_new() -> anyhow::Result<Self> {
        Self::with_inner(|b| b)
    }

    /// Create a transport from a customized client builder, e.g. to set timeouts.
    pub fn with_inner(
        f: impl FnOnce(reqwest::blocking::ClientBuilder) -> reqwest::blocking::ClientBuilder,
    ) -> anyhow::Result<Self> {
        f(reqwest::blocking::Client::builder())
            .build()
            .map(Self)
            .context("Failed to create reqwest client.")
    }
}

impl From<reqwest::blocking::Client> for HttpTransport {
    fn from(client: reqwest::blocking::Client) -> Self {
        Self(client)
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> anyhow::Result<(StatusCode, String)> {
        trace!("Sending {method} to {url}");
        let request = self.0.request(method, url).headers(headers.clone());
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        let response = request.send().with_context(|| format!("Send to {url}"))?;
        let status = response.status();
        let text = response
            .text()
            .with_context(|| format!("Get text from {status} response"))?;
        Ok((status, text))
    }
}
