//! Pluggable outbound HTTP client
//!
//! [`RequestWrapper`] is the seam between a remote stage and the network:
//! tests substitute a stub, production uses [`ReqwestRequestWrapper`].

use crate::error::Result;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Blocking HTTP client used by remote stages
pub trait RequestWrapper: Send + Sync {
    /// Upload `files` (field name, content) to `url`
    ///
    /// Not implemented by the stock client, which returns `Ok(None)`.
    fn post(&self, url: &str, files: &[(String, Vec<u8>)]) -> Result<Option<Value>>;

    /// Send `data` to `url` with `method` and `headers`, returning the
    /// response body parsed as JSON
    fn get(&self, url: &str, method: Method, headers: HeaderMap, data: Vec<u8>) -> Result<Value>;
}

impl<T: RequestWrapper + ?Sized> RequestWrapper for Arc<T> {
    fn post(&self, url: &str, files: &[(String, Vec<u8>)]) -> Result<Option<Value>> {
        (**self).post(url, files)
    }

    fn get(&self, url: &str, method: Method, headers: HeaderMap, data: Vec<u8>) -> Result<Value> {
        (**self).get(url, method, headers, data)
    }
}

/// [`RequestWrapper`] backed by `reqwest`'s blocking client
///
/// Each call builds its own client, so the wrapper can be created and
/// dropped from async code; only the call itself must run on a thread
/// that is allowed to block. There is no timeout.
#[derive(Debug, Clone, Default)]
pub struct ReqwestRequestWrapper;

impl ReqwestRequestWrapper {
    pub fn new() -> Self {
        Self
    }
}

impl RequestWrapper for ReqwestRequestWrapper {
    fn post(&self, url: &str, files: &[(String, Vec<u8>)]) -> Result<Option<Value>> {
        tracing::warn!(
            url,
            files = files.len(),
            "ReqwestRequestWrapper::post is not implemented, nothing was sent"
        );
        Ok(None)
    }

    fn get(&self, url: &str, method: Method, headers: HeaderMap, data: Vec<u8>) -> Result<Value> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;

        tracing::debug!(%method, url, bytes = data.len(), "Sending remote stage request");

        let response = client
            .request(method, url)
            .headers(headers)
            .body(data)
            .send()?
            .error_for_status()?;

        let body = response.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }
}
