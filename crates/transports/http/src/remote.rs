//! Remote stage: a pipeline step hosted behind another HTTP endpoint
//!
//! [`RemoteStageCaller`] serializes the batch envelope it receives, sends it
//! to the remote endpoint and rebuilds an envelope from the reply. It is
//! meant to sit inside a pipeline, typically as the wrapped unit of a
//! [`crate::RestApiWrapper`] or a link of a [`remotestage_core::Chain`].
//!
//! # Wire format
//!
//! Request body (`content-type: application/json`):
//!
//! ```json
//! {
//!   "path": "RestApiWrapper",
//!   "data_inputs": [1, 2, 3],
//!   "expected_outputs": [4, 5, 6],
//!   "current_ids": [0, 1, 2],
//!   "summary_id": 7
//! }
//! ```
//!
//! The reply is an object with the same keys; `path` is ignored,
//! `expected_outputs`, `current_ids` and `summary_id` may be null.
//!
//! The default method is `GET` even though a body is sent. Servers built
//! with [`crate::RestApiWrapper`] only answer `GET`, so the two sides agree;
//! other servers may need [`RemoteStageCaller::with_method`].

use crate::error::Error;
use crate::request::{ReqwestRequestWrapper, RequestWrapper};
use remotestage_core::{DataContainer, ExecutionContext, Result, Step};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// Configuration of a remote stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStageConfig {
    /// Full URL of the remote endpoint
    pub url: String,

    /// HTTP method
    ///
    /// Default: "GET"
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".to_string()
}

impl RemoteStageConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
        }
    }
}

/// Request body sent to the remote stage: the envelope plus the caller's path
#[derive(Debug, Serialize)]
struct RemoteStageRequest<'a, T> {
    path: String,
    #[serde(flatten)]
    batch: &'a DataContainer<T>,
}

/// Step that delegates its transformation to a remote HTTP endpoint
///
/// `T` is the batch type, defaulting to raw JSON.
pub struct RemoteStageCaller<T = Value> {
    url: String,
    method: Method,
    request: Box<dyn RequestWrapper>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RemoteStageCaller<T> {
    /// Caller for `url` using `GET` and [`ReqwestRequestWrapper`]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            request: Box::new(ReqwestRequestWrapper::new()),
            _marker: PhantomData,
        }
    }

    pub fn from_config(config: &RemoteStageConfig) -> crate::Result<Self> {
        let method = Method::from_bytes(config.method.to_uppercase().as_bytes())
            .map_err(|_| Error::InvalidMethod(config.method.clone()))?;
        Ok(Self::new(config.url.clone()).with_method(method))
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the HTTP client, e.g. with a stub in tests
    pub fn with_request(mut self, request: impl RequestWrapper + 'static) -> Self {
        self.request = Box::new(request);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

impl<T> Step for RemoteStageCaller<T>
where
    T: Serialize + DeserializeOwned,
{
    type Input = T;
    type Output = T;

    fn name(&self) -> &str {
        "RemoteStageCaller"
    }

    fn transform(&self, _data_inputs: T) -> Result<T> {
        Err(remotestage_core::Error::MustBeUsedInsidePipeline(
            self.name().to_string(),
        ))
    }

    /// Sends the envelope under the caller's path; the remote stage does
    /// not add a segment of its own.
    fn handle_transform(
        &self,
        data_container: DataContainer<T>,
        context: &ExecutionContext,
    ) -> Result<DataContainer<T>> {
        let body = RemoteStageRequest {
            path: context.get_path(false),
            batch: &data_container,
        };
        let data = serde_json::to_vec(&body)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(
            url = %self.url,
            method = %self.method,
            path = %body.path,
            "Calling remote stage"
        );

        let reply = self
            .request
            .get(&self.url, self.method.clone(), headers, data)?;
        Ok(serde_json::from_value(reply)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Captured outbound request
    #[derive(Debug, Clone)]
    struct Sent {
        url: String,
        method: Method,
        headers: HeaderMap,
        body: Value,
    }

    /// Stub client that replies with the body it was sent
    #[derive(Default)]
    struct EchoRequest {
        sent: Mutex<Vec<Sent>>,
    }

    impl RequestWrapper for EchoRequest {
        fn post(&self, _url: &str, _files: &[(String, Vec<u8>)]) -> crate::Result<Option<Value>> {
            Ok(None)
        }

        fn get(
            &self,
            url: &str,
            method: Method,
            headers: HeaderMap,
            data: Vec<u8>,
        ) -> crate::Result<Value> {
            let body: Value = serde_json::from_slice(&data)?;
            self.sent.lock().unwrap().push(Sent {
                url: url.to_string(),
                method,
                headers,
                body: body.clone(),
            });
            Ok(body)
        }
    }

    /// Stub client that always answers with the same reply
    struct FixedReply(Value);

    impl RequestWrapper for FixedReply {
        fn post(&self, _url: &str, _files: &[(String, Vec<u8>)]) -> crate::Result<Option<Value>> {
            Ok(None)
        }

        fn get(&self, _: &str, _: Method, _: HeaderMap, _: Vec<u8>) -> crate::Result<Value> {
            Ok(self.0.clone())
        }
    }

    fn sample_batch() -> DataContainer<Vec<i64>> {
        DataContainer::new(vec![1, 2, 3])
            .with_expected_outputs(json!([4, 5, 6]))
            .with_current_ids(vec![json!(0), json!(1), json!(2)])
            .with_summary_id(json!(7))
    }

    #[test]
    fn test_transform_outside_pipeline_fails() {
        let caller = RemoteStageCaller::<Vec<i64>>::new("http://localhost:5000/");
        let err = caller.transform(vec![1, 2, 3]).unwrap_err();

        assert!(matches!(
            err,
            remotestage_core::Error::MustBeUsedInsidePipeline(_)
        ));
        assert!(err.to_string().contains("must be used inside a pipeline"));
    }

    #[test]
    fn test_echo_returns_identical_envelope() {
        let caller = RemoteStageCaller::<Vec<i64>>::new("http://localhost:5000/")
            .with_request(EchoRequest::default());

        let batch = sample_batch();
        let out = caller
            .handle_transform(batch.clone(), &ExecutionContext::default())
            .unwrap();

        assert_eq!(out, batch);
    }

    #[test]
    fn test_request_shape() {
        let echo = Arc::new(EchoRequest::default());
        let caller = RemoteStageCaller::<Vec<i64>>::new("http://localhost:5000/predict")
            .with_request(echo.clone());

        let ctx = ExecutionContext::default().push("RestApiWrapper");
        caller.handle_transform(sample_batch(), &ctx).unwrap();

        let sent = echo.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let sent = &sent[0];
        assert_eq!(sent.url, "http://localhost:5000/predict");
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(
            sent.body,
            json!({
                "path": "RestApiWrapper",
                "data_inputs": [1, 2, 3],
                "expected_outputs": [4, 5, 6],
                "current_ids": [0, 1, 2],
                "summary_id": 7
            })
        );
    }

    #[test]
    fn test_empty_envelope_serializes_nulls() {
        let echo = Arc::new(EchoRequest::default());
        let caller = RemoteStageCaller::<Value>::new("http://localhost:5000/")
            .with_request(echo.clone());

        let out = caller
            .handle_transform(DataContainer::new(json!("x")), &ExecutionContext::default())
            .unwrap();

        let sent = echo.sent.lock().unwrap();
        assert_eq!(sent[0].body["expected_outputs"], Value::Null);
        assert_eq!(sent[0].body["summary_id"], Value::Null);
        assert_eq!(sent[0].body["current_ids"], json!([]));
        assert_eq!(out, DataContainer::new(json!("x")));
    }

    #[test]
    fn test_configured_method_is_used() {
        let echo = Arc::new(EchoRequest::default());
        let config = RemoteStageConfig {
            url: "http://localhost:5000/".to_string(),
            method: "post".to_string(),
        };
        let caller = RemoteStageCaller::<Vec<i64>>::from_config(&config)
            .unwrap()
            .with_request(echo.clone());

        caller
            .handle_transform(sample_batch(), &ExecutionContext::default())
            .unwrap();

        assert_eq!(echo.sent.lock().unwrap()[0].method, Method::POST);
    }

    #[test]
    fn test_invalid_method_rejected() {
        let config = RemoteStageConfig {
            url: "http://localhost:5000/".to_string(),
            method: "NOT A METHOD".to_string(),
        };
        let result = RemoteStageCaller::<Value>::from_config(&config);
        assert!(matches!(result, Err(Error::InvalidMethod(_))));
    }

    #[test]
    fn test_config_defaults_to_get() {
        let config: RemoteStageConfig =
            serde_json::from_value(json!({ "url": "http://localhost:5000/" })).unwrap();
        assert_eq!(config.method, "GET");
    }

    #[test]
    fn test_reply_replaces_envelope() {
        let caller = RemoteStageCaller::<Vec<i64>>::new("http://localhost:5000/").with_request(
            FixedReply(json!({
                "data_inputs": [10, 20, 30],
                "expected_outputs": null,
                "current_ids": ["a", "b", "c"],
                "summary_id": "s"
            })),
        );

        let out = caller
            .handle_transform(sample_batch(), &ExecutionContext::default())
            .unwrap();

        assert_eq!(out.data_inputs, vec![10, 20, 30]);
        assert_eq!(out.expected_outputs, Value::Null);
        assert_eq!(out.current_ids, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(out.summary_id, json!("s"));
    }

    #[test]
    fn test_explicit_nulls_survive_round_trip() {
        let caller = RemoteStageCaller::<Vec<i64>>::new("http://localhost:5000/")
            .with_request(EchoRequest::default());

        let dc = DataContainer::new(vec![1, 2, 3])
            .with_summary_id(json!(null))
            .with_expected_outputs(json!(null));
        let out = caller
            .handle_transform(dc.clone(), &ExecutionContext::default())
            .unwrap();

        assert_eq!(out, dc);
    }

    #[test]
    fn test_reply_with_missing_bookkeeping_fields() {
        let caller = RemoteStageCaller::<Vec<i64>>::new("http://localhost:5000/")
            .with_request(FixedReply(json!({ "data_inputs": [9], "current_ids": null })));

        let out = caller
            .handle_transform(sample_batch(), &ExecutionContext::default())
            .unwrap();

        assert_eq!(out, DataContainer::new(vec![9]));
    }

    #[test]
    fn test_malformed_reply_is_an_error() {
        let caller = RemoteStageCaller::<Vec<i64>>::new("http://localhost:5000/")
            .with_request(FixedReply(json!({ "unexpected": true })));

        let result = caller.handle_transform(sample_batch(), &ExecutionContext::default());
        assert!(matches!(
            result,
            Err(remotestage_core::Error::Serialization(_))
        ));
    }

    #[test]
    fn test_transport_error_propagates() {
        let caller = RemoteStageCaller::<Vec<i64>>::new("http://127.0.0.1:1/");

        let result = caller.handle_transform(sample_batch(), &ExecutionContext::default());
        assert!(matches!(
            result,
            Err(remotestage_core::Error::RemoteExecutionFailed(_))
        ));
    }
}
