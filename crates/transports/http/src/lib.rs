//! HTTP/REST transport for remotestage pipelines
//!
//! Two directions over plain HTTP + JSON:
//!
//! - **Serving**: [`RestApiWrapper`] binds decoder -> wrapped step -> encoder
//!   to a single `GET` route and [`HttpServer`] runs it.
//! - **Calling**: [`RemoteStageCaller`] is a step that ships its batch to
//!   another served pipeline through a [`RequestWrapper`].
//!
//! # Usage
//!
//! ## Server
//!
//! ```ignore
//! use remotestage_http::{HttpServer, RestApiWrapper};
//! use remotestage_core::Identity;
//!
//! let app = RestApiWrapper::new(ValuesDecoder, Identity::new(), PredictionsEncoder).get_app();
//! HttpServer::new("127.0.0.1:5000", app).serve().await?;
//! ```
//!
//! ## Remote stage
//!
//! ```ignore
//! use remotestage_http::RemoteStageCaller;
//!
//! let remote = RemoteStageCaller::<Vec<Vec<f64>>>::new("http://127.0.0.1:5001/");
//! let app = RestApiWrapper::new(ValuesDecoder, remote, PredictionsEncoder).get_app();
//! ```

pub mod error;
pub mod remote;
pub mod request;
pub mod server;

// Re-export main types
pub use error::{Error, Result};
pub use remote::{RemoteStageCaller, RemoteStageConfig};
pub use request::{ReqwestRequestWrapper, RequestWrapper};
pub use server::{HttpServer, RestApiWrapper, DEFAULT_ROUTE};
