//! REST endpoint binder and HTTP server
//!
//! [`RestApiWrapper`] chains a JSON decoder, a wrapped step and a JSON
//! encoder, and exposes the chain as a single `GET` route:
//!
//! ```text
//! GET <route>   body: JSON   ->  decode -> wrapped -> encode  ->  200 JSON
//! ```
//!
//! There is no error translation: a failing stage yields a 500 carrying the
//! error text, a missing or malformed JSON body gets axum's default
//! rejection, and other methods get a 405.

use crate::error::{Error, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use remotestage_core::{
    Chain, DataContainer, DecoderStep, EncoderStep, ExecutionContext, JsonDataBodyDecoder,
    JsonDataResponseEncoder, Step, StepExt,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// Route used when none is configured
pub const DEFAULT_ROUTE: &str = "/";

type Served<D, S, E> = Chain<Chain<DecoderStep<D>, S>, EncoderStep<E>>;

/// Serves `decoder -> wrapped -> encoder` under one `GET` route
///
/// # Example
///
/// ```ignore
/// let app = RestApiWrapper::new(ValuesDecoder, Identity::new(), PredictionsEncoder)
///     .with_route("/predict")?
///     .get_app();
///
/// HttpServer::new("127.0.0.1:5000", app).serve().await?;
/// ```
pub struct RestApiWrapper<D, S, E> {
    pipeline: Served<D, S, E>,
    route: String,
}

impl<D, S, E> RestApiWrapper<D, S, E>
where
    D: JsonDataBodyDecoder,
    S: Step<Input = D::Output>,
    E: JsonDataResponseEncoder<Input = S::Output>,
{
    /// Bind the three stages to [`DEFAULT_ROUTE`]
    pub fn new(json_decoder: D, wrapped: S, json_encoder: E) -> Self {
        Self {
            pipeline: DecoderStep::new(json_decoder)
                .then(wrapped)
                .then(EncoderStep::new(json_encoder)),
            route: DEFAULT_ROUTE.to_string(),
        }
    }

    /// Serve under `route` instead
    ///
    /// The route must start with `/`. A segment may be a named parameter
    /// (`/:id`) or, as the last segment, a named catch-all (`/*rest`).
    pub fn with_route(mut self, route: impl Into<String>) -> remotestage_core::Result<Self> {
        let route = route.into();
        validate_route(&route).map_err(|reason| {
            remotestage_core::Error::ConfigError(format!("Invalid route {:?}: {}", route, reason))
        })?;
        self.route = route;
        Ok(self)
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// The step between decoder and encoder
    pub fn wrapped(&self) -> &S {
        self.pipeline.first().second()
    }
}

/// Check `route` against what the router accepts, so a bad route is an
/// error here instead of a panic in [`RestApiWrapper::get_app`]
fn validate_route(route: &str) -> std::result::Result<(), &'static str> {
    let Some(path) = route.strip_prefix('/') else {
        return Err("must start with '/'");
    };

    let segments: Vec<&str> = path.split('/').collect();
    for (i, segment) in segments.iter().enumerate() {
        let Some(marker) = segment.find([':', '*']) else {
            continue;
        };
        if marker != 0 {
            return Err("parameters must span a whole segment");
        }

        let name = &segment[1..];
        if name.is_empty() {
            return Err("parameters must be registered with a name");
        }
        if name.contains([':', '*']) {
            return Err("only one parameter per segment");
        }
        if segment.starts_with('*') && i + 1 != segments.len() {
            return Err("catch-all parameters are only allowed at the end");
        }
    }
    Ok(())
}

impl<D, S, E> RestApiWrapper<D, S, E>
where
    D: JsonDataBodyDecoder + 'static,
    S: Step<Input = D::Output> + 'static,
    E: JsonDataResponseEncoder<Input = S::Output> + 'static,
{
    /// Build the application: one resource at the configured route, `GET` only
    pub fn get_app(self) -> Router {
        let route = self.route.clone();
        tracing::info!(route = %route, "Registering REST endpoint");

        Router::new()
            .route(&route, get(rest_handler::<Self>))
            .with_state(Arc::new(self))
            .layer(tower_http::trace::TraceLayer::new_for_http())
    }
}

impl<D, S, E> Step for RestApiWrapper<D, S, E>
where
    D: JsonDataBodyDecoder,
    S: Step<Input = D::Output>,
    E: JsonDataResponseEncoder<Input = S::Output>,
{
    type Input = Value;
    type Output = Value;

    fn name(&self) -> &str {
        "RestApiWrapper"
    }

    /// Runs the request body through the chain on a fresh root context
    fn transform(&self, data_inputs: Value) -> remotestage_core::Result<Value> {
        let output =
            self.handle_transform(DataContainer::new(data_inputs), &ExecutionContext::default())?;
        Ok(output.into_data_inputs())
    }

    fn handle_transform(
        &self,
        data_container: DataContainer<Value>,
        context: &ExecutionContext,
    ) -> remotestage_core::Result<DataContainer<Value>> {
        self.pipeline
            .handle_transform(data_container, &context.push(self.name()))
    }
}

/// Pipeline failure surfaced as a 500
struct StageError(remotestage_core::Error);

impl From<remotestage_core::Error> for StageError {
    fn from(e: remotestage_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for StageError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Pipeline failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// GET handler: body -> wrapped step -> JSON response
///
/// Steps block, so the pipeline runs on tokio's blocking pool.
async fn rest_handler<W>(
    State(wrapped): State<Arc<W>>,
    Json(body): Json<Value>,
) -> std::result::Result<Json<Value>, StageError>
where
    W: Step<Input = Value, Output = Value> + 'static,
{
    let output = tokio::task::spawn_blocking(move || wrapped.transform(body))
        .await
        .map_err(|e| {
            remotestage_core::Error::Execution(format!("Pipeline task failed: {}", e))
        })??;

    Ok(Json(output))
}

/// HTTP server hosting a router built by [`RestApiWrapper::get_app`]
pub struct HttpServer {
    /// Server bind address
    bind_address: String,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server
    ///
    /// # Arguments
    ///
    /// * `bind_address` - Address to bind to (e.g., "127.0.0.1:8080")
    /// * `router` - Application to serve
    pub fn new(bind_address: impl Into<String>, router: Router) -> Self {
        Self {
            bind_address: bind_address.into(),
            router,
        }
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `signal` completes
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: std::net::SocketAddr = self
            .bind_address
            .parse()
            .map_err(|e| Error::ServerError(format!("Invalid bind address: {}", e)))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::ServerError(format!("Failed to bind: {}", e)))?;

        Self::serve_on(listener, self.router, signal).await
    }

    /// Serve `router` on an already bound listener
    pub async fn serve_on<F>(listener: TcpListener, router: Router, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Starting HTTP server on {}", addr);
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| Error::ServerError(format!("Server error: {}", e)))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
