//! JSON codecs at the edges of a served pipeline
//!
//! A deployment provides one [`JsonDataBodyDecoder`] to turn the request
//! body into the pipeline's batch type, and one [`JsonDataResponseEncoder`]
//! to turn the pipeline's output into a JSON response body.
//! [`DecoderStep`] and [`EncoderStep`] adapt them into [`Step`]s so they can
//! be chained with the wrapped unit.
//!
//! # Example
//!
//! ```
//! use remotestage_core::codec::{JsonDataBodyDecoder, JsonDataResponseEncoder};
//! use remotestage_core::{Error, Result};
//! use serde_json::{json, Value};
//!
//! struct ValuesDecoder;
//!
//! impl JsonDataBodyDecoder for ValuesDecoder {
//!     type Output = Vec<Vec<f64>>;
//!
//!     fn decode(&self, body: Value) -> Result<Self::Output> {
//!         let values = body
//!             .get("values")
//!             .cloned()
//!             .ok_or_else(|| Error::Decode("missing \"values\"".to_string()))?;
//!         Ok(serde_json::from_value(values)?)
//!     }
//! }
//!
//! struct PredictionsEncoder;
//!
//! impl JsonDataResponseEncoder for PredictionsEncoder {
//!     type Input = Vec<Vec<f64>>;
//!
//!     fn encode(&self, outputs: Self::Input) -> Result<Value> {
//!         Ok(json!({ "predictions": outputs }))
//!     }
//! }
//! ```

use crate::step::Step;
use crate::Result;
use serde_json::Value;

/// Converts a parsed JSON request body into a batch
pub trait JsonDataBodyDecoder: Send + Sync {
    /// Batch type handed to the wrapped unit
    type Output;

    /// Decode `body`, failing with [`crate::Error::Decode`] on malformed input
    fn decode(&self, body: Value) -> Result<Self::Output>;
}

/// Converts a pipeline output into a JSON response body
pub trait JsonDataResponseEncoder: Send + Sync {
    /// Output type of the wrapped unit
    type Input;

    fn encode(&self, outputs: Self::Input) -> Result<Value>;
}

/// [`Step`] running a [`JsonDataBodyDecoder`]
pub struct DecoderStep<D> {
    decoder: D,
}

impl<D> DecoderStep<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }
}

impl<D: JsonDataBodyDecoder> Step for DecoderStep<D> {
    type Input = Value;
    type Output = D::Output;

    fn name(&self) -> &str {
        "JsonDataBodyDecoder"
    }

    fn transform(&self, data_inputs: Value) -> Result<D::Output> {
        self.decoder.decode(data_inputs)
    }
}

/// [`Step`] running a [`JsonDataResponseEncoder`]
pub struct EncoderStep<E> {
    encoder: E,
}

impl<E> EncoderStep<E> {
    pub fn new(encoder: E) -> Self {
        Self { encoder }
    }
}

impl<E: JsonDataResponseEncoder> Step for EncoderStep<E> {
    type Input = E::Input;
    type Output = Value;

    fn name(&self) -> &str {
        "JsonDataResponseEncoder"
    }

    fn transform(&self, data_inputs: E::Input) -> Result<Value> {
        self.encoder.encode(data_inputs)
    }
}
