//! Codecs for the served demo pipeline
//!
//! Request: `{"values": [[1.0, 2.0], [3.0, 4.0]]}`
//! Response: `{"predictions": [[1.0, 2.0], [3.0, 4.0]]}`

use remotestage_core::{Error, JsonDataBodyDecoder, JsonDataResponseEncoder, Result};
use serde_json::{json, Value};

/// Batch handled by the demo pipeline
pub type Matrix = Vec<Vec<f64>>;

/// Reads the `values` key as a 2D array of numbers
pub struct ValuesDecoder;

impl JsonDataBodyDecoder for ValuesDecoder {
    type Output = Matrix;

    fn decode(&self, body: Value) -> Result<Matrix> {
        let values = body
            .get("values")
            .cloned()
            .ok_or_else(|| Error::Decode("missing \"values\" key".to_string()))?;
        serde_json::from_value(values)
            .map_err(|e| Error::Decode(format!("\"values\" must be a 2D array of numbers: {}", e)))
    }
}

/// Writes the batch under the `predictions` key
pub struct PredictionsEncoder;

impl JsonDataResponseEncoder for PredictionsEncoder {
    type Input = Matrix;

    fn encode(&self, outputs: Matrix) -> Result<Value> {
        Ok(json!({ "predictions": outputs }))
    }
}
