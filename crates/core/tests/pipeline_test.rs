//! Composed pipelines through the public API
//!
//! Covers decode -> steps -> encode chains the way a served pipeline runs
//! them, including steps that only work inside a batch context.

use remotestage_core::{
    DataContainer, DecoderStep, EncoderStep, Error, ExecutionContext, Identity,
    JsonDataBodyDecoder, JsonDataResponseEncoder, Result, Step, StepExt,
};
use serde_json::{json, Value};

struct RowsDecoder;

impl JsonDataBodyDecoder for RowsDecoder {
    type Output = Vec<f64>;

    fn decode(&self, body: Value) -> Result<Vec<f64>> {
        serde_json::from_value(body["rows"].clone()).map_err(|e| Error::Decode(e.to_string()))
    }
}

struct RowsEncoder;

impl JsonDataResponseEncoder for RowsEncoder {
    type Input = Vec<f64>;

    fn encode(&self, outputs: Vec<f64>) -> Result<Value> {
        Ok(json!({ "rows": outputs }))
    }
}

struct Scale(f64);

impl Step for Scale {
    type Input = Vec<f64>;
    type Output = Vec<f64>;

    fn name(&self) -> &str {
        "Scale"
    }

    fn transform(&self, data_inputs: Vec<f64>) -> Result<Vec<f64>> {
        Ok(data_inputs.into_iter().map(|x| x * self.0).collect())
    }
}

/// Needs the envelope: tags each output with its current id
struct TagWithIds;

impl Step for TagWithIds {
    type Input = Vec<f64>;
    type Output = Vec<f64>;

    fn name(&self) -> &str {
        "TagWithIds"
    }

    fn transform(&self, _data_inputs: Vec<f64>) -> Result<Vec<f64>> {
        Err(Error::MustBeUsedInsidePipeline(self.name().to_string()))
    }

    fn handle_transform(
        &self,
        data_container: DataContainer<Vec<f64>>,
        _context: &ExecutionContext,
    ) -> Result<DataContainer<Vec<f64>>> {
        let ids: Vec<f64> = data_container
            .current_ids
            .iter()
            .map(|id| id.as_f64().unwrap_or(0.0))
            .collect();
        data_container.map_data_inputs(|di| {
            Ok(di
                .iter()
                .zip(ids.iter().chain(std::iter::repeat(&0.0)))
                .map(|(x, id)| x + id)
                .collect())
        })
    }
}

#[test]
fn test_decode_process_encode() {
    // GIVEN: a served-style pipeline
    let pipeline = DecoderStep::new(RowsDecoder)
        .then(Scale(2.0))
        .then(EncoderStep::new(RowsEncoder));

    // WHEN: running a body through it
    let out = pipeline.transform(json!({ "rows": [1.0, 2.5] })).unwrap();

    // THEN: the encoder sees the scaled rows
    assert_eq!(out, json!({ "rows": [2.0, 5.0] }));
}

#[test]
fn test_identity_pipeline_is_lossless() {
    let pipeline = DecoderStep::new(RowsDecoder)
        .then(Identity::new())
        .then(EncoderStep::new(RowsEncoder));

    let body = json!({ "rows": [0.25, -1.0, 3.0] });
    assert_eq!(pipeline.transform(body.clone()).unwrap(), body);
}

#[test]
fn test_context_step_outside_pipeline_fails() {
    let result = TagWithIds.transform(vec![1.0]);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("must be used inside a pipeline"));
}

#[test]
fn test_context_step_inside_chain_sees_envelope() {
    let pipeline = Scale(10.0).then(TagWithIds);
    let dc = DataContainer::new(vec![1.0, 2.0]).with_current_ids(vec![json!(1), json!(2)]);

    let out = pipeline
        .handle_transform(dc, &ExecutionContext::default())
        .unwrap();

    assert_eq!(out.data_inputs, vec![11.0, 22.0]);
}

#[test]
fn test_decode_error_stops_pipeline() {
    let pipeline = DecoderStep::new(RowsDecoder)
        .then(Scale(2.0))
        .then(EncoderStep::new(RowsEncoder));

    let result = pipeline.transform(json!({ "rows": "nope" }));
    assert!(matches!(result, Err(Error::Decode(_))));
}
