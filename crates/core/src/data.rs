//! Batch envelope exchanged between pipeline steps
//!
//! A [`DataContainer`] carries one batch through a pipeline. Only
//! `data_inputs` is typed: it is what steps transform. The ids, expected
//! outputs and summary id are opaque JSON that travel alongside the batch
//! unchanged, so they survive a hop through a remote stage as-is.
//!
//! The serde form is the JSON envelope remote stages exchange:
//! `{"data_inputs": ..., "expected_outputs": ..., "current_ids": [...], "summary_id": ...}`.
//! Absent expected outputs and summary id are `null`, never missing, so a
//! container always reads back equal to what was written.

use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One batch of pipeline data plus its bookkeeping fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataContainer<T> {
    /// Identifiers of the items in the batch
    #[serde(default, deserialize_with = "null_as_empty")]
    pub current_ids: Vec<Value>,

    /// The batch itself
    pub data_inputs: T,

    /// Targets for the batch, `null` when there are none
    #[serde(default)]
    pub expected_outputs: Value,

    /// Identifier summarizing the whole batch, `null` when unset
    #[serde(default)]
    pub summary_id: Value,
}

/// Accept `null` for a list of ids
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> DataContainer<T> {
    /// Wrap `data_inputs` with no ids, no expected outputs and no summary id
    pub fn new(data_inputs: T) -> Self {
        Self {
            current_ids: Vec::new(),
            data_inputs,
            expected_outputs: Value::Null,
            summary_id: Value::Null,
        }
    }

    pub fn with_current_ids(mut self, current_ids: Vec<Value>) -> Self {
        self.current_ids = current_ids;
        self
    }

    pub fn with_expected_outputs(mut self, expected_outputs: Value) -> Self {
        self.expected_outputs = expected_outputs;
        self
    }

    pub fn with_summary_id(mut self, summary_id: Value) -> Self {
        self.summary_id = summary_id;
        self
    }

    /// Transform `data_inputs`, keeping every other field
    pub fn map_data_inputs<U, F>(self, f: F) -> Result<DataContainer<U>>
    where
        F: FnOnce(T) -> Result<U>,
    {
        Ok(DataContainer {
            current_ids: self.current_ids,
            data_inputs: f(self.data_inputs)?,
            expected_outputs: self.expected_outputs,
            summary_id: self.summary_id,
        })
    }

    pub fn into_data_inputs(self) -> T {
        self.data_inputs
    }
}
