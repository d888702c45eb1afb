//! remotestage core - pipeline abstractions shared by the HTTP transport
//!
//! This crate defines the pieces a served or remotely-called pipeline is
//! made of, with no transport dependencies:
//!
//! - [`Step`]: a synchronous transformation, composable with [`StepExt::then`]
//! - [`DataContainer`]: the batch envelope (ids, inputs, expected outputs,
//!   summary id) steps exchange
//! - [`ExecutionContext`]: the path of step names a batch is traversing
//! - [`codec`]: JSON decoder/encoder contracts used at an HTTP boundary
//!
//! The HTTP transport (`remotestage-http`) builds the REST endpoint binder
//! and the remote-stage caller on top of these.

#![warn(clippy::all)]

pub mod codec;
pub mod context;
pub mod data;
pub mod error;
pub mod step;

pub use codec::{DecoderStep, EncoderStep, JsonDataBodyDecoder, JsonDataResponseEncoder};
pub use context::ExecutionContext;
pub use data::DataContainer;
pub use error::{Error, Result};
pub use step::{Chain, Identity, Step, StepExt};
