//! Step contract and linear composition
//!
//! A [`Step`] transforms the `data_inputs` of a batch. Most steps only
//! implement [`Step::transform`]; steps that need the whole envelope or the
//! execution path (such as a remote stage) override
//! [`Step::handle_transform`] instead.
//!
//! Steps are synchronous. Callers running inside an async runtime are
//! expected to move pipeline execution onto a blocking thread.

use crate::context::ExecutionContext;
use crate::data::DataContainer;
use crate::Result;
use std::marker::PhantomData;

/// A synchronous pipeline step
pub trait Step: Send + Sync {
    /// Type of the batch this step consumes
    type Input;

    /// Type of the batch this step produces
    type Output;

    /// Name used as this step's segment in the execution path
    fn name(&self) -> &str;

    /// Transform a bare batch
    fn transform(&self, data_inputs: Self::Input) -> Result<Self::Output>;

    /// Transform a batch envelope within `context`
    ///
    /// The default pushes [`Step::name`] on the context and applies
    /// [`Step::transform`] to `data_inputs`, keeping the other fields.
    fn handle_transform(
        &self,
        data_container: DataContainer<Self::Input>,
        context: &ExecutionContext,
    ) -> Result<DataContainer<Self::Output>> {
        let context = context.push(self.name());
        tracing::trace!(path = %context.get_path(false), "Transforming batch");
        data_container.map_data_inputs(|data_inputs| self.transform(data_inputs))
    }
}

/// Composition helpers available on every [`Step`]
pub trait StepExt: Step + Sized {
    /// Run `next` on the output of this step
    fn then<B>(self, next: B) -> Chain<Self, B>
    where
        B: Step<Input = Self::Output>,
    {
        Chain {
            first: self,
            second: next,
        }
    }
}

impl<S: Step> StepExt for S {}

/// Two steps run one after the other
///
/// A chain adds no segment to the execution path: its steps see the
/// context of whoever runs the chain.
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A, B> Step for Chain<A, B>
where
    A: Step,
    B: Step<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    fn name(&self) -> &str {
        "Chain"
    }

    /// Runs the chain on a fresh root context
    fn transform(&self, data_inputs: Self::Input) -> Result<Self::Output> {
        let output =
            self.handle_transform(DataContainer::new(data_inputs), &ExecutionContext::default())?;
        Ok(output.into_data_inputs())
    }

    fn handle_transform(
        &self,
        data_container: DataContainer<Self::Input>,
        context: &ExecutionContext,
    ) -> Result<DataContainer<Self::Output>> {
        let intermediate = self.first.handle_transform(data_container, context)?;
        self.second.handle_transform(intermediate, context)
    }
}

/// Step that returns its input unchanged
pub struct Identity<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Identity<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Identity<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Step for Identity<T> {
    type Input = T;
    type Output = T;

    fn name(&self) -> &str {
        "Identity"
    }

    fn transform(&self, data_inputs: T) -> Result<T> {
        Ok(data_inputs)
    }
}
