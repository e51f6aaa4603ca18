//! The agent contract: one request/response cycle per domain.
//!
//! ```text
//! Record --validate_input--> Request --prompt--> Generator --raw text-->
//!     normalize -> parse -> validate(schema) -> construct --> AgentResponse
//! ```
//!
//! [`DomainAgent`] implements the whole cycle once, parameterized by a
//! [`Domain`]. Every stage returns a classified error; the single conversion
//! into an [`AgentResponse`] happens in [`Agent::process_with_cancel`], which
//! never fails and never panics outward.

pub mod envelope;
pub mod registry;

use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::domain::{self, Domain, EventsDomain, ItineraryDomain, RestaurantsDomain};
use crate::error::FailureKind;
use crate::extract::{self, ExtractionError, Record};
use crate::generator::{GenerationRequest, Generator, GeneratorError, ModelParams};
use crate::schema::DomainKind;

pub use envelope::AgentResponse;
pub use registry::AgentRegistry;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Every way a request can fail, in pipeline order.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid input data: {0}")]
    InvalidInput(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GeneratorError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AgentError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InputValidationError,
            Self::Generation(_) => FailureKind::GenerationFailure,
            Self::Extraction(e) => e.kind(),
            Self::Unexpected(_) => FailureKind::UnexpectedError,
        }
    }
}

// ---------------------------------------------------------------------------
// Agent trait
// ---------------------------------------------------------------------------

/// Uniform capability implemented by each domain agent.
///
/// Object-safe, so agents can be stored as `Arc<dyn Agent>` in the
/// [`AgentRegistry`].
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> DomainKind;

    /// Flat presence check of the domain's required request fields.
    fn validate_input(&self, input: &Record) -> bool;

    /// Run one request to completion. Always returns an envelope.
    async fn process(&self, input: Record) -> AgentResponse {
        self.process_with_cancel(input, CancellationToken::new()).await
    }

    /// Like [`Agent::process`], abandoning the generator call as soon as
    /// `cancel` fires.
    async fn process_with_cancel(
        &self,
        input: Record,
        cancel: CancellationToken,
    ) -> AgentResponse;
}

// Compile-time assertion: Agent must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Agent) {}
};

// ---------------------------------------------------------------------------
// DomainAgent
// ---------------------------------------------------------------------------

/// The single agent implementation, specialized per domain by `D`.
pub struct DomainAgent<D: Domain> {
    generator: Arc<dyn Generator>,
    params: ModelParams,
    timeout: Option<Duration>,
    _domain: PhantomData<fn() -> D>,
}

pub type ItineraryAgent = DomainAgent<ItineraryDomain>;
pub type EventsAgent = DomainAgent<EventsDomain>;
pub type RestaurantAgent = DomainAgent<RestaurantsDomain>;

impl<D: Domain> std::fmt::Debug for DomainAgent<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainAgent")
            .field("domain", &D::KIND)
            .field("generator", &self.generator.name())
            .field("params", &self.params)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<D: Domain> DomainAgent<D> {
    pub fn new(generator: Arc<dyn Generator>, params: ModelParams) -> Self {
        Self {
            generator,
            params,
            timeout: None,
            _domain: PhantomData,
        }
    }

    /// Bound each generator call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn missing_input(input: &Record) -> Vec<&'static str> {
        D::REQUIRED_INPUT
            .iter()
            .copied()
            .filter(|field| !input.contains_key(*field))
            .collect()
    }

    async fn run(&self, input: Record, cancel: &CancellationToken) -> Result<D::Response, AgentError> {
        let input = domain::with_defaults::<D>(input);
        let missing = Self::missing_input(&input);
        if !missing.is_empty() {
            return Err(AgentError::InvalidInput(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        let request: D::Request = serde_json::from_value(Value::Object(input))
            .map_err(|e| AgentError::InvalidInput(e.to_string()))?;
        info!("generating {} for {}", D::KIND, D::describe(&request));

        let raw = self.invoke_generator(&request, cancel).await?;
        debug!(bytes = raw.len(), "received generator output");

        Ok(extract::extract::<D::Response>(&raw, D::schema())?)
    }

    /// Render the prompt for `request` and await the generator's raw text.
    ///
    /// This is the only suspension point of the pipeline. The call is
    /// abandoned when `cancel` fires or the configured timeout elapses.
    pub async fn invoke_generator(
        &self,
        request: &D::Request,
        cancel: &CancellationToken,
    ) -> Result<String, GeneratorError> {
        let prompt = D::prompt(request);
        let generation = GenerationRequest {
            system: prompt.system,
            user: prompt.user,
            params: self.params.clone(),
        };

        let call = self.generator.generate(&generation);
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .unwrap_or(Err(GeneratorError::Timeout)),
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GeneratorError::Cancelled),
            result = bounded => result,
        }
    }
}

#[async_trait]
impl<D: Domain> Agent for DomainAgent<D> {
    fn kind(&self) -> DomainKind {
        D::KIND
    }

    fn validate_input(&self, input: &Record) -> bool {
        Self::missing_input(&domain::with_defaults::<D>(input.clone())).is_empty()
    }

    async fn process_with_cancel(
        &self,
        input: Record,
        cancel: CancellationToken,
    ) -> AgentResponse {
        let span = info_span!("agent", domain = %D::KIND, request_id = %Uuid::new_v4());

        async move {
            let outcome = AssertUnwindSafe(self.run(input, &cancel)).catch_unwind().await;
            match outcome {
                Ok(Ok(response)) => {
                    info!(items = D::item_count(&response), "request succeeded");
                    AgentResponse::success(&response)
                }
                Ok(Err(err)) => {
                    warn!(kind = %err.kind(), "request failed: {err}");
                    AgentResponse::failure(&err)
                }
                Err(panic) => {
                    let err = AgentError::Unexpected(panic_message(panic.as_ref()));
                    error!("agent panicked: {err}");
                    AgentResponse::failure(&err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "agent panicked".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
