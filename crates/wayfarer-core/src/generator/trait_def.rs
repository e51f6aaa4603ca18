//! The `Generator` trait -- the adapter interface for text-completion
//! services.
//!
//! The trait is object-safe so a single instance can be shared by every
//! agent as `Arc<dyn Generator>`.

use async_trait::async_trait;

use super::error::GeneratorError;
use super::types::GenerationRequest;

/// Adapter interface for an external text generator.
///
/// Implementations must not retry: a failure is reported once and surfaces
/// to the caller as a failed response.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable name for this generator (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one prompt and return the raw completion text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError>;
}

// Compile-time assertion: Generator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};
