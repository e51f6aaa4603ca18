//! Generator interface: the external text-completion service.
//!
//! ```text
//! DomainAgent
//!     |
//!     | generate(&GenerationRequest)
//!     v
//! Arc<dyn Generator> --(HTTP)--> chat completions endpoint
//!     |
//!     v
//! Result<String, GeneratorError>   (raw text, not yet validated)
//! ```
//!
//! The generator is the only suspension point of a request. Everything it
//! returns is untrusted text that goes through [`crate::extract`].

pub mod error;
pub mod openai;
pub mod trait_def;
pub mod types;

pub use error::GeneratorError;
pub use openai::OpenAiGenerator;
pub use trait_def::Generator;
pub use types::{GenerationRequest, ModelParams};
