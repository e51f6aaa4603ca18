//! Core of the wayfarer travel planner.
//!
//! A request enters an [`agent::Agent`] as a loose JSON record, is turned
//! into a prompt, sent to a [`generator::Generator`], and the raw text that
//! comes back is normalized, parsed, validated against the domain's
//! [`schema::DomainSchema`] and built into a typed result. The caller always
//! receives an [`agent::AgentResponse`] envelope.

pub mod agent;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod generator;
pub mod prompt;
pub mod schema;

pub use agent::{Agent, AgentError, AgentRegistry, AgentResponse, DomainAgent};
pub use config::GeneratorConfig;
pub use error::FailureKind;
pub use extract::{ExtractionError, Record};
pub use generator::{Generator, GeneratorError, OpenAiGenerator};
pub use schema::{DomainKind, DomainSchema};
