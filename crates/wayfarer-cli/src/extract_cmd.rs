//! `wayfarer extract`: run the offline extraction pipeline on a saved
//! generator output and print the resulting envelope.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use wayfarer_core::agent::{AgentError, AgentResponse};
use wayfarer_core::domain::{Domain, EventsDomain, ItineraryDomain, RestaurantsDomain};
use wayfarer_core::extract;
use wayfarer_core::schema::DomainKind;

/// Print the envelope for `file` (or stdin) as pretty JSON. Returns whether
/// extraction succeeded.
pub fn run_extract(kind: DomainKind, file: Option<&Path>) -> Result<bool> {
    let raw = read_input(file)?;
    let envelope = envelope_for(kind, &raw);

    if let Some(failure) = envelope.failure_kind() {
        tracing::warn!(%failure, "extraction failed");
    }
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(envelope.is_success())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read stdin")?;
            Ok(raw)
        }
    }
}

pub fn envelope_for(kind: DomainKind, raw: &str) -> AgentResponse {
    match kind {
        DomainKind::Itinerary => extract_as::<ItineraryDomain>(raw),
        DomainKind::Events => extract_as::<EventsDomain>(raw),
        DomainKind::Restaurants => extract_as::<RestaurantsDomain>(raw),
    }
}

fn extract_as<D: Domain>(raw: &str) -> AgentResponse {
    match extract::extract::<D::Response>(raw, D::schema()) {
        Ok(response) => AgentResponse::success(&response),
        Err(e) => AgentResponse::failure(&AgentError::from(e)),
    }
}
