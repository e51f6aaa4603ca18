//! Agent registry -- the set of domain agents a service exposes.
//!
//! The HTTP layer and the CLI look agents up by [`DomainKind`] at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Agent, EventsAgent, ItineraryAgent, RestaurantAgent};
use crate::config::GeneratorConfig;
use crate::generator::Generator;
use crate::schema::DomainKind;

/// A collection of registered [`Agent`] implementations, keyed by domain.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<DomainKind, Box<dyn Agent>>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// One agent per domain, all sharing `generator` and the model
    /// parameters and timeout from `config`.
    pub fn standard(generator: Arc<dyn Generator>, config: &GeneratorConfig) -> Self {
        let params = config.params();
        let mut registry = Self::new();
        registry.register(
            ItineraryAgent::new(Arc::clone(&generator), params.clone()).with_timeout(config.timeout),
        );
        registry.register(
            EventsAgent::new(Arc::clone(&generator), params.clone()).with_timeout(config.timeout),
        );
        registry.register(RestaurantAgent::new(generator, params).with_timeout(config.timeout));
        registry
    }

    /// Register an agent under [`Agent::kind`]. An agent already registered
    /// for the same domain is replaced and returned.
    pub fn register(&mut self, agent: impl Agent + 'static) -> Option<Box<dyn Agent>> {
        self.agents.insert(agent.kind(), Box::new(agent))
    }

    pub fn get(&self, kind: DomainKind) -> Option<&dyn Agent> {
        self.agents.get(&kind).map(|b| b.as_ref())
    }

    /// Registered domains in declaration order.
    pub fn kinds(&self) -> Vec<DomainKind> {
        DomainKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.agents.contains_key(kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::agent::AgentResponse;
    use crate::extract::Record;
    use crate::generator::{GenerationRequest, GeneratorError};

    struct SilentGenerator;

    #[async_trait]
    impl Generator for SilentGenerator {
        fn name(&self) -> &str {
            "silent"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
            Err(GeneratorError::EmptyResponse)
        }
    }

    /// Agent that accepts anything and always reports an empty failure.
    struct StubAgent(DomainKind);

    #[async_trait]
    impl Agent for StubAgent {
        fn kind(&self) -> DomainKind {
            self.0
        }

        fn validate_input(&self, _input: &Record) -> bool {
            true
        }

        async fn process_with_cancel(
            &self,
            _input: Record,
            _cancel: CancellationToken,
        ) -> AgentResponse {
            AgentResponse::failure(&crate::agent::AgentError::Unexpected("stub".into()))
        }
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = AgentRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(DomainKind::Events).is_none());
    }

    #[test]
    fn standard_registry_covers_every_domain() {
        let registry =
            AgentRegistry::standard(Arc::new(SilentGenerator), &GeneratorConfig::new("k"));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.kinds(), DomainKind::ALL.to_vec());
        for kind in DomainKind::ALL {
            assert_eq!(registry.get(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn register_replaces_same_domain() {
        let mut registry = AgentRegistry::new();
        assert!(registry.register(StubAgent(DomainKind::Events)).is_none());
        let old = registry.register(StubAgent(DomainKind::Events));
        assert!(old.is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn debug_lists_domains() {
        let mut registry = AgentRegistry::new();
        registry.register(StubAgent(DomainKind::Restaurants));
        let debug = format!("{registry:?}");
        assert!(debug.contains("Restaurants"));
    }
}
