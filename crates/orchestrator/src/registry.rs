use std::collections::HashMap;
use std::sync::Arc;

use crate::agents::{Agent, PlannerAgent, ResearcherAgent, ReviewerAgent, WriterAgent};

/// Explicit name-to-agent mapping owned by the orchestrator.
///
/// Pipelines reference agents by name; resolving an unregistered name is a
/// fatal configuration error for the task that used it.
#[derive(Clone)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Registry with the four standard agents in their default configuration.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PlannerAgent::new()));
        registry.register(Arc::new(ResearcherAgent::new()));
        registry.register(Arc::new(WriterAgent::new()));
        registry.register(Arc::new(ReviewerAgent::new()));
        registry
    }

    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.name().to_string(), agent);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_has_four_agents() {
        let registry = AgentRegistry::standard();

        assert_eq!(registry.len(), 4);
        for name in ["Planner", "Researcher", "Writer", "Reviewer"] {
            assert!(registry.contains(name));
            assert_eq!(registry.get(name).unwrap().name(), name);
        }
    }

    #[test]
    fn test_unknown_name_resolves_to_none() {
        let registry = AgentRegistry::standard();
        assert!(registry.get("Summarizer").is_none());
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = AgentRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(PlannerAgent::new()));
        registry.register(Arc::new(PlannerAgent::with_failure_rate(0.0)));
        assert_eq!(registry.len(), 1);
    }
}
