use db::{EventRepository, TaskRepository};
use events::EventBus;
use orchestrator::{AgentRegistry, PipelineSupervisor, TaskOrchestrator};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskRepository,
    pub events: EventRepository,
    pub event_bus: EventBus,
    pub supervisor: PipelineSupervisor,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_registry(pool, AgentRegistry::standard())
    }

    /// State with a caller-supplied agent registry; tests use this to run
    /// deterministic agent configurations.
    pub fn with_registry(pool: SqlitePool, registry: AgentRegistry) -> Self {
        let tasks = TaskRepository::new(pool.clone());
        let events = EventRepository::new(pool);
        let event_bus = EventBus::new();
        let orchestrator = Arc::new(
            TaskOrchestrator::new(tasks.clone(), events.clone(), event_bus.clone())
                .with_registry(registry),
        );
        let supervisor = PipelineSupervisor::new(orchestrator);

        Self {
            tasks,
            events,
            event_bus,
            supervisor,
        }
    }
}
