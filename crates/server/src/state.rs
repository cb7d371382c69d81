use crate::config::ServiceConfig;
use crate::routes::sse::{EventBuffer, SharedEventBuffer, DEFAULT_EVENT_BUFFER_SIZE};
use agents::{AgentSet, Clarifier, GatewayClient};
use consilium_core::Stage;
use db::JobRepository;
use events::EventBus;
use orchestrator::{AnalysisPipeline, ArtifactStore, HttpRenderer};
use sqlx::SqlitePool;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub repository: JobRepository,
    pub pipeline: Arc<AnalysisPipeline>,
    pub clarifier: Arc<Clarifier>,
    pub artifacts: ArtifactStore,
    pub event_bus: EventBus,
    pub event_buffer: SharedEventBuffer,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &ServiceConfig) -> Self {
        let event_bus = EventBus::new();
        let event_buffer = Arc::new(RwLock::new(EventBuffer::new(DEFAULT_EVENT_BUFFER_SIZE)));
        let repository = JobRepository::new(pool);
        let artifacts = ArtifactStore::new(config.artifacts_dir.clone());

        let gateway = Arc::new(GatewayClient::new(config.gateway_url.clone()));
        let agents = AgentSet::over_gateway(Arc::clone(&gateway), &config.stage_models);
        let clarifier = Arc::new(Clarifier::new(
            Arc::clone(&gateway),
            config.stage_models.for_stage(Stage::Research),
        ));

        let mut pipeline = AnalysisPipeline::new(
            agents,
            repository.clone(),
            event_bus.clone(),
            artifacts.clone(),
        );
        if let Some(renderer_url) = &config.renderer_url {
            pipeline = pipeline.with_renderer(Arc::new(HttpRenderer::new(renderer_url.clone())));
        }

        Self {
            repository,
            pipeline: Arc::new(pipeline),
            clarifier,
            artifacts,
            event_bus,
            event_buffer,
        }
    }
}
