pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Consilium API",
        version = "0.1.0",
        description = "API for Consilium - multi-agent strategic analysis service"
    ),
    paths(
        routes::health_check,
        routes::submit_analysis,
        routes::get_status,
        routes::get_results,
        routes::download_artifact,
        routes::list_analyses,
        routes::clarify,
        routes::sse::events_stream,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::SubmitResponse,
        routes::StatusResponse,
        routes::JobSummary,
        routes::ClarifyResponse,
        consilium_core::AnalysisRequest,
        consilium_core::Clarification,
        consilium_core::Job,
        consilium_core::JobStatus,
        consilium_core::JobResult,
        consilium_core::JobError,
        consilium_core::Stage,
        consilium_core::ArtifactSet,
        consilium_core::ResearchBrief,
        consilium_core::CompetitorProfile,
        consilium_core::NewsItem,
        consilium_core::FinancialSnapshot,
        consilium_core::Citation,
        consilium_core::MarketAssessment,
        consilium_core::MarketSize,
        consilium_core::UnitEconomic,
        consilium_core::Scenario,
        consilium_core::RegulatoryAssessment,
        consilium_core::RegulatoryFinding,
        consilium_core::RiskLevel,
        consilium_core::SynthesisReport,
        consilium_core::RoadmapStep,
        consilium_core::Verdict,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "analyses", description = "Analysis job submission and tracking"),
        (name = "events", description = "Real-time event streaming (SSE)"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/analyze", post(routes::submit_analysis))
        .route("/status/{job_id}", get(routes::get_status))
        .route("/results/{job_id}", get(routes::get_results))
        .route("/download/{job_id}/{format}", get(routes::download_artifact))
        .route("/analyses", get(routes::list_analyses))
        .route("/clarify", post(routes::clarify))
        .route("/events", get(routes::sse::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
