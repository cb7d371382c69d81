//! The analysis pipeline: one detached task per accepted job.
//!
//! A run invokes research first, analyst and regulatory concurrently,
//! then synthesis, recording progress in the job store after every step
//! and publishing events along the way. Every run ends in exactly one
//! terminal store write; there are no retries and no mid-flight
//! cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use agents::{AdapterError, AgentContext, AgentSet};
use consilium_core::{
    AnalysisRequest, ArtifactFormat, ArtifactSet, Job, JobError, JobPatch, JobResult, JobStatus,
    Stage,
};
use db::JobRepository;
use events::{Event, EventBus, EventEnvelope};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::artifacts::ArtifactStore;
use crate::error::Result;
use crate::renderer::ReportRenderer;

/// Progress once the job leaves the queue
const PROGRESS_STARTED: u8 = 10;
/// Progress once research output has landed
const PROGRESS_RESEARCH_DONE: u8 = 30;
/// Progress once analyst and regulatory outputs have both landed
const PROGRESS_PARALLEL_DONE: u8 = 70;

/// Drives analysis jobs from `queued` to a terminal state.
///
/// Cheap to clone: clones share the adapters, the repository pool, the
/// event bus, and the artifact store, so one instance wired at startup
/// serves every job.
#[derive(Clone)]
pub struct AnalysisPipeline {
    agents: AgentSet,
    repository: JobRepository,
    events: EventBus,
    artifacts: ArtifactStore,
    renderer: Option<Arc<dyn ReportRenderer>>,
}

impl AnalysisPipeline {
    pub fn new(
        agents: AgentSet,
        repository: JobRepository,
        events: EventBus,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            agents,
            repository,
            events,
            artifacts,
            renderer: None,
        }
    }

    /// Wire up a renderer for the PDF/PPTX deliverables. Without one,
    /// only the JSON deliverable is produced.
    pub fn with_renderer(mut self, renderer: Arc<dyn ReportRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Accept a request: persist the queued job, announce it, and spawn
    /// the detached pipeline task. Returns the stored job immediately;
    /// callers poll the status API for everything after that.
    pub async fn submit(&self, request: AnalysisRequest) -> Result<Job> {
        let job = Job::new(request);
        let created = self.repository.create(&job).await?;

        self.events.publish(EventEnvelope::new(Event::JobSubmitted {
            job_id: created.id,
            company_name: created.input.company_name.clone(),
        }));

        info!(
            job_id = %created.id,
            company = %created.input.company_name,
            "Analysis job accepted"
        );

        let pipeline = self.clone();
        let spawned = created.clone();
        tokio::spawn(async move {
            pipeline.run(spawned).await;
        });

        Ok(created)
    }

    /// Run one job to its terminal state. Normally entered via the task
    /// [`submit`](Self::submit) spawns; public so workers and tests can
    /// drive a job directly.
    pub async fn run(&self, job: Job) {
        let job_id = job.id;
        info!(
            job_id = %job_id,
            company = %job.input.company_name,
            "Analysis pipeline started"
        );

        match self.execute(&job).await {
            Ok(result) => self.finish_completed(job_id, result).await,
            Err(job_error) => self.finish_failed(job_id, job_error).await,
        }
    }

    async fn execute(&self, job: &Job) -> std::result::Result<JobResult, JobError> {
        let job_id = job.id;

        self.advance(
            job_id,
            JobStatus::Queued,
            JobPatch::processing(PROGRESS_STARTED),
            Stage::Research,
        )
        .await?;

        let mut context = AgentContext::new(job.input.clone());

        let research = self
            .timed_stage(job_id, Stage::Research, self.agents.research.invoke(&context))
            .await?;
        context.research = Some(research.clone());
        self.advance(
            job_id,
            JobStatus::Processing,
            JobPatch::progress(PROGRESS_RESEARCH_DONE),
            Stage::Research,
        )
        .await?;

        // Both branches are awaited to the end; on a double fault the
        // analyst error wins and the sibling's output is dropped.
        let (analysis, regulatory) = {
            let analyst = self.timed_stage(
                job_id,
                Stage::Analyst,
                self.agents.analyst.invoke(&context),
            );
            let regulatory = self.timed_stage(
                job_id,
                Stage::Regulatory,
                self.agents.regulatory.invoke(&context),
            );
            let (analysis, regulatory) = tokio::join!(analyst, regulatory);
            (analysis?, regulatory?)
        };
        context.analysis = Some(analysis.clone());
        context.regulatory = Some(regulatory.clone());
        self.advance(
            job_id,
            JobStatus::Processing,
            JobPatch::progress(PROGRESS_PARALLEL_DONE),
            Stage::Analyst,
        )
        .await?;

        let synthesis = self
            .timed_stage(
                job_id,
                Stage::Synthesis,
                self.agents.synthesizer.invoke(&context),
            )
            .await?;

        let mut result = JobResult {
            research,
            analysis,
            regulatory,
            synthesis,
            artifacts: ArtifactSet::default(),
        };
        self.write_artifacts(job_id, &mut result).await;

        Ok(result)
    }

    /// Publish the stage lifecycle events around one adapter invocation
    /// and time it.
    async fn timed_stage<T>(
        &self,
        job_id: Uuid,
        stage: Stage,
        invoke: impl Future<Output = std::result::Result<T, AdapterError>>,
    ) -> std::result::Result<T, JobError> {
        self.events.publish(EventEnvelope::new(Event::StageStarted {
            job_id,
            stage: stage.as_str().to_string(),
        }));
        info!(job_id = %job_id, stage = %stage, "Stage started");

        let started = Instant::now();
        match invoke.await {
            Ok(output) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                self.events
                    .publish(EventEnvelope::new(Event::StageCompleted {
                        job_id,
                        stage: stage.as_str().to_string(),
                        duration_ms,
                    }));
                info!(job_id = %job_id, stage = %stage, duration_ms, "Stage completed");
                Ok(output)
            }
            Err(adapter_error) => {
                warn!(
                    job_id = %job_id,
                    stage = %stage,
                    error = %adapter_error,
                    "Stage failed"
                );
                Err(adapter_error.into())
            }
        }
    }

    /// Apply a store patch and publish the status change. A patch the
    /// store rejects or cannot reach fails the run, blamed on the stage
    /// whose output was being recorded.
    async fn advance(
        &self,
        job_id: Uuid,
        from: JobStatus,
        patch: JobPatch,
        stage: Stage,
    ) -> std::result::Result<Job, JobError> {
        let updated = self
            .repository
            .update(job_id, &patch)
            .await
            .map_err(|e| JobError::new(stage, e.to_string()))?
            .ok_or_else(|| JobError::new(stage, format!("job {job_id} missing from the store")))?;

        self.events
            .publish(EventEnvelope::new(Event::JobStatusChanged {
                job_id,
                from_status: from.as_str().to_string(),
                to_status: updated.status.as_str().to_string(),
                progress: updated.progress,
            }));

        Ok(updated)
    }

    /// Write the JSON deliverable and, when a renderer is wired, the PDF
    /// and PPTX ones. A failed deliverable is logged and skipped; the job
    /// still completes with whatever was produced.
    async fn write_artifacts(&self, job_id: Uuid, result: &mut JobResult) {
        match self.artifacts.write_json(job_id, result).await {
            Ok(path) => result
                .artifacts
                .set(ArtifactFormat::Json, path.to_string_lossy()),
            Err(artifact_error) => {
                warn!(job_id = %job_id, error = %artifact_error, "Failed to write JSON artifact");
            }
        }

        let Some(renderer) = &self.renderer else {
            debug!(job_id = %job_id, "No renderer configured, skipping binary artifacts");
            return;
        };

        for format in [ArtifactFormat::Pdf, ArtifactFormat::Pptx] {
            match renderer.render(job_id, result, format).await {
                Ok(bytes) => match self.artifacts.write_bytes(job_id, format, &bytes).await {
                    Ok(path) => result.artifacts.set(format, path.to_string_lossy()),
                    Err(artifact_error) => warn!(
                        job_id = %job_id,
                        format = format.as_str(),
                        error = %artifact_error,
                        "Failed to write rendered artifact"
                    ),
                },
                Err(render_error) => warn!(
                    job_id = %job_id,
                    format = format.as_str(),
                    error = %render_error,
                    "Renderer failed, artifact skipped"
                ),
            }
        }
    }

    async fn finish_completed(&self, job_id: Uuid, result: JobResult) {
        match self
            .repository
            .update(job_id, &JobPatch::completed(result))
            .await
        {
            Ok(Some(job)) => {
                self.events
                    .publish(EventEnvelope::new(Event::JobStatusChanged {
                        job_id,
                        from_status: JobStatus::Processing.as_str().to_string(),
                        to_status: job.status.as_str().to_string(),
                        progress: job.progress,
                    }));
                self.events
                    .publish(EventEnvelope::new(Event::JobCompleted { job_id }));
                info!(job_id = %job_id, "Analysis pipeline completed");
            }
            Ok(None) => self.report_lost_job(job_id, "completion").await,
            Err(db_error) => {
                error!(job_id = %job_id, error = %db_error, "Failed to record job completion");
                self.events.publish(EventEnvelope::new(Event::Error {
                    message: format!("failed to record completion of job {job_id}: {db_error}"),
                    context: None,
                }));
            }
        }
    }

    async fn finish_failed(&self, job_id: Uuid, job_error: JobError) {
        warn!(
            job_id = %job_id,
            stage = %job_error.stage,
            error = %job_error.message,
            "Analysis pipeline failed"
        );

        let stage = job_error.stage;
        let message = job_error.message.clone();

        match self
            .repository
            .update(job_id, &JobPatch::failed(job_error))
            .await
        {
            Ok(Some(job)) => {
                self.events
                    .publish(EventEnvelope::new(Event::JobStatusChanged {
                        job_id,
                        from_status: JobStatus::Processing.as_str().to_string(),
                        to_status: job.status.as_str().to_string(),
                        progress: job.progress,
                    }));
                self.events.publish(EventEnvelope::new(Event::JobFailed {
                    job_id,
                    stage: stage.as_str().to_string(),
                    message,
                }));
            }
            Ok(None) => self.report_lost_job(job_id, "failure").await,
            Err(db_error) => {
                error!(job_id = %job_id, error = %db_error, "Failed to record job failure");
                self.events.publish(EventEnvelope::new(Event::Error {
                    message: format!("failed to record failure of job {job_id}: {db_error}"),
                    context: None,
                }));
            }
        }
    }

    async fn report_lost_job(&self, job_id: Uuid, outcome: &str) {
        error!(job_id = %job_id, "Job missing from the store at terminal write");
        self.events.publish(EventEnvelope::new(Event::Error {
            message: format!("job {job_id} missing from the store at {outcome}"),
            context: None,
        }));
    }
}
