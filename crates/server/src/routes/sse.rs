use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::state::AppState;

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 1000;
pub const SSE_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub job_ids: Option<String>,
}

/// Bounded replay buffer backing Last-Event-ID reconnects.
pub struct EventBuffer {
    events: VecDeque<events::EventEnvelope>,
    max_size: usize,
}

impl EventBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn push(&mut self, envelope: events::EventEnvelope) {
        if self.events.len() >= self.max_size {
            self.events.pop_front();
        }
        self.events.push_back(envelope);
    }

    pub fn events_after(&self, event_id: Uuid) -> Vec<events::EventEnvelope> {
        let mut found = false;
        self.events
            .iter()
            .filter_map(|envelope| {
                if found {
                    Some(envelope.clone())
                } else if envelope.id == event_id {
                    found = true;
                    None
                } else {
                    None
                }
            })
            .collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

pub type SharedEventBuffer = Arc<RwLock<EventBuffer>>;

fn parse_job_ids(job_ids: Option<&str>) -> Option<Vec<Uuid>> {
    job_ids.map(|s| {
        s.split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    })
}

fn envelope_to_sse_event(envelope: &events::EventEnvelope) -> Result<Event, Infallible> {
    let event_type = match &envelope.event {
        events::Event::JobSubmitted { .. } => "job.submitted",
        events::Event::JobStatusChanged { .. } => "job.status_changed",
        events::Event::StageStarted { .. } => "stage.started",
        events::Event::StageCompleted { .. } => "stage.completed",
        events::Event::JobCompleted { .. } => "job.completed",
        events::Event::JobFailed { .. } => "job.failed",
        events::Event::Error { .. } => "error",
    };

    let data = serde_json::to_string(&envelope).unwrap_or_else(|_| "{}".to_string());

    Ok(Event::default()
        .id(envelope.id.to_string())
        .event(event_type)
        .data(data))
}

#[utoipa::path(
    get,
    path = "/events",
    params(
        ("job_ids" = Option<String>, Query, description = "Comma-separated job IDs to filter events"),
    ),
    responses(
        (status = 200, description = "SSE event stream"),
    ),
    tag = "events"
)]
pub async fn events_stream(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
    headers: axum::http::HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let job_ids = parse_job_ids(query.job_ids.as_deref());
    let last_event_id = headers
        .get("Last-Event-ID")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<Uuid>().ok());

    let buffer = Arc::clone(&state.event_buffer);
    let buffer_for_live = Arc::clone(&buffer);

    let rx = state.event_bus.subscribe();

    let missed_events = if let Some(event_id) = last_event_id {
        buffer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .events_after(event_id)
    } else {
        vec![]
    };

    let missed_stream =
        futures::stream::iter(missed_events.into_iter().map(|e| envelope_to_sse_event(&e)));

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| {
        let job_ids = job_ids.clone();
        let buffer = Arc::clone(&buffer_for_live);

        async move {
            match result {
                Ok(envelope) => {
                    buffer
                        .write()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .push(envelope.clone());

                    if let Some(ref ids) = job_ids {
                        if let Some(event_job_id) = envelope.event.job_id() {
                            if !ids.contains(&event_job_id) {
                                return None;
                            }
                        }
                    }

                    Some(envelope_to_sse_event(&envelope))
                }
                Err(e) => {
                    tracing::warn!("SSE broadcast error: {:?}", e);
                    None
                }
            }
        }
    });

    let stream = missed_stream.chain(live_stream);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(SSE_KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}
