use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use server::config::ServiceConfig;
use server::{create_router, state::AppState};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const POLL_DEADLINE: Duration = Duration::from_secs(10);

async fn setup_test_server() -> (TestServer, TempDir, MockServer) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = db::create_pool(&db_url).await.expect("Failed to create pool");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    let mock_gateway = MockServer::start().await;

    let config = ServiceConfig {
        gateway_url: mock_gateway.uri(),
        artifacts_dir: temp_dir.path().join("data").display().to_string(),
        ..ServiceConfig::default()
    };

    let state = AppState::new(pool, &config);
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");

    (server, temp_dir, mock_gateway)
}

fn completion_body(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

/// Mount a completion mock for one stage, matched on a phrase unique to
/// that stage's prompt.
async fn mock_stage(gateway: &MockServer, marker: &str, output: Value) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(marker))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(&output.to_string())))
        .mount(gateway)
        .await;
}

async fn mock_stage_with_delay(gateway: &MockServer, marker: &str, output: Value, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(marker))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body(&output.to_string()))
                .set_delay(delay),
        )
        .mount(gateway)
        .await;
}

fn research_output() -> Value {
    json!({
        "key_findings": ["Gulf delivery penetration is still low"],
        "market_context": "Food delivery in Saudi Arabia is consolidating around two platforms",
        "citations": [{"source": "Company filings", "url": null, "date": null, "relevance_score": 0.8}]
    })
}

fn analyst_output() -> Value {
    json!({
        "market_size": {"tam": 4200000000.0, "sam": 900000000.0, "som": 120000000.0, "currency": "USD"},
        "unit_economics": [{"name": "AOV", "value": 18.5, "unit": "USD"}],
        "revenue_outlook": "Contribution-positive by year three",
        "scenarios": [{"name": "base", "summary": "Steady share gain", "projected_revenue": 80000000.0}]
    })
}

fn regulatory_output() -> Value {
    json!({
        "overall_risk": "medium",
        "findings": [{"topic": "foreign ownership", "summary": "Local sponsor requirements apply"}],
        "key_blockers": [],
        "compliance_roadmap": ["Register a local entity", "Obtain municipal delivery licenses"]
    })
}

fn synthesis_output() -> Value {
    json!({
        "executive_summary": "Expansion is viable with a phased market entry",
        "verdict": "conditional",
        "key_recommendations": ["Start with Riyadh and Jeddah"],
        "implementation_roadmap": [{"title": "Phase 1", "focus": "Licensing and local partnerships"}],
        "success_metrics": ["Monthly order volume", "Contribution margin per order"]
    })
}

async fn mock_happy_pipeline(gateway: &MockServer) {
    mock_stage(gateway, "Research the subject below", research_output()).await;
    mock_stage(gateway, "Size the market", analyst_output()).await;
    mock_stage(gateway, "Assess the regulatory", regulatory_output()).await;
    mock_stage(gateway, "Synthesize the findings", synthesis_output()).await;
}

fn zomato_request() -> Value {
    json!({
        "company_name": "Zomato",
        "industry": "Food Delivery",
        "strategic_question": "Should Zomato expand into Saudi Arabia?"
    })
}

async fn submit_job(server: &TestServer) -> String {
    let response = server.post("/analyze").json(&zomato_request()).await;
    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    body["job_id"].as_str().expect("job_id missing").to_string()
}

async fn poll_until_terminal(server: &TestServer, job_id: &str) -> Value {
    let started = std::time::Instant::now();
    loop {
        let response = server.get(&format!("/status/{}", job_id)).await;
        response.assert_status_ok();
        let body: Value = response.json();

        if matches!(body["status"].as_str(), Some("completed") | Some("failed")) {
            return body;
        }

        assert!(
            started.elapsed() < POLL_DEADLINE,
            "job {} never reached a terminal state: {}",
            job_id,
            body
        );
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
    }
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn test_submit_returns_202_queued() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_happy_pipeline(&gateway).await;

        let response = server.post("/analyze").json(&zomato_request()).await;

        response.assert_status(StatusCode::ACCEPTED);
        let body: Value = response.json();
        assert!(body["job_id"].is_string());
        assert_eq!(body["status"], "queued");
        assert_eq!(body["progress"], 0);
        assert!(body["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_company() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let response = server
            .post("/analyze")
            .json(&json!({
                "company_name": "   ",
                "industry": "Food Delivery",
                "strategic_question": "Should Zomato expand into Saudi Arabia?"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_submit_rejects_short_question() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let response = server
            .post("/analyze")
            .json(&json!({
                "company_name": "Zomato",
                "strategic_question": "Expand?"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_without_industry_is_accepted() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_happy_pipeline(&gateway).await;

        let response = server
            .post("/analyze")
            .json(&json!({
                "company_name": "Zomato",
                "strategic_question": "Should Zomato expand into Saudi Arabia?"
            }))
            .await;

        response.assert_status(StatusCode::ACCEPTED);
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn test_status_unknown_job_returns_404() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let fake_id = uuid::Uuid::new_v4();
        let response = server.get(&format!("/status/{}", fake_id)).await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_status_tracks_job_to_completion() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_happy_pipeline(&gateway).await;

        let job_id = submit_job(&server).await;
        let body = poll_until_terminal(&server, &job_id).await;

        assert_eq!(body["status"], "completed");
        assert_eq!(body["progress"], 100);
        assert!(body["error"].is_null());
        assert!(body["updated_at"].is_string());
    }

    #[tokio::test]
    async fn test_status_progress_never_decreases() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        let delay = Duration::from_millis(60);
        mock_stage_with_delay(&gateway, "Research the subject below", research_output(), delay)
            .await;
        mock_stage_with_delay(&gateway, "Size the market", analyst_output(), delay).await;
        mock_stage_with_delay(&gateway, "Assess the regulatory", regulatory_output(), delay).await;
        mock_stage_with_delay(&gateway, "Synthesize the findings", synthesis_output(), delay)
            .await;

        let job_id = submit_job(&server).await;

        let started = std::time::Instant::now();
        let mut observed = Vec::new();
        loop {
            let response = server.get(&format!("/status/{}", job_id)).await;
            let body: Value = response.json();
            observed.push(body["progress"].as_u64().expect("progress missing"));

            if matches!(body["status"].as_str(), Some("completed") | Some("failed")) {
                break;
            }
            assert!(started.elapsed() < POLL_DEADLINE, "job never finished");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(
            observed.windows(2).all(|pair| pair[0] <= pair[1]),
            "progress went backwards: {:?}",
            observed
        );
        assert_eq!(*observed.last().unwrap(), 100);
    }
}

mod results {
    use super::*;

    #[tokio::test]
    async fn test_results_unknown_job_returns_404() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let fake_id = uuid::Uuid::new_v4();
        let response = server.get(&format!("/results/{}", fake_id)).await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_results_conflict_while_running() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_stage_with_delay(
            &gateway,
            "Research the subject below",
            research_output(),
            Duration::from_secs(2),
        )
        .await;
        mock_stage(&gateway, "Size the market", analyst_output()).await;
        mock_stage(&gateway, "Assess the regulatory", regulatory_output()).await;
        mock_stage(&gateway, "Synthesize the findings", synthesis_output()).await;

        let job_id = submit_job(&server).await;

        let response = server.get(&format!("/results/{}", job_id)).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["error"], "not_ready");
    }

    #[tokio::test]
    async fn test_results_return_full_report() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_happy_pipeline(&gateway).await;

        let job_id = submit_job(&server).await;
        poll_until_terminal(&server, &job_id).await;

        let response = server.get(&format!("/results/{}", job_id)).await;
        response.assert_status_ok();
        let body: Value = response.json();

        assert_eq!(
            body["research"]["key_findings"][0],
            "Gulf delivery penetration is still low"
        );
        assert_eq!(body["analysis"]["market_size"]["currency"], "USD");
        assert_eq!(body["regulatory"]["overall_risk"], "medium");
        assert_eq!(body["synthesis"]["verdict"], "conditional");
        assert!(body["artifacts"]["json"].is_string());
    }

    #[tokio::test]
    async fn test_results_conflict_after_failure() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_stage(&gateway, "Research the subject below", research_output()).await;
        mock_stage(&gateway, "Size the market", analyst_output()).await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("Assess the regulatory"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&gateway)
            .await;

        let job_id = submit_job(&server).await;
        let body = poll_until_terminal(&server, &job_id).await;
        assert_eq!(body["status"], "failed");

        let response = server.get(&format!("/results/{}", job_id)).await;
        response.assert_status(StatusCode::CONFLICT);
    }
}

mod download {
    use super::*;
    use axum::http::header;

    #[tokio::test]
    async fn test_download_unknown_format_returns_400() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let fake_id = uuid::Uuid::new_v4();
        let response = server.get(&format!("/download/{}/docx", fake_id)).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_download_unknown_job_returns_404() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let fake_id = uuid::Uuid::new_v4();
        let response = server.get(&format!("/download/{}/json", fake_id)).await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_download_while_running_returns_404() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_stage_with_delay(
            &gateway,
            "Research the subject below",
            research_output(),
            Duration::from_secs(2),
        )
        .await;
        mock_stage(&gateway, "Size the market", analyst_output()).await;
        mock_stage(&gateway, "Assess the regulatory", regulatory_output()).await;
        mock_stage(&gateway, "Synthesize the findings", synthesis_output()).await;

        let job_id = submit_job(&server).await;

        let response = server.get(&format!("/download/{}/json", job_id)).await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_download_json_artifact() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_happy_pipeline(&gateway).await;

        let job_id = submit_job(&server).await;
        poll_until_terminal(&server, &job_id).await;

        let response = server.get(&format!("/download/{}/json", job_id)).await;
        response.assert_status_ok();

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert_eq!(content_type, "application/json");

        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("attachment"));
        assert!(disposition.contains(&format!("{}.json", job_id)));

        let body: Value = serde_json::from_slice(response.as_bytes()).expect("artifact not JSON");
        assert_eq!(body["synthesis"]["verdict"], "conditional");
    }

    #[tokio::test]
    async fn test_download_pdf_missing_without_renderer() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_happy_pipeline(&gateway).await;

        let job_id = submit_job(&server).await;
        poll_until_terminal(&server, &job_id).await;

        let response = server.get(&format!("/download/{}/pdf", job_id)).await;
        response.assert_status_not_found();
    }
}

mod clarify {
    use super::*;

    #[tokio::test]
    async fn test_clarify_returns_question() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("most useful clarifying question"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                "What is the budget ceiling for the first year?",
            )))
            .mount(&gateway)
            .await;

        let response = server.post("/clarify").json(&zomato_request()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body["question"],
            "What is the budget ceiling for the first year?"
        );
    }

    #[tokio::test]
    async fn test_clarify_validates_request() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let response = server
            .post("/clarify")
            .json(&json!({
                "company_name": "",
                "strategic_question": "Should Zomato expand into Saudi Arabia?"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clarify_falls_back_when_gateway_is_down() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let response = server.post("/clarify").json(&zomato_request()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        let question = body["question"].as_str().unwrap_or_default();
        assert!(question.ends_with('?'), "expected a question, got: {question}");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_analyses_empty() {
        let (server, _temp_dir, _gateway) = setup_test_server().await;

        let response = server.get("/analyses").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body.is_array());
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyses_list_recent_jobs() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_happy_pipeline(&gateway).await;

        submit_job(&server).await;
        server
            .post("/analyze")
            .json(&json!({
                "company_name": "Careem",
                "industry": "Ride Hailing",
                "strategic_question": "Should Careem launch grocery delivery in Egypt?"
            }))
            .await
            .assert_status(StatusCode::ACCEPTED);

        let response = server.get("/analyses").await;

        response.assert_status_ok();
        let body: Value = response.json();
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);

        let companies: Vec<&str> = rows
            .iter()
            .filter_map(|row| row["company_name"].as_str())
            .collect();
        assert!(companies.contains(&"Zomato"));
        assert!(companies.contains(&"Careem"));
        assert!(rows.iter().all(|row| row["status"].is_string()));
    }
}

mod full_run {
    use super::*;

    #[tokio::test]
    async fn test_zomato_run_reaches_completed_with_deliverables() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_happy_pipeline(&gateway).await;

        let job_id = submit_job(&server).await;

        let early = server.get(&format!("/status/{}", job_id)).await;
        early.assert_status_ok();
        let early_body: Value = early.json();
        assert!(matches!(
            early_body["status"].as_str(),
            Some("queued") | Some("processing") | Some("completed")
        ));

        let final_status = poll_until_terminal(&server, &job_id).await;
        assert_eq!(final_status["status"], "completed");
        assert_eq!(final_status["progress"], 100);

        let results = server.get(&format!("/results/{}", job_id)).await;
        results.assert_status_ok();
        let report: Value = results.json();
        assert_eq!(report["synthesis"]["verdict"], "conditional");
        assert_eq!(
            report["synthesis"]["key_recommendations"][0],
            "Start with Riyadh and Jeddah"
        );

        let download = server.get(&format!("/download/{}/json", job_id)).await;
        download.assert_status_ok();

        let listing = server.get("/analyses").await;
        let rows: Value = listing.json();
        assert!(rows
            .as_array()
            .unwrap()
            .iter()
            .any(|row| row["company_name"] == "Zomato" && row["status"] == "completed"));
    }

    #[tokio::test]
    async fn test_regulatory_rate_limit_fails_run() {
        let (server, _temp_dir, gateway) = setup_test_server().await;
        mock_stage(&gateway, "Research the subject below", research_output()).await;
        mock_stage(&gateway, "Size the market", analyst_output()).await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("Assess the regulatory"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&gateway)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("Synthesize the findings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                &synthesis_output().to_string(),
            )))
            .expect(0)
            .mount(&gateway)
            .await;

        let job_id = submit_job(&server).await;
        let body = poll_until_terminal(&server, &job_id).await;

        assert_eq!(body["status"], "failed");
        assert!(body["progress"].as_u64().unwrap() < 100);
        assert_eq!(body["error"]["stage"], "regulatory");
        let message = body["error"]["message"].as_str().unwrap_or_default();
        assert!(message.contains("429"), "unexpected message: {message}");
    }
}
