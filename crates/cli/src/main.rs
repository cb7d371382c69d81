use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use server::config::ServiceConfig;
use server::create_router;
use server::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONSILIUM_DIR: &str = ".consilium";
const DEFAULT_DB_NAME: &str = "consilium.db";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SERVICE_URL: &str = "http://localhost:8080";

const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(3);
const WATCH_BACKOFF_INTERVAL: Duration = Duration::from_secs(5);

const RETENTION_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
const JOB_RETENTION_HOURS: i64 = 24;

#[derive(Parser)]
#[command(name = "consilium")]
#[command(about = "Multi-agent strategic analysis service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a Consilium data directory in the current directory
    Init,
    /// Run the analysis service
    Serve {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[arg(long)]
        no_browser: bool,
    },
    /// Submit an analysis job to a running service
    Submit {
        /// Company the analysis concerns
        #[arg(long)]
        company: String,

        /// Industry the company operates in
        #[arg(long)]
        industry: Option<String>,

        /// The strategic question to analyze
        #[arg(long)]
        question: String,

        #[arg(long, default_value = DEFAULT_SERVICE_URL)]
        url: String,
    },
    /// Follow a job until it completes or fails
    Watch {
        job_id: String,

        #[arg(long, default_value = DEFAULT_SERVICE_URL)]
        url: String,
    },
    /// Check the service and list recent analyses
    Status {
        #[arg(long, default_value = DEFAULT_SERVICE_URL)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => init_project().await,
        Some(Commands::Serve { port, no_browser }) => serve(port, !no_browser).await,
        Some(Commands::Submit {
            company,
            industry,
            question,
            url,
        }) => submit(&company, industry.as_deref(), &question, &url).await,
        Some(Commands::Watch { job_id, url }) => watch(&job_id, &url).await,
        Some(Commands::Status { url }) => status(&url).await,
        None => serve(cli.port, true).await,
    }
}

async fn init_project() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let consilium_dir = cwd.join(CONSILIUM_DIR);

    if consilium_dir.exists() {
        println!("Already initialized at {}", consilium_dir.display());
        return Ok(());
    }

    println!("Initializing Consilium in {}", cwd.display());

    tokio::fs::create_dir_all(consilium_dir.join("artifacts")).await?;

    let config = ServiceConfig::default();
    config.write(&cwd).await?;

    let db_path = consilium_dir.join(DEFAULT_DB_NAME);
    let database_url = format!("sqlite:{}", db_path.display());
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    println!();
    println!("Initialized Consilium");
    println!();
    println!("Created:");
    println!("  {}/", CONSILIUM_DIR);
    println!("  ├── config.json");
    println!("  ├── {}", DEFAULT_DB_NAME);
    println!("  └── artifacts/");
    println!();
    println!("Next steps:");
    println!("  1. Run 'consilium serve' to start the service");
    println!("  2. Submit a job with 'consilium submit --company ... --question ...'");

    Ok(())
}

async fn serve(port: u16, open_browser: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let consilium_dir = cwd.join(CONSILIUM_DIR);

    let (config, db_path) = if consilium_dir.exists() {
        let config = ServiceConfig::read(&cwd).await;
        (config, consilium_dir.join(DEFAULT_DB_NAME))
    } else {
        println!("No {} directory found.", CONSILIUM_DIR);
        println!("Run 'consilium init' first, or continuing with defaults.");
        println!();
        (ServiceConfig::default(), cwd.join(DEFAULT_DB_NAME))
    };

    init_tracing();

    let database_url = format!("sqlite:{}", db_path.display());
    tracing::info!("Database: {}", db_path.display());
    tracing::info!("Gateway: {}", config.gateway_url);
    if let Some(renderer_url) = &config.renderer_url {
        tracing::info!("Renderer: {}", renderer_url);
    }

    let pool = db::create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(pool, &config);
    state.artifacts.ensure_directories().await?;
    start_retention_sweeper(state.repository.clone());

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    println!();
    println!("Consilium");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    if open_browser {
        let swagger_url = format!("http://localhost:{}/swagger-ui", port);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            if let Err(e) = open::that(&swagger_url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        });
    }

    axum::serve(listener, app).await?;

    Ok(())
}

fn start_retention_sweeper(repository: db::JobRepository) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(RETENTION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let cutoff = chrono::Utc::now() - chrono::Duration::hours(JOB_RETENTION_HOURS);
            match repository.delete_terminal_before(cutoff).await {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::info!("Retention sweep removed {} finished jobs", removed)
                }
                Err(e) => tracing::warn!("Retention sweep failed: {}", e),
            }
        }
    });
}

async fn submit(company: &str, industry: Option<&str>, question: &str, url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let base = url.trim_end_matches('/');

    let mut payload = serde_json::json!({
        "company_name": company,
        "strategic_question": question,
    });
    if let Some(industry) = industry {
        payload["industry"] = serde_json::Value::String(industry.to_string());
    }

    let response = client
        .post(format!("{}/analyze", base))
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("Service unreachable at {}", base))?;

    let http_status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Service returned a malformed response")?;

    if http_status != reqwest::StatusCode::ACCEPTED {
        anyhow::bail!(
            "Submission rejected ({}): {}",
            http_status,
            body["message"].as_str().unwrap_or("unknown error")
        );
    }

    let job_id = body["job_id"].as_str().unwrap_or_default();
    println!("Submitted analysis job {}", job_id);
    println!();
    println!("Follow it with:");
    println!("  consilium watch {}", job_id);

    Ok(())
}

async fn watch(job_id: &str, url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let base = url.trim_end_matches('/');
    let status_url = format!("{}/status/{}", base, job_id);

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    loop {
        let response = match client.get(&status_url).send().await {
            Ok(response) => response,
            Err(e) => {
                bar.set_message(format!("retrying: {}", e));
                tokio::time::sleep(WATCH_BACKOFF_INTERVAL).await;
                continue;
            }
        };

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            bar.finish_and_clear();
            anyhow::bail!("Job {} not found (unknown or expired)", job_id);
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                bar.set_message(format!("retrying: {}", e));
                tokio::time::sleep(WATCH_BACKOFF_INTERVAL).await;
                continue;
            }
        };

        let progress = body["progress"].as_u64().unwrap_or(0);
        let job_status = body["status"].as_str().unwrap_or("unknown").to_string();
        bar.set_position(progress);
        bar.set_message(job_status.clone());

        match job_status.as_str() {
            "completed" => {
                bar.finish_with_message("completed");
                println!();
                println!("Results:   {}/results/{}", base, job_id);
                println!("Downloads: {}/download/{}/{{pdf,pptx,json}}", base, job_id);
                return Ok(());
            }
            "failed" => {
                bar.finish_with_message("failed");
                let stage = body["error"]["stage"].as_str().unwrap_or("unknown");
                let message = body["error"]["message"].as_str().unwrap_or("no detail");
                anyhow::bail!("Job failed in the {} stage: {}", stage, message);
            }
            _ => {}
        }

        tokio::time::sleep(WATCH_POLL_INTERVAL).await;
    }
}

async fn status(url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let base = url.trim_end_matches('/');

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .with_context(|| format!("Service unreachable at {}", base))?
        .json()
        .await?;

    println!();
    println!("Service: {}", base);
    println!("Health:  {}", health["status"].as_str().unwrap_or("unknown"));
    println!("Version: {}", health["version"].as_str().unwrap_or("unknown"));
    println!();

    let analyses: serde_json::Value = client
        .get(format!("{}/analyses", base))
        .send()
        .await?
        .json()
        .await?;
    let rows = analyses.as_array().cloned().unwrap_or_default();

    if rows.is_empty() {
        println!("No analyses yet.");
    } else {
        println!("Recent analyses ({}):", rows.len());
        for row in &rows {
            let job_status = row["status"].as_str().unwrap_or("?");
            let status_icon = match job_status {
                "queued" => "○",
                "processing" => "◐",
                "completed" => "●",
                "failed" => "✗",
                _ => "?",
            };
            println!(
                "  {} [{}] {}: {}",
                status_icon,
                job_status,
                row["company_name"].as_str().unwrap_or("?"),
                row["strategic_question"].as_str().unwrap_or("?")
            );
        }
    }

    println!();

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "consilium=info,server=info,orchestrator=info,agents=info,tower_http=info".into()
            }),
        )
        .init();
}
