//! Highlight analysis worker binary.
//!
//! Reads analysis requests from the files given as arguments (or stdin when
//! there are none, or the only argument is `-`) and prints the reports as a
//! JSON array. `--schema` prints the request JSON schema instead.

use anyhow::{bail, Context};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spotlight_worker::{load_requests, parse_requests, AnalysisRequest, BatchRunner, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--schema") {
        let schema = schemars::schema_for!(AnalysisRequest);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let metrics_handle = if config.metrics_dump {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("failed to install Prometheus recorder")?,
        )
    } else {
        None
    };

    let requests = read_requests(&args).await?;
    let runner = BatchRunner::from_config(&config).context("failed to build highlight selector")?;
    info!(
        selector = runner.selector_name(),
        requests = requests.len(),
        "Starting spotlight-worker"
    );

    let total = requests.len();
    let mut reports = Vec::with_capacity(total);
    let mut failed = 0usize;
    for result in runner.run_batch(requests).await {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(error = %e, retryable = e.is_retryable(), "Analysis failed");
                failed += 1;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    if failed > 0 {
        bail!("{} of {} analyses failed", failed, total);
    }

    info!("Worker finished");
    Ok(())
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("spotlight=info".parse()?);

    // Logs go to stderr so stdout carries only the reports
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}

async fn read_requests(args: &[String]) -> anyhow::Result<Vec<AnalysisRequest>> {
    if args.is_empty() || (args.len() == 1 && args[0] == "-") {
        let mut data = String::new();
        tokio::io::stdin()
            .read_to_string(&mut data)
            .await
            .context("failed to read requests from stdin")?;
        return Ok(parse_requests(&data)?);
    }

    let mut requests = Vec::new();
    for path in args {
        let batch = load_requests(path).with_context(|| format!("failed to load {}", path))?;
        requests.extend(batch);
    }
    Ok(requests)
}
