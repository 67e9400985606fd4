//! Hybiscus CLI - render reports from JSON definitions.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hybiscus_client::{
    CancellationToken, ClientConfig, HybiscusClient, OperationError, OperationResult, ReportKind,
    TaskId, DEFAULT_BASE_URL,
};

/// Hybiscus CLI - submit report definitions and wait for the rendered file
#[derive(Parser)]
#[command(name = "hybiscus")]
#[command(about = "Render reports with the Hybiscus API", long_about = None)]
#[command(version)]
struct Cli {
    /// API key
    #[arg(long, env = "HYBISCUS_API_KEY", hide_env_values = true)]
    api_key: String,

    /// API root
    #[arg(long, env = "HYBISCUS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout and polling deadline in seconds
    #[arg(short, long, default_value = "60")]
    timeout: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the final PDF for a report definition
    Build {
        /// Path to the report definition JSON
        file: PathBuf,
    },

    /// Render a low-quality JPEG preview
    Preview {
        /// Path to the report definition JSON
        file: PathBuf,
    },

    /// Show the current status of a task
    Status {
        /// Task ID
        task_id: String,
    },

    /// Wait for a submitted task and print its download URL
    Wait {
        /// Task ID
        task_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<OperationError>() {
                Some(op) => print_operation_error(op),
                None => eprintln!("error: {}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = ClientConfig::new(cli.api_key)
        .with_base_url(cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout));
    let client = HybiscusClient::new(config)?;

    // Ctrl-C stops polling without leaving requests behind.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Build { file } => {
            render(&client, ReportKind::Build, file, &cancel, cli.json).await?;
        }
        Commands::Preview { file } => {
            render(&client, ReportKind::Preview, file, &cancel, cli.json).await?;
        }
        Commands::Status { task_id } => {
            let task_id = TaskId::new(task_id);
            let status = client.task_status(&task_id).await?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "task_id": task_id, "status": status })
                );
            } else {
                println!("{:<20} {}", "Task ID:", task_id);
                println!("{:<20} {}", "Status:", status);
            }
        }
        Commands::Wait { task_id } => {
            let task_id = TaskId::new(task_id);
            client.await_completion_with_cancel(&task_id, &cancel).await?;
            let result = OperationResult::success(task_id.clone(), client.report_url(&task_id));
            print_result(&result, cli.json)?;
        }
    }

    Ok(())
}

async fn render(
    client: &HybiscusClient,
    kind: ReportKind,
    file: PathBuf,
    cancel: &CancellationToken,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let raw = std::fs::read_to_string(&file)
        .map_err(|e| format!("cannot read {}: {}", file.display(), e))?;
    let definition: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| format!("{} is not valid JSON: {}", file.display(), e))?;
    debug!(file = %file.display(), kind = %kind, "Loaded report definition");

    let result = client
        .run_to_completion_with_cancel(kind, &definition, cancel)
        .await?;
    print_result(&result, json)
}

fn print_result(result: &OperationResult, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{:<20} {}", "Task ID:", result.task_id);
        println!("{:<20} {}", "Status:", result.status);
        println!("{:<20} {}", "URL:", result.url);
    }
    Ok(())
}

fn print_operation_error(err: &OperationError) {
    eprintln!("error ({}): {}", err.kind(), err);
    if let Some(task_id) = err.task_id() {
        eprintln!("  task: {}", task_id);
    }
    if let Some(status) = err.status() {
        eprintln!("  status: {}", status);
    }
}
