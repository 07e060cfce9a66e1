//! devtask - command-line client for the Device API task service

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use devtask::display::{render_statistics, render_task_line, render_task_summary, ConsoleObserver};
use devtask::logs::{init_logging, LogLevel, LogOptions};
use devtask::models::{TaskPriority, TaskStatus};
use devtask::settings::Settings;
use devtask::tasks::{BulkOutcome, ListQuery, PriorityFilter, StatusFilter, TaskObserver, WaitOptions, WaitOutcome};
use devtask::utils::{account_label, format_secs, version_info};
use devtask::{ClientOptions, DeviceApiClient};

/// Device API task client
#[derive(Parser)]
#[command(name = "devtask", version, about)]
struct Cli {
    /// Base API URL
    #[arg(long, env = "DEVTASK_API_URL", global = true)]
    api_url: Option<String>,

    /// Access token
    #[arg(long, env = "DEVTASK_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct WaitArgs {
    /// Maximum wait in seconds
    #[arg(long = "wait-timeout")]
    wait_timeout: Option<u64>,

    /// Seconds between status checks
    #[arg(long)]
    interval: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task
    Create {
        /// Account credentials (email|password)
        account: String,

        /// Priority: normal, high, urgent (or 1-3)
        #[arg(long, default_value = "normal")]
        priority: TaskPriority,

        /// Wait for the task to finish
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        wait_args: WaitArgs,
    },

    /// Show one task
    Get { task_id: i64 },

    /// List tasks
    List {
        #[arg(long, default_value_t = 20)]
        limit: i64,

        #[arg(long, default_value_t = 0)]
        offset: i64,

        /// Status filter: pending, processing, completed, failed
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Priority filter: normal, high, urgent (or 1-3)
        #[arg(long)]
        priority: Option<TaskPriority>,
    },

    /// Cancel a pending task
    Cancel { task_id: i64 },

    /// Retry a failed task
    Retry { task_id: i64 },

    /// Show account statistics
    Stats,

    /// Wait for a task to finish
    Wait {
        task_id: i64,

        #[command(flatten)]
        wait_args: WaitArgs,
    },

    /// Cancel every pending task
    CancelPending,

    /// Retry every retryable failed task
    RetryFailed,

    /// Print build information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{version}"),
            Err(e) => eprintln!("{e}"),
        }
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .await
            .with_context(|| format!("unable to read settings file {}", path.display()))?,
        None => Settings::default(),
    };

    let log_options = LogOptions {
        log_level: cli.log_level.clone().unwrap_or(settings.log_level.clone()),
        log_dir: cli.log_dir.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let base_url = cli.api_url.clone().unwrap_or(settings.api.base_url.clone());
    let token = cli
        .token
        .clone()
        .or(settings.api.access_token.clone())
        .context("no access token: pass --token or set DEVTASK_TOKEN")?;
    let options = ClientOptions::new(base_url, token)
        .with_timeout(Duration::from_secs(cli.timeout.unwrap_or(settings.api.timeout_secs)));
    debug!("Using API at {}", options.base_url);
    let client = DeviceApiClient::connect(&options)?;

    let wait_options = |args: &WaitArgs| {
        let defaults = WaitOptions::from(&settings.wait);
        WaitOptions {
            timeout: args.wait_timeout.map(Duration::from_secs).unwrap_or(defaults.timeout),
            poll_interval: args.interval.map(Duration::from_secs).unwrap_or(defaults.poll_interval),
        }
    };
    let observer: &dyn TaskObserver = if cli.json { &devtask::tasks::NoopObserver } else { &ConsoleObserver };

    match cli.command {
        Commands::Create {
            account,
            priority,
            wait,
            wait_args,
        } => {
            if !cli.json {
                println!("Creating device task for: {}", account_label(&account));
            }
            let created = client.create_task(&account, priority).await?;
            if !wait {
                output(cli.json, &created, || format!("Task created! ID: #{}", created.task_id));
                return Ok(ExitCode::SUCCESS);
            }
            let options = wait_options(&wait_args);
            if !cli.json {
                println!(
                    "Task created! ID: #{}\nWaiting for completion (timeout: {}s, check every {}s)",
                    created.task_id,
                    format_secs(options.timeout),
                    format_secs(options.poll_interval)
                );
            }
            let outcome = client.await_completion(created.task_id, &options, observer).await;
            Ok(report_outcome(cli.json, &outcome))
        }
        Commands::Get { task_id } => {
            let task = client.get_task(task_id).await?;
            output(cli.json, &task, || render_task_summary(&task));
            Ok(ExitCode::SUCCESS)
        }
        Commands::List {
            limit,
            offset,
            status,
            priority,
        } => {
            let query = ListQuery {
                limit,
                offset,
                status: status.map_or(StatusFilter::All, StatusFilter::Only),
                priority: priority.map_or(PriorityFilter::All, PriorityFilter::Only),
            };
            let page = client.list_tasks(&query).await?;
            output(cli.json, &page, || {
                let mut lines: Vec<String> = page.tasks.iter().map(render_task_line).collect();
                lines.push(format!(
                    "{} of {} tasks (offset {})",
                    page.tasks.len(),
                    page.pagination.total,
                    query.clamped_offset()
                ));
                lines.join("\n")
            });
            Ok(ExitCode::SUCCESS)
        }
        Commands::Cancel { task_id } => {
            let confirmation = client.cancel_task(task_id).await?;
            output(cli.json, &confirmation, || {
                confirmation
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Cancelled task #{task_id}"))
            });
            Ok(ExitCode::SUCCESS)
        }
        Commands::Retry { task_id } => {
            let confirmation = client.retry_task(task_id).await?;
            output(cli.json, &confirmation, || {
                confirmation
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Retried task #{task_id}"))
            });
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stats => {
            let stats = client.get_statistics().await?;
            output(cli.json, &stats, || render_statistics(&stats));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Wait { task_id, wait_args } => {
            let outcome = client
                .await_completion(task_id, &wait_options(&wait_args), observer)
                .await;
            Ok(report_outcome(cli.json, &outcome))
        }
        Commands::CancelPending => {
            let outcomes = client.cancel_all_pending().await?;
            Ok(report_bulk(cli.json, "Cancelled", &outcomes))
        }
        Commands::RetryFailed => {
            let outcomes = client.retry_all_failed().await?;
            Ok(report_bulk(cli.json, "Retried", &outcomes))
        }
        Commands::Version => Ok(ExitCode::SUCCESS),
    }
}

fn output<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) {
    if json {
        match serde_json::to_string_pretty(value) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("Failed to render JSON: {e}"),
        }
    } else {
        println!("{}", text());
    }
}

fn report_outcome(json: bool, outcome: &WaitOutcome) -> ExitCode {
    if json {
        println!("{:#}", outcome.summary());
    } else if let Some(error) = outcome.error() {
        println!("Task failed or timed out: {error}");
    }
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn report_bulk(json: bool, verb: &str, outcomes: &[BulkOutcome]) -> ExitCode {
    if json {
        let rendered: Vec<_> = outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(confirmation) => serde_json::json!({"task_id": o.task_id, "success": true, "result": confirmation}),
                Err(e) => serde_json::json!({"task_id": o.task_id, "success": false, "error": e.message, "error_code": e.code()}),
            })
            .collect();
        println!("{:#}", serde_json::Value::from(rendered));
    } else {
        for o in outcomes {
            match &o.result {
                Ok(_) => println!("{verb} task #{}", o.task_id),
                Err(e) => println!("Failed on task #{}: {e}", o.task_id),
            }
        }
        println!("{} of {} succeeded", outcomes.iter().filter(|o| o.result.is_ok()).count(), outcomes.len());
    }
    if outcomes.iter().all(|o| o.result.is_ok()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
