mod sum_task;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flowline_core::{EngineConfig, JsonMap, RunStatus, TaskHandler, Workflow};
use flowline_driver::{ExecuteOptions, ExecutionDriver};

use sum_task::SumTask;

#[derive(Parser)]
#[command(name = "flowline", version, about = "Workflow graph compiler and execution driver")]
struct Cli {
    /// Engine API base URL
    #[arg(short, long, default_value = "http://localhost:8080/api")]
    engine: String,

    /// Path to a TOML engine config (overrides --engine)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the demo workflow and print its definition
    Compile,
    /// Register and run the demo workflow with in-process workers
    Run {
        /// Workflow-level input `x`
        #[arg(short, default_value_t = 5.0)]
        x: f64,
    },
    /// Remove the demo task definition from the engine registry
    Cleanup,
}

/// Two chained sum tasks: `x` feeds `sum1.i0`, `sum1.sum` feeds `sum2.i0`.
fn demo_workflow() -> anyhow::Result<Workflow> {
    let handler = SumTask::new(2);
    let descriptor = handler.descriptor().clone();

    let mut wf = Workflow::new("flowline-demo", "Two chained sum tasks");
    wf.add_task("sum1", descriptor.clone())?;
    wf.add_task("sum2", descriptor)?;
    wf.add_input("x", 5.0);
    wf.connect("sum1.i0", "x");
    wf.connect("sum2.i0", "sum1.sum");
    wf.add_output("total", "sum2.sum");
    Ok(wf)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowline=info,warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::new(&cli.engine),
    };

    match cli.command {
        Commands::Compile => {
            let definition = demo_workflow()?.compile()?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        Commands::Run { x } => {
            let workflow = demo_workflow()?;
            let handlers: Vec<Arc<dyn TaskHandler>> = vec![Arc::new(SumTask::new(2))];

            let mut inputs = JsonMap::new();
            inputs.insert("x".to_string(), x.into());

            let cancel = CancellationToken::new();
            let ctrl_c_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping");
                    ctrl_c_cancel.cancel();
                }
            });

            let driver = ExecutionDriver::new(config)?;
            let opts = ExecuteOptions {
                start_workers: true,
                wait: true,
                cancel,
            };
            let handle = driver.execute(&workflow, &handlers, inputs, opts).await?;

            info!(run_id = %handle.id, status = %handle.status, "Run finished");
            if handle.status == RunStatus::Completed {
                println!("{}", serde_json::to_string_pretty(&handle.output)?);
            } else {
                anyhow::bail!("run {} ended with status {}", handle.id, handle.status);
            }
        }
        Commands::Cleanup => {
            let metadata = flowline_client::MetadataClient::new(&config)?;
            let registered = metadata.list_task_defs().await?;
            if registered.iter().any(|d| d.name == "sum") {
                metadata.unregister_task_def("sum").await?;
                info!("Removed task definition 'sum'");
            } else {
                info!("Task definition 'sum' not registered");
            }
        }
    }

    Ok(())
}
