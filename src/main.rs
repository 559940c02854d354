mod chart;
mod controller;
mod filter;
mod gui;
mod pagination;
mod poller;
mod records;
mod store;
mod web;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::filter::{filter_records, TimeFilter};
use crate::poller::{fetch_records, SensorPoller};
use crate::store::RecordStore;
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "mq-sensor-dashboard")]
#[command(about = "Live dashboard for MQ gas and environmental sensor readings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the sensor backend and serve the dashboard
    Watch {
        /// URL of the backend MQ data endpoint
        #[arg(short, long, default_value = "http://localhost:5000/api/mq-data")]
        endpoint: String,

        /// Interval between fetches in seconds
        #[arg(short, long, default_value = "1")]
        interval: u64,

        /// Port for the web dashboard
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Path to store log files
        #[arg(short, long, default_value = "logs")]
        log_dir: PathBuf,

        /// Disable GUI window and use browser only
        #[arg(long, default_value = "false")]
        no_gui: bool,
    },
    /// Fetch the current record set once and export it to JSON
    Export {
        /// URL of the backend MQ data endpoint
        #[arg(short, long, default_value = "http://localhost:5000/api/mq-data")]
        endpoint: String,

        /// Output file path
        #[arg(short, long, default_value = "mq_export.json")]
        output: PathBuf,

        /// Time filter: 1hour, 24hours, 7days, or custom
        #[arg(short, long, default_value = "24hours")]
        filter: String,

        /// Custom range start (ISO 8601)
        #[arg(long)]
        start: Option<String>,

        /// Custom range end (ISO 8601)
        #[arg(long)]
        end: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            endpoint,
            interval,
            port,
            log_dir,
            no_gui,
        } => {
            // Set up logging
            std::fs::create_dir_all(&log_dir)?;
            let file_appender =
                RollingFileAppender::new(Rotation::HOURLY, &log_dir, "mq-dashboard.log");
            let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
                .with(fmt::layer().with_writer(std::io::stdout))
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();

            info!("Starting MQ Sensor Dashboard");
            info!("Backend endpoint: {}", endpoint);
            info!("Polling interval: {}s", interval);
            info!("Web dashboard: http://localhost:{}", port);

            let store = Arc::new(RecordStore::new());

            // Start web server in background
            let web_store = store.clone();
            let web_port = port;
            std::thread::spawn(move || {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async move {
                    if let Err(e) = start_web_server(web_store, web_port).await {
                        tracing::error!("Web server error: {}", e);
                    }
                });
            });

            // Start polling in background
            let poller = SensorPoller::new(store, endpoint, interval);
            std::thread::spawn(move || {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async move {
                    poller.start().await;
                });
            });

            // Launch GUI or wait for Ctrl+C
            if !no_gui {
                info!("Launching GUI window...");
                gui::launch_gui(port)?;
            } else {
                info!("Running in headless mode. Press Ctrl+C to stop");
                info!("Open http://localhost:{} in your browser", port);
                tokio::signal::ctrl_c().await?;
                info!("Shutting down...");
            }

            Ok(())
        }
        Commands::Export {
            endpoint,
            output,
            filter,
            start,
            end,
        } => {
            let time_filter = TimeFilter::parse(&filter, start.as_deref(), end.as_deref())?;

            let response = fetch_records(&endpoint).await?;
            let filtered = filter_records(&response.mq_data, &time_filter, chrono::Utc::now());

            let export = serde_json::json!({
                "exported_at": chrono::Utc::now().to_rfc3339(),
                "filter": time_filter,
                "count": filtered.len(),
                "mq_data": filtered,
            });
            std::fs::write(&output, serde_json::to_string_pretty(&export)?)?;
            println!(
                "Exported {} of {} records to {:?}",
                filtered.len(),
                response.mq_data.len(),
                output
            );
            Ok(())
        }
    }
}
