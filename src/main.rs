use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use evagent::backend::HttpBackend;
use evagent::core::config::{CliOverrides, EvagentConfig, load_config, resolve};
use evagent::core::wizard::FailurePolicy;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "evagent", about = "Event outreach assistant backed by an Azure AI agent")]
struct Args {
    /// Base URL of the agent backend
    #[arg(long)]
    backend_url: Option<String>,

    /// Azure AI project connection string to pre-fill the setup form
    #[arg(long)]
    connection_string: Option<String>,

    /// What happens to a wizard button after its request fails
    #[arg(long, value_enum)]
    failure_policy: Option<FailurePolicy>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Initialize file logger - writes to evagent.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("evagent.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = load_config().unwrap_or_else(|e| {
        log::error!("{}, falling back to defaults", e);
        EvagentConfig::default()
    });
    let cli = CliOverrides {
        backend_url: args.backend_url,
        connection_string: args.connection_string,
        failure_policy: args.failure_policy,
    };
    let config = resolve(&file_config, &cli);

    log::info!(
        "Evagent starting up against {} (failure policy: {:?})",
        config.backend_url,
        config.failure_policy
    );

    let backend = HttpBackend::new(
        &config.backend_url,
        config.chat_path.as_deref(),
        config.request_timeout,
    )
    .map_err(std::io::Error::other)?;

    evagent::tui::run(config, Arc::new(backend))
}
