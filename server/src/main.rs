mod broadcaster;
mod protocol;
mod server_config;
mod web_server;
mod ws_handler;

use std::path::PathBuf;

use clap::Parser;
use common::account::AccountDirectory;
use common::config::ConfigManager;
use common::logger::{self, DEFAULT_LOG_FILTER};
use common::scores::JsonFileScoreStore;
use server_config::{DEFAULT_CONFIG_FILE, ServerConfig};
use tracing::info;
use web_server::WebServerState;

#[derive(Parser)]
#[command(name = "snake_arcade_server")]
struct Args {
    /// YAML config file. Defaults are used when it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[arg(long)]
    use_log_prefix: bool,

    /// Used when RUST_LOG is not set.
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix, &args.log_filter);

    let config_manager: ConfigManager<_, ServerConfig> =
        ConfigManager::from_yaml_file(&args.config);
    let config = config_manager.get_config()?;
    info!("Loaded config from {}", args.config.display());

    let scores = JsonFileScoreStore::open(&config.scores_file, config.max_stored_scores).await?;
    info!("Scores are kept in {}", scores.path().display());
    let accounts = AccountDirectory::new();

    web_server::run_web_server(WebServerState::new(config, accounts, scores)).await?;

    Ok(())
}
