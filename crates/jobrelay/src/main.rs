use std::process::ExitCode;

use tracing::{error, info};

use jobrelay::config::load_config;
use jobrelay::{logging, Poller};

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.log_dir) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting jobrelay v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "MODE={}, SEARCH_DAYS={}, PROCESSED_IDS_FILE={}",
        config.mode,
        config.search_days,
        config.processed_ids_file.display()
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(Poller::from_config(config).run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("CRITICAL: {}. Exiting to prevent duplicate notifications.", e);
            ExitCode::FAILURE
        }
    }
}
