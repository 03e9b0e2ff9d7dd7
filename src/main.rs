use anyhow::Context;
use codegen_chat::{
    config::{get_config, initialize_config},
    logging::init_logging,
    ui::run_ui,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    initialize_config().context("Failed to load configuration")?;
    let config = get_config();
    let _logger = init_logging(&config).context("Failed to start logging")?;

    log::info!("Starting codegen-chat against {}", config.server_url);
    let result = run_ui().await;
    if let Err(e) = &result {
        log::error!("UI exited with error: {:#}", e);
    }
    result
}
