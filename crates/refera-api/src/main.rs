use refera_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    refera_api::telemetry::init_telemetry(&config);

    let (_state, router) = refera_api::setup::initialize_app(config.clone()).await?;

    refera_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
