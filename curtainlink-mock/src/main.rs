use curtainlink_mock::MockHub;
use curtainlink_mock::settings::Settings;

#[tokio::main]
async fn main() {
    let settings = Settings::new().expect("Failed to load settings.");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level}").into()
        }))
        .init();

    let address = settings.address().expect("Invalid hub address.");
    let identity = settings.identity().expect("Invalid hub identity.");

    let hub = MockHub::bind(address, identity)
        .await
        .expect("Failed to bind mock hub.");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }

    hub.shutdown();
}
