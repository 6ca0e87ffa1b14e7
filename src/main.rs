use cardapio::settings::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::default();

    // `log` records from the library are bridged into this subscriber.
    let filter = if settings.debug { "debug" } else { "info,sqlx=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let router = cardapio::build_app(settings.clone()).await?;
    router.run(&settings).await
}
