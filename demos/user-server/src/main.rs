use nestrs::config::ServerConfig;
use nestrs::prelude::*;
use user_server::UserModule;

#[tokio::main]
async fn main() -> nestrs::Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Starting user server...");

    let registry = Arc::new(ModuleRegistry::new());
    UserModule::register(&registry);
    registry.print_modules();

    let config = ServerConfig::from_env();
    let app = Application::new(registry);

    if let Err(err) = app.listen(config.address()).await {
        tracing::error!("❌ {err}");
        return Err(err);
    }

    tracing::info!("👋 Server stopped");
    Ok(())
}
