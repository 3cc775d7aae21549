/// relayhook: action relay server
///
/// Main entry point. Loads `.env`, reads configuration from the environment
/// and starts the HTTP server. Any startup failure exits with status 1.

use relayhook::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides a single endpoint:
/// - GET /?action=<name>&apiKey=<secret>
#[tokio::main]
async fn main() {
    // Variables already present in the environment take precedence
    dotenvy::dotenv().ok();

    // Load configuration (defaults to 0.0.0.0:3112 and ./config.json)
    let config = Config::default();

    if let Err(e) = start_server(config).await {
        tracing::error!("❌ Startup failed: {:#}", e);
        std::process::exit(1);
    }
}
