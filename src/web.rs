use portal::{Settings, app};

/// Main entry point for the portal web application
///
/// Initializes logging, reads settings from the environment and runs the
/// web server until shutdown.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = Settings::from_env();
    app::run(settings).await
}
