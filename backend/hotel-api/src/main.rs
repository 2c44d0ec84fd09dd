use actix_web::HttpServer;
use hotel_api::store::build_token_store;
use hotel_api::telemetry::init_tracing;
use hotel_api::{build_app, AppState, Config};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file in development
    if cfg!(debug_assertions) {
        dotenvy::dotenv().ok();
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    tracing::info!("Starting hotel-api v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let token_store = build_token_store(&config.token_store)
        .await
        .map_err(|e| {
            tracing::error!("Token store initialization failed: {:#}", e);
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to initialize token store: {e:#}"),
            )
        })?;

    let state = AppState {
        token_store,
        revoked_token_message: config.revoked_token_message.clone(),
    };

    let bind_address = (config.app.host.clone(), config.app.port);
    tracing::info!("Starting HTTP server at {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || build_app(state.clone()))
        .bind(bind_address)?
        .run()
        .await
}
