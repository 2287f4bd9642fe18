mod accounts;
mod app;
mod articles;
mod config;
mod db;
mod error;
mod response;
mod state;
#[cfg(test)]
mod testing;

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` picks the levels; `LOG_FORMAT=json` switches to one JSON
/// object per line.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pressroom=debug,axum=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.with_target(false).json().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let app_state = state::AppState::init().await?;
    let addr = app_state.config.bind_addr()?;
    app::serve(app::build_app(app_state), addr).await
}
