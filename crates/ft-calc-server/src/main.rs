use ft_calc_server::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ft_calc_server=info,ft_calc_core=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;

    match &config.catalog_path {
        Some(path) => tracing::info!("Loaded {} models from {}", state.catalog.len(), path.display()),
        None => tracing::info!("Loaded {} bundled models", state.catalog.len()),
    }
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, token counts will be word-count estimates");
    }
    tracing::info!(mode = state.counter.mode(), "Token counter ready");

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("Listening on {}", config.addr());

    axum::serve(listener, app).await?;

    Ok(())
}
