use consign_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("LOG_FORMAT").as_deref() == Ok("pretty") {
        consign_observability::init_pretty();
    } else {
        consign_observability::init();
    }

    let config = ApiConfig::from_env();
    let app = consign_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
