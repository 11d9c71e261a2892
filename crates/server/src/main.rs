use server::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let database_url = std::env::var("TASKWEAVE_DATABASE_URL")
        .unwrap_or_else(|_| db::DEFAULT_DATABASE_URL.to_string());
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(pool);
    let app = server::create_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
    tracing::info!("Taskweave orchestrator listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
