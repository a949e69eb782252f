use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fundstreak::demo;
use fundstreak::donation::handlers as donation_handlers;
use fundstreak::donation::repository::{InMemoryDonationRepository, PostgresDonationRepository};
use fundstreak::shared::AppState;
use fundstreak::stats::handlers as stats_handlers;
use fundstreak::stats::repository::{InMemoryStatsRepository, PostgresStatsRepository};
use fundstreak::user::handlers as user_handlers;
use fundstreak::user::repository::{InMemoryUserRepository, PostgresUserRepository};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fundstreak=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting donation tracking server");

    // Store selection happens once, here: Postgres when configured,
    // otherwise an in-memory store seeded with demo data.
    let app_state = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            info!("Using PostgreSQL store");
            AppState::new(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresDonationRepository::new(pool.clone())),
                Arc::new(PostgresStatsRepository::new(pool)),
            )
        }
        Err(_) => {
            info!("DATABASE_URL not set, using in-memory store with demo data");
            let state = AppState::new(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryDonationRepository::new()),
                Arc::new(InMemoryStatsRepository::new()),
            );
            demo::seed_demo_data(&state)
                .await
                .expect("Failed to seed demo data");
            state
        }
    };

    // build our application with the API routes
    let app = Router::new()
        .route("/api/user", post(user_handlers::create_user))
        .route("/api/user/:user_id", get(user_handlers::get_user))
        .route("/api/user/:user_id/goal", post(user_handlers::set_goal))
        .route("/api/donations/add", post(donation_handlers::add_donation))
        .route(
            "/api/donations/:user_id/history",
            get(donation_handlers::donation_history),
        )
        .route("/api/leaderboard", get(stats_handlers::get_leaderboard))
        .route("/api/stats", get(stats_handlers::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // run our app with hyper, listening globally on port 5000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
    info!("Server running on http://localhost:5000");
    axum::serve(listener, app).await.unwrap();
}
