//! Standalone collaborator service (spec §4.2b, out of scope for the
//! fan-out core proper): `GET /api/v1/lines/{sport}` returns a freshly
//! randomized score on every call, with no state kept between
//! requests. Lets the fan-out service be exercised end-to-end without
//! a real third-party odds API.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use rand::Rng;
use serde_json::json;
use tracing::{info, warn};

use kiddy_lines::domain::Sport;

/// The original service's `GenerateScore` draws from `RandFloat(0.5, 3)`.
const SCORE_RANGE: std::ops::Range<f32> = 0.5..3.0;

async fn get_lines(Path(sport): Path<String>) -> impl IntoResponse {
    let sport = match Sport::parse(&sport) {
        Ok(sport) => sport,
        Err(_) => {
            warn!(sport, "lines-provider: unsupported sport requested");
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "unsupported sport" })),
            )
                .into_response();
        }
    };

    let score: f32 = rand::thread_rng().gen_range(SCORE_RANGE);
    let body = json!({ "lines": { sport.as_upper_str(): format!("{:.4}", score) } });
    (StatusCode::OK, Json(body)).into_response()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lines_provider=info".parse()?),
        )
        .init();

    let bind = std::env::var("LINES_PROVIDER_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let app = Router::new().route("/api/v1/lines/:sport", get(get_lines));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(%bind, "lines-provider listening");
    axum::serve(listener, app).await?;
    Ok(())
}
