use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ValidationError;
use crate::index::LoadOutcome;
use crate::query::engine::QueryEngine;
use crate::query::params::{parse_video_query, PageLimits};

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<ValidationError>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub video_count: usize,
    pub tag_count: usize,
    pub snapshot: Option<String>,
    pub last_load: LoadOutcome,
}

#[derive(Clone)]
struct AppState {
    engine: Arc<QueryEngine>,
    limits: PageLimits,
}

pub struct QueryServer {
    pub engine: Arc<QueryEngine>,
    pub limits: PageLimits,
}

impl QueryServer {
    pub fn new(engine: Arc<QueryEngine>, limits: PageLimits) -> Self {
        Self { engine, limits }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(welcome_handler))
            .route("/videos", get(videos_handler))
            .route("/tags", get(tags_handler))
            .route("/status", get(status_handler))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(AppState {
                engine: self.engine.clone(),
                limits: self.limits,
            })
    }

    pub async fn run<F>(self, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        tracing::info!("HTTP Query Server listening on {}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("HTTP Query Server stopped");
        Ok(())
    }
}

async fn welcome_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the video catalog API",
    })
}

async fn videos_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    match parse_video_query(&pairs, &state.limits) {
        Ok(spec) => Json(state.engine.query(&spec)).into_response(),
        Err(errors) => {
            tracing::debug!("Rejected /videos query: {} invalid parameter(s)", errors.len());
            (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse { errors }),
            )
                .into_response()
        }
    }
}

async fn tags_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.engine.tags())
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let catalog = state.engine.catalog();
    let index = catalog.current();
    Json(StatusResponse {
        video_count: index.len(),
        tag_count: index.tags().len(),
        snapshot: catalog
            .snapshot_path()
            .map(|p| p.to_string_lossy().into_owned()),
        last_load: catalog.last_load(),
    })
}
