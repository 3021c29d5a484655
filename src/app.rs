use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/submit", post(handlers::submit_form))
        .route("/clear", post(handlers::clear_form))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route(
            "/api/observations",
            get(handlers::list_observations).post(handlers::submit),
        )
        .route("/api/clear", post(handlers::clear))
        .route("/export/data.csv", get(handlers::export_csv))
        .route("/export/chart/timeseries.html", get(handlers::export_timeseries))
        .route("/export/chart/histogram/:label", get(handlers::export_histogram))
        .with_state(state)
}
