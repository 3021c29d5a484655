use crate::config::AppConfig;
use crate::errors::AppError;
use crate::export::{histogram_document, timeseries_document, to_csv};
use crate::models::{DashboardView, ListQuery, Observation};
use crate::session::SESSION_COOKIE;
use crate::state::AppState;
use crate::stats::build_dashboard;
use crate::store::{sort_by_timestamp, SessionStore};
use crate::ui::render_index;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Path, Query, State,
    },
    http::header,
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// Submitted field values; `None` marks a field that is present but not a number.
type Fields = HashMap<String, Option<f64>>;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.config))
}

pub async fn get_dashboard(State(state): State<AppState>, jar: CookieJar) -> Json<DashboardView> {
    let empty = SessionStore::new();
    let mut sessions = state.sessions.lock().await;
    let store = sessions
        .existing(session_id(&jar), Instant::now())
        .map(|store| &*store)
        .unwrap_or(&empty);
    Json(build_dashboard(store, &state.config))
}

pub async fn list_observations(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Observation>>, AppError> {
    let descending = match query.order.as_deref().map(str::trim) {
        None | Some("desc") => true,
        Some("asc") => false,
        Some(_) => return Err(AppError::bad_request("order must be 'asc' or 'desc'")),
    };
    let labels: Option<Vec<&str>> = query.kind.as_deref().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .collect()
    });

    let empty = SessionStore::new();
    let mut sessions = state.sessions.lock().await;
    let store = sessions
        .existing(session_id(&jar), Instant::now())
        .map(|store| &*store)
        .unwrap_or(&empty);

    let view = match labels {
        Some(labels) => {
            let mut subset = store.filter_by_types(&labels);
            sort_by_timestamp(&mut subset, descending);
            subset
        }
        None => store.sorted_view(descending),
    };
    Ok(Json(view.into_iter().cloned().collect()))
}

pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<HashMap<String, Value>>, JsonRejection>,
) -> Result<(CookieJar, Json<DashboardView>), AppError> {
    let Json(raw) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let fields: Fields = raw
        .into_iter()
        .map(|(key, value)| (key, value.as_f64()))
        .collect();

    let (id, view) = apply_submit(&state, session_id(&jar), &fields).await?;
    Ok((with_session(jar, id), Json(view)))
}

pub async fn submit_form(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<(CookieJar, Redirect), AppError> {
    let Form(raw) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let fields: Fields = raw
        .into_iter()
        .map(|(key, value)| {
            let parsed = value.trim().parse::<f64>().ok();
            (key, parsed)
        })
        .collect();

    let (id, _) = apply_submit(&state, session_id(&jar), &fields).await?;
    Ok((with_session(jar, id), Redirect::to("/")))
}

pub async fn clear(State(state): State<AppState>, jar: CookieJar) -> Json<DashboardView> {
    Json(apply_clear(&state, session_id(&jar)).await)
}

pub async fn clear_form(State(state): State<AppState>, jar: CookieJar) -> Redirect {
    apply_clear(&state, session_id(&jar)).await;
    Redirect::to("/")
}

pub async fn export_csv(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    ensure_exports(&state.config)?;

    let empty = SessionStore::new();
    let mut sessions = state.sessions.lock().await;
    let store = sessions
        .existing(session_id(&jar), Instant::now())
        .map(|store| &*store)
        .unwrap_or(&empty);
    let body = to_csv(store).map_err(|err| {
        error!("failed to write csv export: {err}");
        AppError::from(err)
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"readings.csv\""),
        ],
        body,
    ))
}

pub async fn export_timeseries(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, AppError> {
    ensure_exports(&state.config)?;

    let view = current_dashboard(&state, &jar).await;
    if view.time_series.is_empty() {
        return Err(AppError::not_found("no data"));
    }

    Ok(Html(timeseries_document("Readings over time", &view.time_series)))
}

pub async fn export_histogram(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(label): Path<String>,
) -> Result<Html<String>, AppError> {
    ensure_exports(&state.config)?;

    let label = label.trim_end_matches(".html");
    if !state.config.labels().iter().any(|known| *known == label) {
        return Err(AppError::not_found(format!("unknown series '{label}'")));
    }

    let view = current_dashboard(&state, &jar).await;
    let histogram = view
        .histograms
        .iter()
        .find(|h| h.label.as_deref() == Some(label))
        .ok_or_else(|| AppError::not_found("no data"))?;

    Ok(Html(histogram_document(histogram)))
}

/// Derived views for the caller's session, or for an empty store when the
/// caller has none yet. Never creates a session.
async fn current_dashboard(state: &AppState, jar: &CookieJar) -> DashboardView {
    let empty = SessionStore::new();
    let mut sessions = state.sessions.lock().await;
    let store = sessions
        .existing(session_id(jar), Instant::now())
        .map(|store| &*store)
        .unwrap_or(&empty);
    build_dashboard(store, &state.config)
}

async fn apply_submit(
    state: &AppState,
    session: Option<Uuid>,
    fields: &Fields,
) -> Result<(Uuid, DashboardView), AppError> {
    let batch = build_batch(&state.config, fields, Local::now().naive_local())?;

    let mut sessions = state.sessions.lock().await;
    let (id, store) = sessions.session(session, Instant::now());
    let added = batch.len();
    store.append(batch);
    info!(session = %id, added, total = store.count(), "recorded observations");

    Ok((id, build_dashboard(store, &state.config)))
}

async fn apply_clear(state: &AppState, session: Option<Uuid>) -> DashboardView {
    let mut sessions = state.sessions.lock().await;
    match sessions.existing(session, Instant::now()) {
        Some(store) => {
            store.clear();
            if let Some(id) = session {
                info!(session = %id, "cleared observations");
            }
            build_dashboard(store, &state.config)
        }
        None => build_dashboard(&SessionStore::new(), &state.config),
    }
}

/// One observation per configured series, all stamped with the same time.
fn build_batch(
    config: &AppConfig,
    fields: &Fields,
    timestamp: NaiveDateTime,
) -> Result<Vec<Observation>, AppError> {
    config
        .series()
        .iter()
        .map(|spec| {
            let value = fields
                .get(spec.field)
                .copied()
                .ok_or_else(|| AppError::bad_request(format!("missing field '{}'", spec.field)))?
                .filter(|value| value.is_finite())
                .ok_or_else(|| AppError::bad_request(format!("{} must be a number", spec.field)))?;
            if value < 0.0 {
                return Err(AppError::bad_request(format!("{} must be >= 0", spec.field)));
            }
            Ok(Observation::new(timestamp, spec.label, value))
        })
        .collect()
}

fn ensure_exports(config: &AppConfig) -> Result<(), AppError> {
    if config.variant.exports_enabled() {
        Ok(())
    } else {
        Err(AppError::not_found("exports are not enabled"))
    }
}

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn with_session(jar: CookieJar, id: Uuid) -> CookieJar {
    jar.add(session_cookie(id))
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
