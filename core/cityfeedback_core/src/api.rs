use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{convert::Infallible, sync::Arc};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

use crate::dashboard::Dashboard;
use crate::error::ErrResponse;
use crate::export::XLSX_CONTENT_TYPE;
use crate::license::BroadcastNotifier;
use crate::settings::SettingsUpdate;

pub const LICENSE_EVENT: &str = "license-updated";

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub license_events: Arc<BroadcastNotifier>,
}

#[derive(Serialize)]
struct OkResponse<T: Serialize> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn ok<T: Serialize>(data: T) -> Response {
    Json(OkResponse {
        ok: true,
        data: Some(data),
    })
    .into_response()
}

fn invalid_json(err: serde_json::Error) -> Response {
    debug!("rejected request body: {err}");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrResponse {
            ok: false,
            error: "invalid_json",
            message: "Некорректный формат запроса".to_string(),
        }),
    )
        .into_response()
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_DISPOSITION]);

    let protected = Router::new()
        .route("/auth/logout", post(post_logout))
        .route("/auth/session", get(get_session))
        .route("/settings", get(get_settings).post(post_settings))
        .route("/schedule/next", get(get_schedule_next))
        .route("/license", get(get_license))
        .route("/license/activate", post(post_license_activate))
        .route("/license/events", get(get_license_events))
        .route("/statistics", get(get_statistics))
        .route("/reports/comments", get(get_report_comments))
        .route("/reports/export", get(get_report_export))
        .route("/reports/send", post(post_report_send))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(post_login))
        .merge(protected)
        .with_state(state)
        .layer(cors)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn require_session(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match state.dashboard.authorize(bearer_token(req.headers())) {
        Ok(_) => next.run(req).await,
        Err(err) => {
            warn!("{} {} rejected: {}", req.method(), req.uri().path(), err.code());
            err.into_response()
        }
    }
}

#[derive(Serialize)]
struct HealthInfo {
    service: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(OkResponse {
        ok: true,
        data: Some(HealthInfo {
            service: "cityfeedback_core",
            version: env!("CARGO_PKG_VERSION"),
        }),
    })
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn post_login(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let req: LoginRequest = match serde_json::from_value(payload) {
        Ok(v) => v,
        Err(err) => return invalid_json(err),
    };
    match state.dashboard.login(&req.username, &req.password).await {
        Ok(session) => ok(session),
        Err(err) => err.into_response(),
    }
}

async fn post_logout(State(state): State<AppState>) -> Response {
    match state.dashboard.logout().await {
        Ok(()) => Json(OkResponse::<()> {
            ok: true,
            data: None,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_session(State(state): State<AppState>) -> Response {
    ok(state.dashboard.session().await)
}

async fn get_settings(State(state): State<AppState>) -> Response {
    ok(state.dashboard.settings().await)
}

async fn post_settings(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let update: SettingsUpdate = match serde_json::from_value(payload) {
        Ok(v) => v,
        Err(err) => return invalid_json(err),
    };
    match state.dashboard.save_settings(&update).await {
        Ok(settings) => ok(settings),
        Err(err) => err.into_response(),
    }
}

async fn get_schedule_next(State(state): State<AppState>) -> Response {
    ok(state.dashboard.next_run().await)
}

async fn get_license(State(state): State<AppState>) -> Response {
    ok(state.dashboard.license().await)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivateRequest {
    #[serde(default, alias = "key")]
    license_key: String,
}

async fn post_license_activate(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let req: ActivateRequest = match serde_json::from_value(payload) {
        Ok(v) => v,
        Err(err) => return invalid_json(err),
    };
    match state.dashboard.activate_license(&req.license_key).await {
        Ok(info) => ok(info),
        Err(err) => err.into_response(),
    }
}

async fn get_license_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let updates = BroadcastStream::new(state.license_events.subscribe()).filter_map(|msg| {
        let info = match msg {
            Ok(info) => info,
            Err(err) => {
                warn!("license subscriber fell behind: {err}");
                return None;
            }
        };
        Event::default()
            .event(LICENSE_EVENT)
            .json_data(info)
            .ok()
            .map(Ok)
    });
    Sse::new(updates).keep_alive(KeepAlive::default())
}

/// Query and body shape shared by every period-based endpoint. Missing
/// fields are left empty so they fail period validation instead of the
/// extractor.
#[derive(Deserialize)]
struct PeriodRequest {
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
}

async fn get_statistics(State(state): State<AppState>, Query(q): Query<PeriodRequest>) -> Response {
    match state.dashboard.statistics(&q.from, &q.to).await {
        Ok(stats) => ok(stats),
        Err(err) => err.into_response(),
    }
}

async fn get_report_comments(
    State(state): State<AppState>,
    Query(q): Query<PeriodRequest>,
) -> Response {
    match state.dashboard.report_comments(&q.from, &q.to).await {
        Ok(rows) => ok(rows),
        Err(err) => err.into_response(),
    }
}

async fn get_report_export(
    State(state): State<AppState>,
    Query(q): Query<PeriodRequest>,
) -> Response {
    let file = match state.dashboard.export(&q.from, &q.to).await {
        Ok(file) => file,
        Err(err) => return err.into_response(),
    };
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
        .into_response()
}

async fn post_report_send(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let req: PeriodRequest = match serde_json::from_value(payload) {
        Ok(v) => v,
        Err(err) => return invalid_json(err),
    };
    match state.dashboard.send_report(&req.from, &req.to).await {
        Ok(receipt) => ok(receipt),
        Err(err) => err.into_response(),
    }
}
