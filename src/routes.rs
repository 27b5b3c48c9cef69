use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::arrivals::export::render_csv;
use crate::arrivals::flight::FlightPayload;
use crate::arrivals::manifest::ManifestPayload;
use crate::arrivals::ArrivalsError;
use crate::auth::{Caller, Roles, STAFF_EDIT};
use crate::error::AppError;
use crate::staffing::domain::{MovementRequest, ShiftBatch};
use crate::staffing::view::MovementView;
use crate::store::OpsStore;

/// Router exposing the ingest and query contracts over the shared store.
/// Authentication happens upstream; the gateway forwards the validated
/// role set and user identity as headers.
pub fn ops_router(store: Arc<OpsStore>) -> Router {
    Router::new()
        .route("/api/v1/flights", post(submit_flight_handler))
        .route("/api/v1/manifests", post(submit_manifest_handler))
        .route("/api/v1/staff/shifts", post(record_shifts_handler))
        .route(
            "/api/v1/staff/movements",
            post(apply_movement_handler).get(list_movements_handler),
        )
        .route(
            "/api/v1/staff/movements/:movement_id",
            delete(remove_movement_handler),
        )
        .route(
            "/export/arrivals/:millis/:terminal",
            get(arrivals_export_handler),
        )
        .route(
            "/api/v1/staffing/:port/:terminal/:date",
            get(staffing_view_handler),
        )
        .with_state(store)
}

fn caller_from(headers: &HeaderMap) -> Caller {
    let roles = headers
        .get("x-user-roles")
        .and_then(|value| value.to_str().ok())
        .map(Roles::from_header)
        .unwrap_or_default();
    let user = headers
        .get("x-user-email")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    Caller { roles, user }
}

fn forbidden() -> Response {
    let payload = json!({ "error": format!("this action requires the {STAFF_EDIT} permission") });
    (StatusCode::FORBIDDEN, Json(payload)).into_response()
}

async fn submit_flight_handler(
    State(store): State<Arc<OpsStore>>,
    Json(payload): Json<FlightPayload>,
) -> Result<Response, AppError> {
    let flight_code = store.submit_flight(payload)?;
    let payload = json!({ "flight_code": flight_code });
    Ok((StatusCode::ACCEPTED, Json(payload)).into_response())
}

async fn submit_manifest_handler(
    State(store): State<Arc<OpsStore>>,
    Json(payload): Json<ManifestPayload>,
) -> Result<Response, AppError> {
    let receipt = store.submit_manifest(payload)?;
    let payload = json!({
        "flight_code": receipt.flight_code,
        "passengers": receipt.passengers,
    });
    Ok((StatusCode::ACCEPTED, Json(payload)).into_response())
}

async fn record_shifts_handler(
    State(store): State<Arc<OpsStore>>,
    headers: HeaderMap,
    Json(batch): Json<ShiftBatch>,
) -> Result<Response, AppError> {
    if !caller_from(&headers).roles.can_edit_staffing() {
        return Ok(forbidden());
    }

    let recorded = store.record_shifts(batch);
    Ok(Json(json!({ "recorded": recorded })).into_response())
}

async fn apply_movement_handler(
    State(store): State<Arc<OpsStore>>,
    headers: HeaderMap,
    Json(request): Json<MovementRequest>,
) -> Result<Response, AppError> {
    let caller = caller_from(&headers);
    if !caller.roles.can_edit_staffing() {
        return Ok(forbidden());
    }

    let movement = store.apply_movement(request, caller.display_user())?;
    Ok((StatusCode::CREATED, Json(movement.to_view())).into_response())
}

async fn remove_movement_handler(
    State(store): State<Arc<OpsStore>>,
    headers: HeaderMap,
    Path(movement_id): Path<String>,
) -> Result<Response, AppError> {
    if !caller_from(&headers).roles.can_edit_staffing() {
        return Ok(forbidden());
    }

    store.remove_movement(&movement_id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Deserialize)]
struct MovementScope {
    port: String,
    terminal: String,
}

async fn list_movements_handler(
    State(store): State<Arc<OpsStore>>,
    Query(scope): Query<MovementScope>,
) -> Json<Vec<MovementView>> {
    let views = store
        .movements_for(&scope.port, &scope.terminal)
        .iter()
        .map(|movement| movement.to_view())
        .collect();
    Json(views)
}

#[derive(Debug, Deserialize)]
struct ExportWindow {
    #[serde(rename = "startHour", default)]
    start_hour: u32,
    #[serde(rename = "endHour", default = "full_day")]
    end_hour: u32,
}

fn full_day() -> u32 {
    24
}

async fn arrivals_export_handler(
    State(store): State<Arc<OpsStore>>,
    Path((millis, terminal)): Path<(i64, String)>,
    Query(window): Query<ExportWindow>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let caller = caller_from(&headers);
    let at = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| {
            AppError::Arrivals(ArrivalsError::BadTimestamp {
                field: "scheduled",
                value: millis.to_string(),
            })
        })?;

    let rows = store.arrivals_rows(at, &terminal, window.start_hour, window.end_hour);
    let body = render_csv(
        &rows,
        store.terminal_config(&terminal),
        caller.roles.can_view_api_splits(),
    )?;

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        body,
    )
        .into_response())
}

async fn staffing_view_handler(
    State(store): State<Arc<OpsStore>>,
    Path((port, terminal, date)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Arrivals(ArrivalsError::BadDate(date.clone())))?;

    Ok(Json(store.staffing_day(&port, &terminal, date)).into_response())
}
