use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::config::settings::{ModeUpdate, Settings, TuningUpdate};
use crate::config::Mode;
use crate::http::response::Rejection;
use crate::http::server::AppState;

/// `GET /get_info`: current settings and the last measurement.
pub async fn get_info(State(state): State<AppState>) -> Json<Settings> {
    Json(state.store.snapshot())
}

/// `POST /configure`: new thresholds and probe parameters, all or nothing.
pub async fn configure(
    State(state): State<AppState>,
    payload: Result<Json<TuningUpdate>, JsonRejection>,
) -> Result<(StatusCode, Json<Settings>), Rejection> {
    let Json(update) = payload?;
    let settings = state.store.apply_tuning(&update)?;
    Ok((StatusCode::CREATED, Json(settings)))
}

/// `POST /set_network_mode`: one of `main`, `auto`, `reserve`.
pub async fn set_network_mode(
    State(state): State<AppState>,
    payload: Result<Json<ModeUpdate>, JsonRejection>,
) -> Result<(StatusCode, Json<String>), Rejection> {
    let Json(update) = payload?;
    let mode: Mode = update.network_switch_mode.parse()?;

    state.store.set_mode(mode);
    Ok((StatusCode::ACCEPTED, Json(format!("network mode: {}", mode))))
}

pub async fn healthz() -> &'static str {
    "ok"
}
