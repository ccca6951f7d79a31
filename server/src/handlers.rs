//! Route handlers: validate the body, make one remote call, render JSON.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tablebridge_core::types::optional_id_from_string_or_number;
use tablebridge_core::{DataRecord, User};
use tracing::info;

use crate::app::AppState;
use crate::error::AppError;

pub const LOGIN_OK: &str = "Login successful";

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewRecordBody {
    pub content: Option<String>,
    #[serde(default, deserialize_with = "optional_id_from_string_or_number")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBody {
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginBody {
    pub message: String,
    pub user: User,
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Json(body) = payload.map_err(bad_json)?;
    let (login, password) = credentials(body)?;

    let message = state
        .remote
        .register_user(&login, &password)
        .await
        .map_err(AppError::upstream(StatusCode::BAD_REQUEST))?;
    info!(login = %login, "user registered");
    Ok(Json(MessageBody { message }))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginBody>, AppError> {
    let Json(body) = payload.map_err(bad_json)?;
    let (login, password) = credentials(body)?;
    info!(login = %login, "login attempt");

    let user = state
        .remote
        .login_user(&login, &password)
        .await
        .map_err(AppError::upstream(StatusCode::INTERNAL_SERVER_ERROR))?
        .ok_or(AppError::InvalidCredentials)?;

    Ok(Json(LoginBody {
        message: LOGIN_OK.to_string(),
        user,
    }))
}

/// `GET /data`
pub async fn list_data(State(state): State<AppState>) -> Result<Json<Vec<DataRecord>>, AppError> {
    let records = state
        .remote
        .get_all_data()
        .await
        .map_err(AppError::upstream(StatusCode::INTERNAL_SERVER_ERROR))?;
    Ok(Json(records))
}

/// `POST /data`
pub async fn add_data(
    State(state): State<AppState>,
    payload: Result<Json<NewRecordBody>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Json(body) = payload.map_err(bad_json)?;
    let content = required(body.content, "Content")?;

    let message = state
        .remote
        .add_data(&content, body.user_id.as_deref())
        .await
        .map_err(AppError::upstream(StatusCode::BAD_REQUEST))?;
    Ok(Json(MessageBody { message }))
}

/// `PUT /data/{id}`
pub async fn update_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ContentBody>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Json(body) = payload.map_err(bad_json)?;
    let content = required(body.content, "Content")?;

    let message = state
        .remote
        .update_data(&id, &content)
        .await
        .map_err(AppError::upstream(StatusCode::BAD_REQUEST))?;
    Ok(Json(MessageBody { message }))
}

/// `DELETE /data/{id}`
pub async fn delete_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    let message = state
        .remote
        .delete_data(&id)
        .await
        .map_err(AppError::upstream(StatusCode::BAD_REQUEST))?;
    Ok(Json(MessageBody { message }))
}

fn credentials(body: Credentials) -> Result<(String, String), AppError> {
    let login = required(body.login, "Username")?;
    let password = required(body.password, "Password")?;
    Ok((login, password))
}

/// Present and not blank after trimming. The value itself is kept as sent.
fn required(value: Option<String>, label: &str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Validation(format!("{label} is required"))),
    }
}

fn bad_json(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}
