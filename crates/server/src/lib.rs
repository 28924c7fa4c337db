use api_types::page::PageView;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Money, Page};

use serde::Serialize;
pub use server::{Caller, ServerState, router, run, run_with_listener, spawn_with_listener};

mod assets;
mod categories;
mod server;
mod summary;
mod telegram;
mod transactions;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_) | EngineError::InvalidField(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Parse a decimal string from a request body.
fn parse_money(value: &str) -> Result<Money, ServerError> {
    Ok(value.parse::<Money>()?)
}

fn parse_optional_money(value: Option<&str>) -> Result<Option<Money>, ServerError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(parse_money)
        .transpose()
}

fn map_page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageView<U> {
    PageView {
        items: page.items.into_iter().map(f).collect(),
        page: page.page,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }
}
