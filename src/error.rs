use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Everything a handler can fail with. Each variant carries exactly the
/// context its JSON body exposes; anything else stays server-side.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required fields")]
    MissingFields(&'static [&'static str]),

    #[error("{0}")]
    Validation(String),

    #[error("search query required")]
    MissingQuery { example: &'static str },

    #[error("category not found")]
    UnknownCategory { hint: String },

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("recipe not found")]
    RecipeNotFound { id: Option<i64> },

    #[error("not the recipe owner")]
    NotOwner {
        action: &'static str,
        owner: i64,
        requester: i64,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingFields(required) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing required fields", "required": required }),
            ),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::MissingQuery { example } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Search query required", "example": example }),
            ),
            ApiError::UnknownCategory { hint } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Category not found", "hint": hint }),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::InvalidToken => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Invalid or expired token" }),
            ),
            ApiError::RecipeNotFound { id: Some(id) } => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Recipe not found", "id": id }),
            ),
            ApiError::RecipeNotFound { id: None } => {
                (StatusCode::NOT_FOUND, json!({ "error": "Recipe not found" }))
            }
            ApiError::NotOwner {
                action,
                owner,
                requester,
            } => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": format!("Forbidden: You can only {action} your own recipes"),
                    "recipe_owner": owner,
                    "your_user_id": requester,
                }),
            ),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
