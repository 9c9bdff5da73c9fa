use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    db::AppState,
    error::ApiError,
};

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    const REQUIRED: &[&str] = &["username", "email", "password"];

    let (Some(username), Some(email), Some(password)) = (
        present(payload.username),
        present(payload.email),
        present(payload.password),
    ) else {
        return Err(ApiError::MissingFields(REQUIRED));
    };

    if password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    // Username first, then email; each duplicate gets its own message.
    if User::username_exists(&state.db, &username).await? {
        warn!(%username, "signup username taken");
        return Err(ApiError::Validation("Username already taken".into()));
    }
    if User::email_exists(&state.db, &email).await? {
        warn!(%email, "signup email already registered");
        return Err(ApiError::Validation("Email already registered".into()));
    }

    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &username, &email, &hash).await?;

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.username)?;

    info!(user_id = user.id, %email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully",
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    const REQUIRED: &[&str] = &["email", "password"];

    let (Some(email), Some(password)) = (present(payload.email), present(payload.password)) else {
        return Err(ApiError::MissingFields(REQUIRED));
    };

    // Unknown email and wrong password answer identically.
    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        warn!(%email, "login unknown email");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    };

    if !verify_password(&password, &user.password_hash) {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.username)?;

    info!(user_id = user.id, %email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful",
        user: user.into(),
        token,
    }))
}
