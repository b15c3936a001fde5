use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::LazyLock;

use crate::auth::{Auth, AuthError};
use crate::entity::user;
use crate::lifecycle::Role;

use super::{
    ApiError, AppState,
    dto::{CreatedId, Envelope, LoginBody, LoginData, SignupBody, UserResponse},
    jwt::{AuthClaims, Claims, encode_jwt},
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Signup password policy: length, mixed case, one special character.
fn password_errors(password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();
    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)) {
        errors.push("Password must contain at least one special character");
    }
    errors
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<Envelope<CreatedId>>), ApiError> {
    let (Some(name), Some(email), Some(password), Some(re_enter)) = (
        body.name.filter(|s| !s.is_empty()),
        body.email.filter(|s| !s.is_empty()),
        body.password.filter(|s| !s.is_empty()),
        body.re_enter_password.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::validation("All fields are required"));
    };

    let role = match body.role.as_deref() {
        None => Role::User,
        Some(r) => Role::parse(r).ok_or_else(|| {
            ApiError::validation("Invalid role. Must be: admin, manager, technician, or user")
        })?,
    };

    if !EMAIL_RE.is_match(&email) {
        return Err(ApiError::validation("Invalid email format"));
    }

    if password != re_enter {
        return Err(ApiError::validation("Passwords do not match"));
    }

    let errors = password_errors(&password);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors.join(". ")));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?;
    if existing.is_some() {
        return Err(ApiError::conflict("Account already exists with this email"));
    }

    let password_hash = Auth::hash_password(&password).map_err(ApiError::internal)?;

    let model = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_owned()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message_with_data(
            "User created successfully",
            CreatedId { id: model.id },
        )),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Envelope<LoginData>>, ApiError> {
    let (Some(email), Some(password)) = (
        body.email.filter(|s| !s.is_empty()),
        body.password.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    let found = state
        .auth
        .authenticate(&email, &password)
        .await
        .map_err(|e| match e {
            AuthError::NotFound | AuthError::InvalidPassword => {
                ApiError::unauthorized("Invalid email or password")
            }
            other => ApiError::internal(other),
        })?;

    let exp = (Utc::now().timestamp() as u64) + state.jwt_expiry_hours * 3600;
    let claims = Claims {
        sub: found.id,
        email: found.email.clone(),
        role: found.role.clone(),
        exp,
    };
    let token = encode_jwt(&claims, &state.jwt_secret).map_err(ApiError::internal)?;

    Ok(Json(Envelope::message_with_data(
        "Login successful",
        LoginData {
            token,
            user: UserResponse::from(found),
        },
    )))
}

pub async fn me(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    let found = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(Envelope::data(UserResponse::from(found))))
}
