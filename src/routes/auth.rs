use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::auth::password;
use crate::db::documents::Filter;
use crate::db::models::{deliverable_email, normalize_email, validate, Record, User};
use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupPayload {
    #[garde(skip)]
    pub name: String,
    #[garde(email, custom(deliverable_email))]
    pub email: String,
    #[garde(skip)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub ok: bool,
    pub user_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/signup", post(signup))
}

/// POST /api/auth/signup — create a user unless the email is already taken
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupPayload>,
) -> AppResult<Json<SignupResponse>> {
    let SignupPayload {
        name,
        email,
        password: plaintext,
    } = payload.into_inner();
    let email = normalize_email(&email);

    // Best effort only: the store has no unique index on email.
    let existing = state
        .gateway
        .find_one(User::COLLECTION, &Filter::eq("email", email.as_str()))
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let cost = state.config.auth.bcrypt_cost;
    let password_hash =
        tokio::task::spawn_blocking(move || password::hash_password(&plaintext, cost))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = validate(User::new(name, email, password_hash)).map_err(AppError::Validation)?;
    let user_id = state.gateway.create_document(User::COLLECTION, &*user).await?;
    tracing::info!("User signed up: {}", user_id);

    Ok(Json(SignupResponse { ok: true, user_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{disconnected_test_state, test_state};

    fn payload(email: &str) -> ValidatedJson<SignupPayload> {
        let valid = validate(SignupPayload {
            name: "Ada".into(),
            email: email.into(),
            password: "hunter2".into(),
        })
        .unwrap();
        ValidatedJson(valid)
    }

    #[tokio::test]
    async fn test_signup_returns_user_id() {
        let state = test_state();
        let Json(response) = signup(State(state), payload("ada@example.com"))
            .await
            .unwrap();
        assert!(response.ok);
        assert!(!response.user_id.is_empty());
    }

    #[tokio::test]
    async fn test_signup_stores_hash_not_password() {
        let state = test_state();
        signup(State(state.clone()), payload("ada@example.com"))
            .await
            .unwrap();

        let user = state
            .gateway
            .find_one(User::COLLECTION, &Filter::eq("email", "ada@example.com"))
            .await
            .unwrap()
            .unwrap();
        let hash = user.get_str("password_hash").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(password::verify_password("hunter2", hash));
        assert!(user.body.get("password").is_none());
        assert_eq!(user.body.get("is_active"), Some(&serde_json::json!(true)));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let state = test_state();
        signup(State(state.clone()), payload("ada@example.com"))
            .await
            .unwrap();

        let second = signup(State(state), payload("ada@example.com")).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_domain_case_variant_conflicts() {
        let state = test_state();
        signup(State(state.clone()), payload("ada@example.com"))
            .await
            .unwrap();

        let second = signup(State(state), payload("ada@EXAMPLE.COM")).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_email_stored_with_lowercased_domain() {
        let state = test_state();
        signup(State(state.clone()), payload("Ada@Example.COM"))
            .await
            .unwrap();

        let user = state
            .gateway
            .find_one(User::COLLECTION, &Filter::eq("email", "Ada@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.get_str("email"), Some("Ada@example.com"));
    }

    #[test]
    fn test_undotted_signup_email_is_rejected() {
        let result = validate(SignupPayload {
            name: "Ada".into(),
            email: "ada@localhost".into(),
            password: "hunter2".into(),
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_signup_without_database_fails() {
        let state = disconnected_test_state();

        let result = signup(State(state), payload("ada@example.com")).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
