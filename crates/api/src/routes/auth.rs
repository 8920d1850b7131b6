//! Account routes: registration, e-mail confirmation, login and token refresh.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::ApiResult,
    extract::{ApiJson, ApiQuery},
};
use bookcrossing_core::user::{RegistrationInput, User, UserService};
use bookcrossing_db::UserRepository;
use bookcrossing_shared::{AppError, JwtError, TokenKind, TokenPair};

/// Creates the account router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/registration", post(register))
        .route("/registration/confirmation", get(confirm))
        .route("/auth", post(login))
        .route("/auth/refresh", post(refresh))
}

fn service(state: &AppState) -> UserService<UserRepository> {
    UserService::new(Arc::new(UserRepository::new((*state.db).clone())))
}

fn token_error(err: JwtError) -> AppError {
    match err {
        JwtError::EncodingError(msg) => AppError::Internal(msg),
        JwtError::Expired => AppError::Unauthorized("token_expired".to_string()),
        JwtError::DecodingError(_) | JwtError::WrongKind => {
            AppError::Unauthorized("invalid_token".to_string())
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationRequest {
    pub name: String,
    pub login: String,
    pub password: String,
    pub password_confirm: String,
    pub email: String,
    pub city: Option<String>,
}

impl From<RegistrationRequest> for RegistrationInput {
    fn from(req: RegistrationRequest) -> Self {
        Self {
            name: req.name,
            login: req.login,
            password: req.password,
            password_confirm: req.password_confirm,
            email: req.email,
            city: req.city,
        }
    }
}

/// Login credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Refresh token exchange.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Confirmation link parameters.
#[derive(Debug, Deserialize)]
pub struct ConfirmationQuery {
    pub token: String,
}

/// User as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i32,
    pub login: String,
    pub name: String,
    pub email: String,
    pub city: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            login: user.login,
            name: user.name,
            email: user.email,
            city: user.city,
            enabled: user.enabled,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /registration - Register a disabled user and mail the confirmation link.
async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegistrationRequest>,
) -> ApiResult<impl IntoResponse> {
    let registered = service(&state).register(payload.into()).await?;
    let user = registered.user;

    // Delivery failures are logged; the user can still be confirmed manually.
    if let Err(e) = state
        .email_service
        .send_confirmation_email(&user.email, &user.name, &registered.confirmation_token)
        .await
    {
        error!(user_id = user.id, error = %e, "Failed to send confirmation email");
    }

    info!(user_id = user.id, login = %user.login, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /registration/confirmation?token= - Enable the user behind a confirmation link.
async fn confirm(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ConfirmationQuery>,
) -> ApiResult<Json<UserResponse>> {
    let user = service(&state).confirm(&query.token).await?;

    info!(user_id = user.id, "E-mail confirmed");

    Ok(Json(user.into()))
}

/// POST /auth - Authenticate and return a token pair.
async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let user = match service(&state)
        .authenticate(&payload.login, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            info!(login = %payload.login, error = %e, "Failed login attempt");
            return Err(e.into());
        }
    };

    let pair = state
        .jwt_service
        .generate_pair(user.id, &user.login)
        .map_err(token_error)?;

    info!(user_id = user.id, "User logged in");

    Ok(Json(pair))
}

/// POST /auth/refresh - Exchange a refresh token for fresh tokens.
async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "Refresh token rejected");
            token_error(e)
        })?;

    let user = service(&state).find_enabled(&claims.login).await?;

    let pair = state
        .jwt_service
        .generate_pair(user.id, &user.login)
        .map_err(token_error)?;

    Ok(Json(pair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use bookcrossing_db::EmailVerificationRepository;
    use serde_json::{Value, json};

    use crate::test_support::{PASSWORD, create_user, send, test_state};

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn registration(login: &str, email: &str) -> Value {
        json!({
            "name": "Alex",
            "login": login,
            "password": PASSWORD,
            "passwordConfirm": PASSWORD,
            "email": email,
            "city": "Москва"
        })
    }

    fn credentials(login: &str, password: &str) -> Value {
        json!({ "login": login, "password": password })
    }

    #[tokio::test]
    async fn test_register_confirm_and_login() {
        let state = test_state().await;

        let (status, body) = send(
            &state,
            post("/registration", &registration("alex", "al@yandex.ru")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["login"], "alex");
        assert_eq!(body["enabled"], false);
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());

        let (status, body) = send(&state, post("/auth", &credentials("alex", PASSWORD))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Учетная запись не подтверждена");

        // The raw token only travels by e-mail, so issue a fresh one here.
        let user_id = UserRepository::new((*state.db).clone())
            .find_by_login("alex")
            .await
            .unwrap()
            .unwrap()
            .id;
        let token = EmailVerificationRepository::new((*state.db).clone())
            .create_token(user_id)
            .await
            .unwrap();

        let request = Request::builder()
            .uri(format!("/registration/confirmation?token={token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], true);

        let (status, body) = send(&state, post("/auth", &credentials("alex", PASSWORD))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["accessToken"].as_str().is_some());
        assert!(body["refreshToken"].as_str().is_some());
        assert_eq!(body["expiresIn"], 900);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let state = test_state().await;
        let body = json!({
            "name": " ",
            "login": "alex",
            "password": "123",
            "passwordConfirm": "321",
            "email": "not-an-email"
        });

        let (status, body) = send(&state, post("/registration", &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(errors.contains(&"name: Имя должно содержать хотя бы один видимый символ"));
        assert!(errors.contains(&"password: Пароль должен содержать больше 6 символов"));
        assert!(errors.contains(&"passwordConfirm: Пароли не совпадают"));
        assert!(errors.contains(&"email: Некорректный почтовый адрес"));
    }

    #[tokio::test]
    async fn test_register_duplicate_login() {
        let state = test_state().await;
        create_user(&state, "alex", true).await;

        let (status, body) = send(
            &state,
            post("/registration", &registration("alex", "other@yandex.ru")),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({ "error": "Пользователь с таким логином уже существует" })
        );
    }

    #[tokio::test]
    async fn test_concurrent_registrations_with_same_login() {
        let state = test_state().await;

        let (first, second) = tokio::join!(
            send(&state, post("/registration", &registration("dup", "dup1@yandex.ru"))),
            send(&state, post("/registration", &registration("dup", "dup2@yandex.ru"))),
        );

        let mut statuses = [first.0, second.0];
        statuses.sort();
        assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);

        let conflict = if first.0 == StatusCode::CONFLICT { first.1 } else { second.1 };
        assert_eq!(
            conflict,
            json!({ "error": "Пользователь с таким логином уже существует" })
        );
    }

    #[tokio::test]
    async fn test_confirm_with_unknown_token() {
        let state = test_state().await;
        let request = Request::builder()
            .uri("/registration/confirmation?token=unknown")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&state, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Ссылка подтверждения недействительна" }));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let state = test_state().await;
        create_user(&state, "bot", true).await;

        let (status, body) = send(&state, post("/auth", &credentials("bot", "wrong!"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Некорректный логин или пароль" }));
    }

    #[tokio::test]
    async fn test_refresh() {
        let state = test_state().await;
        create_user(&state, "bot", true).await;
        let (_, pair) = send(&state, post("/auth", &credentials("bot", PASSWORD))).await;

        let (status, body) = send(
            &state,
            post(
                "/auth/refresh",
                &json!({ "refreshToken": pair["refreshToken"] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let access = body["accessToken"].as_str().unwrap();
        let claims = state
            .jwt_service
            .validate_token(access, TokenKind::Access)
            .unwrap();
        assert_eq!(claims.login, "bot");
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let state = test_state().await;
        create_user(&state, "bot", true).await;
        let (_, pair) = send(&state, post("/auth", &credentials("bot", PASSWORD))).await;

        let (status, body) = send(
            &state,
            post(
                "/auth/refresh",
                &json!({ "refreshToken": pair["accessToken"] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "invalid_token" }));
    }
}
