//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{Coins, OperationContext, UserReport};
use crate::error::{AppError, AppResult};
use crate::handlers::{AuthenticateCommand, BuyItemCommand, TransferCommand};

use super::middleware::{auth_middleware, logging_middleware};
use super::AppState;

const MIN_NAME_LEN: usize = 4;
const MAX_NAME_LEN: usize = 64;
const MAX_PASSWORD_LEN: usize = 128;
const MAX_ITEM_LEN: usize = 16;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    pub to_user: String,
    pub amount: i64,
}

// =========================================================================
// Router
// =========================================================================

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/info", get(get_info))
        .route("/sendCoin", post(send_coin))
        .route("/buy/:item", get(buy_item))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .route("/auth", post(authenticate))
        .merge(protected);

    Router::new()
        // Health check (no auth)
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// =========================================================================
// POST /api/auth
// =========================================================================

/// Log in, registering the user on first use
async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(request) = payload.map_err(|_| invalid_body())?;

    validate_name("username", &request.username)?;
    validate_password(&request.password)?;

    let token = state
        .auth
        .authenticate(AuthenticateCommand::new(request.username, request.password))
        .await?;

    Ok(Json(AuthResponse { token }))
}

// =========================================================================
// GET /api/info
// =========================================================================

/// Balance, inventory and coin history of the caller
async fn get_info(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Json<UserReport>> {
    let report = state.reports.get_report(context.account_id).await?;
    Ok(Json(report))
}

// =========================================================================
// POST /api/sendCoin
// =========================================================================

/// Send coins to another user
async fn send_coin(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(request) = payload.map_err(|_| invalid_body())?;

    validate_name("toUser", &request.to_user)?;
    let amount = Coins::new(request.amount)
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    state
        .payments
        .transfer(TransferCommand::new(context.account_id, request.to_user, amount))
        .await?;

    Ok(StatusCode::OK)
}

// =========================================================================
// GET /api/buy/:item
// =========================================================================

/// Buy one unit of a catalog item
async fn buy_item(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(item): Path<String>,
) -> AppResult<StatusCode> {
    if item.is_empty() || item.chars().count() > MAX_ITEM_LEN {
        return Err(AppError::InvalidRequest(format!(
            "item must be 1 to {} characters",
            MAX_ITEM_LEN
        )));
    }

    state
        .payments
        .buy_item(BuyItemCommand::new(context.account_id, item))
        .await?;

    Ok(StatusCode::OK)
}

// =========================================================================
// Validation helpers
// =========================================================================

fn invalid_body() -> AppError {
    AppError::InvalidRequest("invalid request body".to_string())
}

fn validate_name(field: &str, value: &str) -> AppResult<()> {
    let len = value.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(AppError::InvalidRequest(format!(
            "{} must be {} to {} characters",
            field, MIN_NAME_LEN, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Password of 1 to 128 characters mixing upper and lower case letters,
/// digits and at least one special character
fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if len == 0 || len > MAX_PASSWORD_LEN {
        return Err(AppError::InvalidRequest(format!(
            "password must be 1 to {} characters",
            MAX_PASSWORD_LEN
        )));
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(has_upper && has_lower && has_digit && has_special) {
        return Err(AppError::InvalidRequest(
            "password must contain upper and lower case letters, a digit and a special character"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_bounds() {
        assert!(validate_name("username", "bob").is_err());
        assert!(validate_name("username", "bobby").is_ok());
        assert!(validate_name("username", &"x".repeat(64)).is_ok());
        assert!(validate_name("username", &"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_password_strength() {
        assert!(validate_password("Secret-123").is_ok());
        assert!(validate_password("aA1!").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("abcdefgh1234").is_err());
        assert!(validate_password("ABCDEFGH1234!").is_err());
        assert!(validate_password("Abcdefgh!").is_err());
        assert!(validate_password("Abcdefgh1234").is_err());
        assert!(validate_password(&format!("aA1!{}", "x".repeat(125))).is_err());
    }

    #[test]
    fn test_send_coin_request_uses_camel_case() {
        let request: SendCoinRequest =
            serde_json::from_str(r#"{"toUser": "alice", "amount": 10}"#).unwrap();
        assert_eq!(request.to_user, "alice");
        assert_eq!(request.amount, 10);
    }
}
