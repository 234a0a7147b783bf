use chrono::{SecondsFormat, Utc};
use lambda_http::{Body, Error, Response};
use uuid::Uuid;

use super::response::{parse_body, respond};
use crate::envelope::FieldErrors;
use crate::error::ApiError;
use crate::token;
use crate::types::{
    Acknowledgement, ForgotPasswordRequest, LoginData, LoginRequest, LoginResponse, NewUser, Role,
    SessionUser, SignupRequest, SignupResponse, UserRecord,
};
use crate::AppState;

pub const LOGIN_SUCCESS: &str = "Login successful";
pub const SIGNUP_SUCCESS: &str = "Account created successfully";
pub const RESET_EMAIL_SENT: &str = "Password recovery email sent successfully";
pub const LOGOUT_SUCCESS: &str = "Logout successful";

pub const CREDENTIALS_REQUIRED: &str = "Email and password are required";
pub const INVALID_CREDENTIALS: &str = "Incorrect email or password";
pub const INVALID_DATA: &str = "Invalid data";
pub const EMAIL_NOT_FOUND: &str = "Email not found";

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const EMAIL_TAKEN: &str = "This email is already in use";

fn field_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.insert(field.to_string(), vec![message.to_string()]);
}

/// Handle user login against the credential store
pub async fn login(state: &AppState, body: &Body) -> Result<Response<Body>, Error> {
    tracing::info!("🔐 Login request received");

    let result = match parse_body::<LoginRequest>(body) {
        Ok(request) => authenticate(state, request).await,
        Err(e) => Err(e),
    };
    respond(result, Some(LOGIN_SUCCESS))
}

async fn authenticate(state: &AppState, request: LoginRequest) -> Result<LoginResponse, ApiError> {
    tracing::info!("📋 Login payload - email: {} password: ***", request.email);

    let mut errors = FieldErrors::new();
    if request.email.is_empty() {
        field_error(&mut errors, "email", EMAIL_REQUIRED);
    }
    if request.password.is_empty() {
        field_error(&mut errors, "password", PASSWORD_REQUIRED);
    }
    if !errors.is_empty() {
        tracing::warn!("❌ Login rejected, missing fields: {:?}", errors.keys());
        return Err(ApiError::validation(CREDENTIALS_REQUIRED, errors));
    }

    let user = match state.store.find_by_email(&request.email).await {
        Some(user) if user.password == request.password => user,
        _ => {
            tracing::warn!("❌ Invalid credentials for: {}", request.email);
            return Err(ApiError::Auth(INVALID_CREDENTIALS.to_string()));
        }
    };

    let token = token::issue(&user.id);
    tracing::info!("✅ Login successful for: {}", user.email);

    Ok(LoginResponse {
        data: LoginData {
            user: SessionUser::from(&user),
            token,
        },
    })
}

/// Handle user signup. Every field is checked before answering, so a single
/// response can carry several field errors.
pub async fn signup(state: &AppState, body: &Body) -> Result<Response<Body>, Error> {
    tracing::info!("📝 Signup request received");

    let result = match parse_body::<SignupRequest>(body) {
        Ok(request) => register(state, request).await,
        Err(e) => Err(e),
    };
    respond(result, Some(SIGNUP_SUCCESS))
}

async fn register(state: &AppState, request: SignupRequest) -> Result<SignupResponse, ApiError> {
    tracing::info!(
        "📋 Signup payload - name: {} email: {} password: ***",
        request.name,
        request.email
    );

    let mut errors = FieldErrors::new();
    if request.name.is_empty() {
        field_error(&mut errors, "name", NAME_REQUIRED);
    }
    if request.email.is_empty() {
        field_error(&mut errors, "email", EMAIL_REQUIRED);
    }
    if request.password.is_empty() {
        field_error(&mut errors, "password", PASSWORD_REQUIRED);
    }
    if request.password != request.confirm_password {
        field_error(&mut errors, "confirmPassword", PASSWORDS_DO_NOT_MATCH);
    }
    if !request.email.is_empty() && state.store.find_by_email(&request.email).await.is_some() {
        field_error(&mut errors, "email", EMAIL_TAKEN);
    }

    if !errors.is_empty() {
        tracing::warn!("❌ Signup rejected: {:?}", errors);
        return Err(ApiError::validation(INVALID_DATA, errors));
    }

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let record = UserRecord {
        id: Uuid::new_v4().to_string(),
        email: request.email,
        password: request.password,
        name: request.name,
        role: Role::User,
        created_at: now.clone(),
        updated_at: now,
    };
    let user = NewUser::from(&record);

    // Another signup for the same email may have landed since the check above
    if !state.store.insert_new(record).await {
        tracing::warn!("❌ Signup lost race for: {}", user.email);
        let mut errors = FieldErrors::new();
        field_error(&mut errors, "email", EMAIL_TAKEN);
        return Err(ApiError::validation(INVALID_DATA, errors));
    }

    let token = state
        .config
        .issue_token_on_signup
        .then(|| token::issue(&user.id));

    tracing::info!("✅ User created: {} ({})", user.email, user.id);
    Ok(SignupResponse { user, token })
}

/// Handle password recovery. No email is sent and no reset token is kept.
pub async fn forgot_password(state: &AppState, body: &Body) -> Result<Response<Body>, Error> {
    tracing::info!("🔑 Password recovery request received");

    let result = match parse_body::<ForgotPasswordRequest>(body) {
        Ok(request) => request_reset(state, request).await,
        Err(e) => Err(e),
    };
    respond(result, Some(RESET_EMAIL_SENT))
}

async fn request_reset(
    state: &AppState,
    request: ForgotPasswordRequest,
) -> Result<Acknowledgement, ApiError> {
    if request.email.is_empty() {
        return Err(ApiError::validation(EMAIL_REQUIRED, FieldErrors::new()));
    }

    if state.store.find_by_email(&request.email).await.is_none() {
        tracing::warn!("❌ Recovery requested for unknown email: {}", request.email);
        return Err(ApiError::NotFound(EMAIL_NOT_FOUND.to_string()));
    }

    tracing::info!("✅ Recovery email \"sent\" to: {}", request.email);
    Ok(Acknowledgement::default())
}

/// Acknowledge a logout. Tokens are not tracked, so there is nothing to revoke.
pub async fn logout() -> Result<Response<Body>, Error> {
    tracing::info!("🚪 Logout request received");
    respond(Ok(Acknowledgement::default()), Some(LOGOUT_SUCCESS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::latency::NoLatency;
    use crate::store::CredentialStore;
    use lambda_http::http::StatusCode;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn state() -> Arc<AppState> {
        AppState::new(CredentialStore::seeded(), NoLatency, SimulatorConfig::default())
    }

    fn body(value: Value) -> Body {
        Body::from(value.to_string())
    }

    fn read(response: &Response<Body>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn login_with_seeded_credentials_returns_user_and_token() {
        let state = state();
        let response = login(
            &state,
            &body(json!({"email": "admin@synapseai.com", "password": "Admin123!"})),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value = read(&response);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], LOGIN_SUCCESS);
        assert_eq!(value["data"]["user"]["id"], "1");
        assert_eq!(value["data"]["user"]["role"], "admin");
        assert!(value["data"]["user"].get("password").is_none());
        assert!(!value["data"]["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_names_each_missing_field() {
        let state = state();
        let response = login(&state, &body(json!({"email": "admin@synapseai.com"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = read(&response);
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], CREDENTIALS_REQUIRED);
        assert_eq!(value["errors"], json!({"password": [PASSWORD_REQUIRED]}));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let state = state();
        let response = login(
            &state,
            &body(json!({"email": "admin@synapseai.com", "password": "nope"})),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let value = read(&response);
        assert_eq!(value["message"], INVALID_CREDENTIALS);
        assert!(value.get("data").is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_an_internal_error() {
        let state = state();
        let response = login(&state, &Body::from("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read(&response)["message"], "Internal server error");
    }

    #[tokio::test]
    async fn signup_reports_every_invalid_field_at_once() {
        let state = state();
        let response = signup(
            &state,
            &body(json!({
                "name": "",
                "email": "user@synapseai.com",
                "password": "abc",
                "confirmPassword": "abd"
            })),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = read(&response);
        assert_eq!(value["message"], INVALID_DATA);
        assert_eq!(value["errors"]["name"], json!([NAME_REQUIRED]));
        assert_eq!(value["errors"]["email"], json!([EMAIL_TAKEN]));
        assert_eq!(value["errors"]["confirmPassword"], json!([PASSWORDS_DO_NOT_MATCH]));
        assert!(value["errors"].get("password").is_none());
        assert_eq!(state.store.len().await, 2);
    }

    #[tokio::test]
    async fn signup_appends_a_user_role_record() {
        let state = state();
        let response = signup(
            &state,
            &body(json!({
                "name": "Ana",
                "email": "ana@x.com",
                "password": "Abc123",
                "confirmPassword": "Abc123"
            })),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value = read(&response);
        assert_eq!(value["message"], SIGNUP_SUCCESS);
        assert_eq!(value["user"]["email"], "ana@x.com");
        assert!(value.get("token").is_none());

        let stored = state.store.find_by_email("ana@x.com").await.unwrap();
        assert_eq!(stored.role, Role::User);
        assert_eq!(value["user"]["id"], stored.id.as_str());
    }

    #[tokio::test]
    async fn signup_can_issue_a_token_when_configured() {
        let config = SimulatorConfig {
            issue_token_on_signup: true,
            ..SimulatorConfig::default()
        };
        let state = AppState::new(CredentialStore::seeded(), NoLatency, config);
        let response = signup(
            &state,
            &body(json!({
                "name": "Bo",
                "email": "bo@x.com",
                "password": "pw",
                "confirmPassword": "pw"
            })),
        )
        .await
        .unwrap();

        let value = read(&response);
        let token = crate::token::SessionToken::from(value["token"].as_str().unwrap());
        assert_eq!(token.claims().unwrap().user_id, value["user"]["id"].as_str().unwrap());
    }

    #[tokio::test]
    async fn forgot_password_outcomes() {
        let state = state();

        let missing = forgot_password(&state, &body(json!({}))).await.unwrap();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read(&missing)["message"], EMAIL_REQUIRED);

        let unknown = forgot_password(&state, &body(json!({"email": "nobody@x.com"})))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        assert_eq!(read(&unknown)["message"], EMAIL_NOT_FOUND);

        let known = forgot_password(&state, &body(json!({"email": "user@synapseai.com"})))
            .await
            .unwrap();
        assert_eq!(known.status(), StatusCode::OK);
        assert_eq!(read(&known), json!({"success": true, "message": RESET_EMAIL_SENT}));
    }

    #[tokio::test]
    async fn logout_always_acknowledges() {
        let response = logout().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read(&response), json!({"success": true, "message": LOGOUT_SUCCESS}));
    }
}
