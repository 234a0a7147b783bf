//! Client facade the UI calls, one method per auth operation.
//!
//! Every call yields an [`ApiEnvelope`]. Non-2xx answers, unreadable bodies
//! and transport faults all come back as failure envelopes rather than errors.

pub mod storage;
pub mod transport;

use lambda_http::{http::Method, Body, Error, Request};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::envelope::{ApiEnvelope, FailureBody};
use crate::error::ApiError;
use crate::simulator::Simulator;
use crate::types::{
    Acknowledgement, CurrentUserResponse, ForgotPasswordRequest, LoginRequest, LoginResponse,
    SignupRequest, SignupResponse,
};

pub use storage::{LocalStorage, MemoryStorage, AUTH_TOKEN_KEY};
pub use transport::{SimulatedTransport, Transport, TransportError, UnreachableTransport};

pub const REQUEST_FAILED: &str = "Request failed";
pub const LOGOUT_MESSAGE: &str = crate::simulator::auth::LOGOUT_SUCCESS;

pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn LocalStorage>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn LocalStorage>,
    ) -> Self {
        Self {
            base_url: config.base_url.clone(),
            transport,
            storage,
        }
    }

    /// Client answered entirely by the in-process simulator, with fresh storage
    pub fn simulated(config: &ClientConfig, simulator: Arc<Simulator>) -> Self {
        Self::new(
            config,
            Arc::new(SimulatedTransport::new(simulator)),
            Arc::new(MemoryStorage::new()),
        )
    }

    pub fn stored_token(&self) -> Option<String> {
        self.storage.get(AUTH_TOKEN_KEY)
    }

    /// Sign in. The returned token is kept for later calls.
    pub async fn login(&self, credentials: &LoginRequest) -> ApiEnvelope<LoginResponse> {
        let envelope: ApiEnvelope<LoginResponse> = self
            .request(Method::POST, "/auth/login", Some(credentials))
            .await;

        if let Some(response) = envelope.data() {
            self.storage
                .set(AUTH_TOKEN_KEY, response.data.token.as_str());
        }
        envelope
    }

    pub async fn signup(&self, user: &SignupRequest) -> ApiEnvelope<SignupResponse> {
        self.request(Method::POST, "/auth/signup", Some(user)).await
    }

    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> ApiEnvelope<Acknowledgement> {
        self.request(Method::POST, "/auth/forgot-password", Some(request))
            .await
    }

    pub async fn current_user(&self) -> ApiEnvelope<CurrentUserResponse> {
        self.request::<(), _>(Method::GET, "/auth/me", None).await
    }

    /// Forget the stored token. Purely local, so it always succeeds.
    pub async fn logout(&self) -> ApiEnvelope<Acknowledgement> {
        self.storage.remove(AUTH_TOKEN_KEY);
        tracing::info!("🚪 Local session cleared");
        ApiEnvelope::success_with_message(LOGOUT_MESSAGE, Acknowledgement::default())
    }

    async fn request<B, T>(&self, method: Method, endpoint: &str, body: Option<&B>) -> ApiEnvelope<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let request = match self.build_request(method.clone(), &url, body) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("❌ Could not build request for {}: {}", url, e);
                return ApiError::connectivity().into_envelope();
            }
        };

        tracing::info!("🚀 Sending {} {}", method, url);
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("❌ Request to {} failed: {}", url, e);
                return ApiError::connectivity().into_envelope();
            }
        };

        let status = response.status();
        tracing::info!("📥 Response received - Status: {}", status);

        if !status.is_success() {
            return failure_from_body(response.body());
        }

        match serde_json::from_slice::<ApiEnvelope<T>>(response.body()) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("❌ Unreadable response from {}: {}", url, e);
                ApiError::connectivity().into_envelope()
            }
        }
    }

    fn build_request<B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<Request, Error>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = lambda_http::http::Request::builder()
            .method(method)
            .uri(url)
            .header("Content-Type", "application/json");

        if let Some(token) = self.stored_token() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(body) => Body::Text(serde_json::to_string(body)?),
            None => Body::Empty,
        };
        Ok(builder.body(body).map_err(Box::new)?)
    }
}

fn failure_from_body<T>(body: &[u8]) -> ApiEnvelope<T> {
    let body: FailureBody = serde_json::from_slice(body).unwrap_or_default();
    let message = body
        .message
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| REQUEST_FAILED.to_string());

    ApiEnvelope::Failure {
        message,
        errors: body.errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::error::CONNECTIVITY_ERROR_MESSAGE;
    use crate::latency::NoLatency;
    use crate::store::CredentialStore;
    use crate::AppState;
    use async_trait::async_trait;
    use lambda_http::{http::StatusCode, Response};
    use std::sync::Mutex;

    /// Replies with a canned status and body, remembering the last request
    struct Canned {
        status: StatusCode,
        body: &'static str,
        seen: Mutex<Option<Request>>,
    }

    impl Canned {
        fn new(status: StatusCode, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                seen: Mutex::new(None),
            })
        }

        fn last_authorization(&self) -> Option<String> {
            self.seen
                .lock()
                .unwrap()
                .as_ref()
                .and_then(|r| r.headers().get("Authorization"))
                .map(|v| v.to_str().unwrap().to_string())
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn send(&self, request: Request) -> Result<Response<Body>, TransportError> {
            *self.seen.lock().unwrap() = Some(request);
            let mut response = Response::new(Body::from(self.body));
            *response.status_mut() = self.status;
            Ok(response)
        }
    }

    struct Broken;

    #[async_trait]
    impl Transport for Broken {
        async fn send(&self, _request: Request) -> Result<Response<Body>, TransportError> {
            Err(TransportError::Failed("connection reset".to_string()))
        }
    }

    fn client(transport: Arc<dyn Transport>) -> ApiClient {
        ApiClient::new(
            &ClientConfig::default(),
            transport,
            Arc::new(MemoryStorage::new()),
        )
    }

    fn simulated() -> ApiClient {
        let state = AppState::new(CredentialStore::seeded(), NoLatency, SimulatorConfig::default());
        ApiClient::simulated(&ClientConfig::default(), Arc::new(Simulator::new(state)))
    }

    fn credentials(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn login_stores_the_token() {
        let client = simulated();
        let envelope = client
            .login(&credentials("admin@synapseai.com", "Admin123!"))
            .await;

        let token = envelope.data().unwrap().data.token.as_str().to_string();
        assert_eq!(client.stored_token(), Some(token));
    }

    #[tokio::test]
    async fn failed_login_stores_nothing() {
        let client = simulated();
        let envelope = client
            .login(&credentials("admin@synapseai.com", "wrong"))
            .await;

        assert!(!envelope.is_success());
        assert_eq!(envelope.message(), Some("Incorrect email or password"));
        assert_eq!(client.stored_token(), None);
    }

    #[tokio::test]
    async fn stored_token_is_sent_as_bearer() {
        let transport = Canned::new(StatusCode::OK, r#"{"success":true,"message":"ok"}"#);
        let client = client(transport.clone());

        client.forgot_password(&ForgotPasswordRequest::default()).await;
        assert_eq!(transport.last_authorization(), None);

        client.storage.set(AUTH_TOKEN_KEY, "abc");
        client.forgot_password(&ForgotPasswordRequest::default()).await;
        assert_eq!(transport.last_authorization().as_deref(), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn non_success_status_keeps_message_and_errors() {
        let transport = Canned::new(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"Invalid data","errors":{"name":["Name is required"]}}"#,
        );
        let envelope = client(transport).signup(&SignupRequest::default()).await;

        assert_eq!(envelope.message(), Some("Invalid data"));
        assert_eq!(
            envelope.errors().unwrap()["name"],
            vec!["Name is required".to_string()]
        );
    }

    #[tokio::test]
    async fn unparsable_error_body_gets_generic_message() {
        let transport = Canned::new(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        let envelope = client(transport).current_user().await;

        assert_eq!(envelope.message(), Some(REQUEST_FAILED));
        assert_eq!(envelope.errors(), None);
    }

    #[tokio::test]
    async fn unreadable_success_body_is_a_connectivity_failure() {
        let transport = Canned::new(StatusCode::OK, "not json");
        let envelope = client(transport).current_user().await;

        assert_eq!(envelope.message(), Some(CONNECTIVITY_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn transport_faults_become_connectivity_failures() {
        let envelope = client(Arc::new(Broken))
            .login(&credentials("a@b.c", "x"))
            .await;

        assert!(!envelope.is_success());
        assert_eq!(envelope.message(), Some(CONNECTIVITY_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn unmatched_routes_without_passthrough_are_connectivity_failures() {
        let config = ClientConfig {
            base_url: "http://localhost:3000/elsewhere".to_string(),
        };
        let state = AppState::new(CredentialStore::seeded(), NoLatency, SimulatorConfig::default());
        let client = ApiClient::simulated(&config, Arc::new(Simulator::new(state)));

        let envelope = client.logout().await;
        assert!(envelope.is_success());

        let envelope = client.current_user().await;
        assert_eq!(envelope.message(), Some(CONNECTIVITY_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn logout_clears_token_and_never_calls_out() {
        let transport = Canned::new(StatusCode::INTERNAL_SERVER_ERROR, "");
        let client = client(transport.clone());
        client.storage.set(AUTH_TOKEN_KEY, "abc");

        let envelope = client.logout().await;

        assert!(envelope.is_success());
        assert_eq!(envelope.message(), Some(LOGOUT_MESSAGE));
        assert_eq!(client.stored_token(), None);
        assert!(transport.seen.lock().unwrap().is_none());
    }
}
