//! In-process stand-in for the auth backend.
//!
//! The simulator answers the five auth routes under the configured base path.
//! Matched requests wait for the injected latency, run their handler, and get
//! a JSON envelope back. Anything else is handed back untouched so the caller
//! can forward it wherever it was going.

pub mod auth;
mod response;
pub mod users;

use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::fmt;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    ForgotPassword,
    Logout,
    CurrentUser,
}

/// Every route the simulator intercepts
pub const ROUTES: [Route; 5] = [
    Route::Login,
    Route::Signup,
    Route::ForgotPassword,
    Route::Logout,
    Route::CurrentUser,
];

impl Route {
    pub fn method(self) -> Method {
        match self {
            Self::CurrentUser => Method::GET,
            _ => Method::POST,
        }
    }

    /// Path relative to the base path
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Signup => "/auth/signup",
            Self::ForgotPassword => "/auth/forgot-password",
            Self::Logout => "/auth/logout",
            Self::CurrentUser => "/auth/me",
        }
    }

    /// Match a method and a path already stripped of the base path
    pub fn resolve(method: &Method, path: &str) -> Option<Self> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (method, parts.as_slice()) {
            (&Method::POST, ["auth", "login"]) => Some(Self::Login),
            (&Method::POST, ["auth", "signup"]) => Some(Self::Signup),
            (&Method::POST, ["auth", "forgot-password"]) => Some(Self::ForgotPassword),
            (&Method::POST, ["auth", "logout"]) => Some(Self::Logout),
            (&Method::GET, ["auth", "me"]) => Some(Self::CurrentUser),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// Outcome of offering a request to the simulator
#[derive(Debug)]
pub enum Interception {
    Handled(Response<Body>),
    /// No route matched; the original request is returned for forwarding
    PassThrough(Request),
}

pub struct Simulator {
    state: Arc<AppState>,
}

impl Simulator {
    pub fn new(state: Arc<AppState>) -> Self {
        tracing::info!(
            "📡 Intercepting requests for {} endpoints under '{}'",
            ROUTES.len(),
            state.config.base_path
        );
        Self { state }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Route for a request, or `None` when it falls outside the simulated API
    pub fn route_for(&self, request: &Request) -> Option<Route> {
        let path = request.uri().path();
        let relative = path.strip_prefix(self.state.config.base_path.as_str())?;
        if !relative.is_empty() && !relative.starts_with('/') {
            return None;
        }
        Route::resolve(request.method(), relative)
    }

    pub async fn intercept(&self, request: Request) -> Interception {
        let Some(route) = self.route_for(&request) else {
            tracing::warn!(
                "⚠️ Unhandled request passed through - Method: {} Path: {}",
                request.method(),
                request.uri().path()
            );
            return Interception::PassThrough(request);
        };

        tracing::info!("🛰️ Intercepted {}", route);
        self.state.latency.wait().await;

        match self.dispatch(route, &request).await {
            Ok(response) => {
                tracing::info!("📤 {} answered with {}", route, response.status());
                Interception::Handled(response)
            }
            Err(e) => {
                tracing::error!("❌ {} handler failed: {}", route, e);
                Interception::Handled(response::internal_error())
            }
        }
    }

    async fn dispatch(&self, route: Route, request: &Request) -> Result<Response<Body>, Error> {
        let state = self.state.as_ref();
        let body = request.body();

        match route {
            Route::Login => auth::login(state, body).await,
            Route::Signup => auth::signup(state, body).await,
            Route::ForgotPassword => auth::forgot_password(state, body).await,
            Route::Logout => auth::logout().await,
            Route::CurrentUser => users::current_user(state, request.headers()).await,
        }
    }
}

/// 404 envelope for hosts that must answer unmatched routes themselves
pub fn not_found() -> Result<Response<Body>, Error> {
    response::json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({"success": false, "message": "Not found"}),
    )
}
