use async_trait::async_trait;
use lambda_http::{Body, Request, Response};
use std::sync::Arc;
use thiserror::Error;

use crate::simulator::{Interception, Simulator};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no route to {method} {uri}")]
    Unreachable { method: String, uri: String },
    #[error("transport failed: {0}")]
    Failed(String),
}

/// Where the client sends its requests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response<Body>, TransportError>;
}

/// Transport with no network behind it. Every request fails as unreachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnreachableTransport;

#[async_trait]
impl Transport for UnreachableTransport {
    async fn send(&self, request: Request) -> Result<Response<Body>, TransportError> {
        Err(TransportError::Unreachable {
            method: request.method().to_string(),
            uri: request.uri().to_string(),
        })
    }
}

/// Offers each request to the simulator first. Requests it does not handle go
/// to the pass-through transport.
pub struct SimulatedTransport {
    simulator: Arc<Simulator>,
    passthrough: Arc<dyn Transport>,
}

impl SimulatedTransport {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self {
            simulator,
            passthrough: Arc::new(UnreachableTransport),
        }
    }

    pub fn with_passthrough(mut self, passthrough: Arc<dyn Transport>) -> Self {
        self.passthrough = passthrough;
        self
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    async fn send(&self, request: Request) -> Result<Response<Body>, TransportError> {
        match self.simulator.intercept(request).await {
            Interception::Handled(response) => Ok(response),
            Interception::PassThrough(request) => self.passthrough.send(request).await,
        }
    }
}
