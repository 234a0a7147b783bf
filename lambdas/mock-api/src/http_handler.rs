use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;
use synapse_shared::simulator::{self, Interception, Simulator};

/// Main Lambda handler - answers CORS preflight, then lets the simulator route
pub(crate) async fn function_handler(
    event: Request,
    simulator: Arc<Simulator>,
) -> Result<Response<Body>, Error> {
    tracing::info!(
        "🚀 Mock API invoked - Method: {} Path: {}",
        event.method(),
        event.uri().path()
    );

    if event.method() == Method::OPTIONS {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET,POST,OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    match simulator.intercept(event).await {
        Interception::Handled(response) => Ok(response),
        Interception::PassThrough(_) => simulator::not_found(),
    }
}
