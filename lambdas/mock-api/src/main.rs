use lambda_http::{run, service_fn, Error, Request};
use std::sync::Arc;
use synapse_shared::config::SimulatorConfig;
use synapse_shared::simulator::Simulator;
use synapse_shared::AppState;
use tracing_subscriber::EnvFilter;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    // Bad latency bounds or mode names stop the function before it serves anything
    let config = SimulatorConfig::from_env()?;
    let simulator = Arc::new(Simulator::new(AppState::from_config(config)));

    run(service_fn(move |event: Request| {
        let simulator = Arc::clone(&simulator);
        async move { http_handler::function_handler(event, simulator).await }
    }))
    .await
}
