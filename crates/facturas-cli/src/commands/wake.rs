use anyhow::{Result, bail};
use facturas_application::{ActivationState, BackendActivationMonitor};
use facturas_core::ClientConfig;
use facturas_interaction::HttpGroupApi;
use std::sync::Arc;

/// Blocks until the backend answers, reporting the sleeping phase.
pub async fn run(config: &ClientConfig) -> Result<()> {
    let probe = Arc::new(HttpGroupApi::from_config(config));
    let monitor = Arc::new(BackendActivationMonitor::new(probe, config.activation.clone()));
    let mut states = monitor.subscribe();
    let handle = monitor.start();

    let reporter = tokio::spawn(async move {
        if states.wait_for(|s| s.is_waking()).await.is_ok() {
            eprintln!("Service is waking up, this can take a minute...");
        }
    });

    let state = tokio::select! {
        joined = handle => joined?,
        _ = tokio::signal::ctrl_c() => {
            monitor.stop();
            ActivationState::Sleeping
        }
    };
    reporter.abort();

    if state != ActivationState::Awake {
        bail!("Backend did not wake up");
    }
    println!("Backend is awake ({})", config.base_url());
    Ok(())
}
