use anyhow::Context;
use backend_api::{run_server, AppState};
use rates_client::HttpRateProvider;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // HOST_API is required; HOST, PORT, the default selection and the session TTL have fallbacks.
    let settings = settings_loader::load_settings().context("Loading dashboard settings")?;

    let provider =
        HttpRateProvider::new(settings.host_api.clone()).context("Building rate provider client")?;

    println!("FX Dashboard API Server");
    println!("=======================");
    println!("Rate provider: {}", provider.base_url());
    println!(
        "Default selection: {} {}",
        settings.default_selection.country, settings.default_selection.year
    );
    println!("Session idle timeout: {}s", settings.session_ttl.as_secs());
    println!("Listening on: {}:{}", settings.host, settings.port);
    println!();

    let state = Arc::new(
        AppState::new(Arc::new(provider), settings.default_selection)
            .with_session_ttl(settings.session_ttl),
    );

    run_server(state, &settings.host, settings.port).await?;

    Ok(())
}
