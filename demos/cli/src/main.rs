use anyhow::{Context, Result};
use auth_core::{AuthCodeProvider, Credentials};
use healthplanet::HealthPlanetProvider;
use tracing_subscriber::EnvFilter;

fn required_var(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("missing environment variable {name}"))
}

fn credentials_from_env() -> Result<Credentials> {
    Ok(Credentials::new(
        required_var("HEALTHPLANET_CLIENT_ID")?,
        required_var("HEALTHPLANET_CLIENT_SECRET")?,
        required_var("HEALTHPLANET_LOGIN_ID")?,
        required_var("HEALTHPLANET_LOGIN_PASSWORD")?,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    // Logs go to stderr; stdout carries nothing but the code.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let credentials = credentials_from_env()?;
    let provider = HealthPlanetProvider::new();

    tracing::debug!(provider = provider.name(), "starting authorization flow");
    let code = provider.obtain_code(&credentials).await?;

    println!("{code}");
    Ok(())
}
