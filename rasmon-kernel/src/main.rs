/**
 * RASMON KERNEL - Point d'entrée du moniteur de cluster 1C
 *
 * RÔLE : Bootstrap : .env, logging, configuration, choix du client rac, HTTP.
 *
 * Le client (processus réel ou rejeu de fixtures) est choisi une seule fois ici,
 * d'après `RAS_FAKE_DATA` ; le reste du kernel ne voit que `RacClient`.
 */

use anyhow::Context;
use rasmon_kernel::client::{FixtureClient, ProcessClient, RacClient};
use rasmon_kernel::config::{ClientMode, Settings};
use rasmon_kernel::http;
use rasmon_kernel::snapshot::SnapshotCollector;
use rasmon_kernel::state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rasmon_kernel=info")),
        )
        .init();

    let settings = Settings::load().context("failed to load settings")?;

    match settings.client_mode() {
        ClientMode::Fixture(dir) => {
            info!(dir = %dir.display(), "replaying rac fixtures");
            serve(FixtureClient::new(dir), settings).await
        }
        ClientMode::Process => {
            let client = ProcessClient::from_settings(&settings);
            info!(
                rac = %client.rac_path().display(),
                ras = %settings.ras_address(),
                timeout = ?settings.timeout(),
                "using rac binary"
            );
            serve(client, settings).await
        }
    }
}

async fn serve<C: RacClient + 'static>(client: C, settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind;
    let collector = SnapshotCollector::from_settings(client, &settings);
    let app = http::build_router(AppState::new(collector, settings));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await.context("http server stopped")?;
    Ok(())
}
