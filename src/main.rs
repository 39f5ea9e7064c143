// src/main.rs

use anyhow::Context;
use tokio::{net::TcpListener, sync::watch};
use tracing_subscriber::EnvFilter;

use tiara_backend::config::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Monitor de scans roda até o sinal de desligamento.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_handle = match app_state.scan_poller(&config)? {
        Some(poller) => Some(tokio::spawn(poller.run(shutdown_rx))),
        None => {
            tracing::warn!("⚠️ MESH_API_BASE_URL/MESH_API_TOKEN ausentes; monitor de scans desativado");
            None
        }
    };

    let app = tiara_backend::app(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Erro no servidor Axum")?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = poller_handle {
        if let Err(e) = handle.await {
            tracing::error!("🔥 Monitor de scans terminou com erro: {:?}", e);
        }
    }

    tracing::info!("👋 Servidor encerrado");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("🛑 Sinal de desligamento recebido"),
        Err(e) => {
            tracing::error!("🔥 Falha ao escutar o sinal de desligamento: {:?}", e);
            std::future::pending::<()>().await;
        }
    }
}
