//! HTTP front end: `/info`, `/scan` and `/update_oui`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use netsweep_common::Config;
use netsweep_common::network::device::Device;
use netsweep_common::network::interface::InterfaceInfo;
use netsweep_core::update::OuiUpdater;
use netsweep_core::{DiscoveryService, ScanOptions, VendorRegistry, discovery};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub registry: Arc<VendorRegistry>,
    /// Registry download location, `None` for the IEEE default.
    pub oui_url: Option<String>,
}

/// Plain-text 500 carrying the error chain.
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %format!("{:#}", self.0), "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}\n", self.0)).into_response()
    }
}

pub async fn serve(bind: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!("Server listening on {bind}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/info", get(get_info))
        .route("/scan", get(get_scan))
        .route("/update_oui", get(update_oui).post(update_oui))
        .with_state(state)
}

async fn get_info(State(state): State<AppState>) -> Result<Json<InterfaceInfo>, ApiError> {
    let info = discovery::resolve_interface(&state.cfg)?;
    Ok(Json(info))
}

async fn get_scan(State(state): State<AppState>) -> Result<Json<Vec<Device>>, ApiError> {
    let service = DiscoveryService::new(state.registry.clone());
    let opts = ScanOptions::from(state.cfg.as_ref());
    let report = service.perform_discovery(&state.cfg, &opts).await?;
    info!(subnet = %report.subnet, found = report.devices.len(), "scan served");
    Ok(Json(report.devices))
}

async fn update_oui(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    let updater = match &state.oui_url {
        Some(url) => OuiUpdater::with_url(url.clone()),
        None => OuiUpdater::new(),
    }?;
    updater.update(&state.cfg.oui_path, &state.registry).await?;
    Ok("OUI database updated successfully\n")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
