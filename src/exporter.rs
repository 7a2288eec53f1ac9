//! Prometheus exporter for [`FacadeSink`] emissions.
//!
//! Installs the process-wide `metrics` recorder once and serves it over
//! HTTP. The sink itself never touches this module; any recorder works.
//!
//! - `OnceLock` guards the one-time installation
//! - `init_test()` tolerates concurrent test threads racing to install

use axum::{Extension, Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use snafu::prelude::*;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::MetricsConfig;
use crate::error::{AlreadyInitializedSnafu, MetricsError, NotInitializedSnafu, PrometheusInitSnafu};
use crate::sink::{FacadeSink, MetricsSink};

/// Histogram buckets in milliseconds, matching what timings are recorded in.
const LATENCY_BUCKETS_MS: &[f64] = &[
    1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0,
];

static CONTROLLER: OnceLock<MetricsController> = OnceLock::new();

/// Handle to the installed exporter.
pub struct MetricsController {
    handle: PrometheusHandle,
}

impl MetricsController {
    /// Get the installed controller.
    ///
    /// # Errors
    ///
    /// Returns an error if no exporter was installed.
    pub fn get() -> Result<&'static Self, MetricsError> {
        CONTROLLER.get().context(NotInitializedSnafu)
    }

    /// Render metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the recorder and serve `/metrics` and `/health` on `addr`.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if the exporter is already installed or the recorder
/// fails to build.
pub fn init(addr: SocketAddr) -> Result<(), MetricsError> {
    install()?;
    tokio::spawn(run_server(addr));

    info!(%addr, "Metrics exporter started");
    Ok(())
}

/// Install the recorder without an HTTP endpoint. Safe to call repeatedly
/// from any number of test threads.
pub fn init_test() {
    if install().is_err() {
        while CONTROLLER.get().is_none() {
            std::hint::spin_loop();
        }
    }
}

fn install() -> Result<(), MetricsError> {
    ensure!(CONTROLLER.get().is_none(), AlreadyInitializedSnafu);

    let handle = PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS_MS)
        .context(PrometheusInitSnafu)?
        .install_recorder()
        .context(PrometheusInitSnafu)?;

    CONTROLLER
        .set(MetricsController { handle })
        .map_err(|_| AlreadyInitializedSnafu.build())
}

/// Build the sink described by `config`.
///
/// The exporter is not started here; call [`init`] when
/// `config.enabled` is set.
pub fn build_sink(config: &MetricsConfig) -> Arc<dyn MetricsSink> {
    Arc::new(FacadeSink::from_config(config))
}

async fn run_server(addr: SocketAddr) {
    let Some(controller) = CONTROLLER.get() else {
        error!("Metrics exporter started before the recorder was installed");
        return;
    };

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(Extension(controller.handle.clone()));

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind metrics exporter to {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Metrics exporter error: {}", e);
    }
}

async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> String {
    handle.render()
}

async fn health_handler() -> &'static str {
    "ok\n"
}
