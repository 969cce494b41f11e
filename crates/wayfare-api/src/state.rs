//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::Arc;
use wayfare_auth::TokenIssuer;
use wayfare_core::{AuthService, BookingService};
use wayfare_db::Database;
use wayfare_storage::StorageBackend;

/// Handle for rendering Prometheus metrics
#[derive(Clone)]
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenIssuer>,
    pub auth: AuthService,
    pub bookings: BookingService,
    pub storage: Arc<dyn StorageBackend>,
    /// Directory the static file service exposes at /uploads
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(
        db: Database,
        tokens: Arc<TokenIssuer>,
        storage: Arc<dyn StorageBackend>,
        uploads_dir: PathBuf,
    ) -> Self {
        let auth = AuthService::new(db.clone(), tokens.clone());
        let bookings = BookingService::new(db.clone());
        Self {
            db,
            tokens,
            auth,
            bookings,
            storage,
            uploads_dir,
        }
    }
}
