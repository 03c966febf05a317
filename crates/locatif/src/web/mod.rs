//! Local web interface.
//!
//! An axum router over the handlers in the submodules. Handlers never share a
//! database connection: each storage access runs on the blocking pool with a
//! connection opened for it and closed when the closure returns.

mod dashboard;
pub mod error;
mod payments;
mod properties;
mod receipts;
mod settings;
mod tenants;
mod views;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::storage::Storage;

pub use error::AppError;
pub use views::{notice_message, Views};

const STYLESHEET: &str = include_str!("../../static/style.css");

/// Delay before opening the browser, so the server is accepting connections.
const BROWSER_DELAY: Duration = Duration::from_secs(1);

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    views: Arc<Views>,
    today: Option<NaiveDate>,
}

impl AppState {
    /// State for a database that [`Storage::open`] already initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the templates do not compile.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            db_path: Arc::new(db_path.into()),
            views: Arc::new(Views::new()?),
            today: None,
        })
    }

    /// Pin the current date instead of reading the local clock.
    #[must_use]
    pub fn at_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Path of the database file.
    #[must_use]
    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    /// The current local date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// The compiled templates.
    pub(crate) fn views(&self) -> &Views {
        &self.views
    }

    /// Run `f` against a connection opened for this call only.
    pub(crate) async fn with_storage<T, F>(&self, f: F) -> std::result::Result<T, AppError>
    where
        F: FnOnce(&Storage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = Arc::clone(&self.db_path);
        let joined = tokio::task::spawn_blocking(move || {
            let storage = Storage::connect(path.as_path())?;
            f(&storage)
        })
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?;
        Ok(joined?)
    }
}

/// URL parameters. A value that does not parse gets the not-found page
/// instead of a plain-text 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub(crate) struct Path<T>(pub T);

/// `?notice=` on pages reached after a redirect.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NoticeQuery {
    notice: Option<String>,
}

impl NoticeQuery {
    fn code(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

/// Redirect (303) to `path` with a notice code.
pub(crate) fn redirect_with_notice(path: &str, notice: &str) -> Response {
    Redirect::to(&format!("{path}?notice={notice}")).into_response()
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/statistics", get(dashboard::statistics))
        .route("/properties", get(properties::list))
        .route(
            "/properties/new",
            get(properties::new_form).post(properties::create),
        )
        .route("/properties/{id}", get(properties::show))
        .route(
            "/properties/{id}/edit",
            get(properties::edit_form).post(properties::update),
        )
        .route("/properties/{id}/delete", post(properties::delete))
        .route("/tenants", get(tenants::list))
        .route("/tenants/new", get(tenants::new_form).post(tenants::create))
        .route("/tenants/{id}", get(tenants::show))
        .route(
            "/tenants/{id}/edit",
            get(tenants::edit_form).post(tenants::update),
        )
        .route("/tenants/{id}/delete", post(tenants::delete))
        .route("/payments", get(payments::list))
        .route(
            "/payments/new",
            get(payments::new_form).post(payments::create),
        )
        .route(
            "/payments/{id}/edit",
            get(payments::edit_form).post(payments::update),
        )
        .route("/payments/{id}/delete", post(payments::delete))
        .route("/receipts", get(receipts::picker))
        .route("/receipts/generate", get(receipts::generate))
        .route("/receipts/{tenant_id}/{month}", get(receipts::download))
        .route("/settings", get(settings::show).post(settings::save))
        .route("/static/style.css", get(stylesheet))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
}

async fn not_found() -> AppError {
    AppError::NotFound("no such page".to_string())
}

/// Bind the first free port of the configured range.
///
/// # Errors
///
/// Returns [`Error::NoFreePort`] when every port is taken.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener> {
    let ip = config.ip()?;
    let last = config.last_port().ok_or_else(|| Error::ConfigValidation {
        message: "server port range overflows".to_string(),
    })?;

    for port in config.port..=last {
        match TcpListener::bind((ip, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => debug!("Port {} unavailable: {}", port, e),
        }
    }
    Err(Error::NoFreePort {
        first: config.port,
        last,
    })
}

/// Serve the UI until Ctrl+C.
///
/// # Errors
///
/// Returns an error if no port can be bound or the server fails.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = bind(config).await?;
    let url = format!("http://{}/", listener.local_addr()?);
    info!("Locatif is available at {}", url);
    println!("Locatif est disponible sur {url} (Ctrl+C pour arrêter)");

    if config.open_browser {
        tokio::spawn(async move {
            tokio::time::sleep(BROWSER_DELAY).await;
            if let Err(e) = open_browser(&url).await {
                warn!("Could not open a browser: {}", e);
            }
        });
    }

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Open `url` with the platform's default handler.
async fn open_browser(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        tokio::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = tokio::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        tokio::process::Command::new("xdg-open")
    };
    let status = command.arg(url).status().await?;
    if !status.success() {
        debug!("Browser launcher exited with {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_skips_taken_port() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let config = ServerConfig {
            port,
            port_attempts: 20,
            ..ServerConfig::default()
        };

        let listener = bind(&config).await.unwrap();
        let bound = listener.local_addr().unwrap().port();
        assert_ne!(bound, port);
        assert!(bound > port);
    }

    #[tokio::test]
    async fn test_bind_reports_exhausted_range() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let config = ServerConfig {
            port,
            port_attempts: 1,
            ..ServerConfig::default()
        };

        let err = bind(&config).await.unwrap_err();
        assert!(matches!(err, Error::NoFreePort { first, last } if first == port && last == port));
    }

    #[tokio::test]
    async fn test_with_storage_missing_database_is_internal() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("absent.db")).unwrap();
        let result = state.with_storage(|s| s.count_properties()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_today_can_be_pinned() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let state = AppState::new("unused.db").unwrap().at_date(date);
        assert_eq!(state.today(), date);
    }
}
