//! HTTP error responses.
//!
//! Library errors are mapped to a status code and a small HTML page. Storage
//! and rendering failures are logged with their detail and shown to the user
//! as a generic message.

use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::error::Error;

const INTERNAL_MESSAGE: &str = "Une erreur interne est survenue. Consultez les journaux.";

/// Error returned by request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The requested record or document does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The request could not be processed as sent (422).
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Anything else (500). The message is logged, never returned.
    #[error("internal error: {0}")]
    Internal(#[source] Error),
}

impl AppError {
    /// Status code for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Page title and the message shown to the user.
    fn page_text(&self) -> (&'static str, String) {
        match self {
            Self::NotFound(_) => (
                "Page introuvable",
                "L'élément demandé n'existe pas ou a été supprimé.".to_string(),
            ),
            Self::Invalid(message) => ("Requête invalide", message.clone()),
            Self::Internal(_) => ("Erreur", INTERNAL_MESSAGE.to_string()),
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else if err.is_invalid_input() {
            Self::Invalid(err.to_string())
        } else {
            Self::Internal(err)
        }
    }
}

/// A malformed id in the URL names nothing.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::NotFound(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(source) => error!(error = %source, "request failed"),
            Self::NotFound(what) => warn!("not found: {what}"),
            Self::Invalid(_) => {}
        }

        let (title, message) = self.page_text();
        (self.status(), Html(error_page(title, &message))).into_response()
    }
}

/// Standalone error page, independent of the template registry.
fn error_page(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Locatif</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n<body>\n\
         <main class=\"error-page\">\n<h1>{title}</h1>\n<p>{message}</p>\n\
         <p><a href=\"/\">Retour au tableau de bord</a></p>\n</main>\n</body>\n</html>\n",
        title = handlebars::html_escape(title),
        message = handlebars::html_escape(message),
    )
}
