use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::fetch::FetchError;

#[derive(Debug)]
pub enum CardError {
    Fetch { username: String, error: FetchError },
    Render { username: String, error: anyhow::Error },
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Fetch { username, error } => {
                let error = anyhow::Error::from(error);
                error!("Could not get the feed of `{username}`: {error:#}");

                format!("Error getting user data: {error:#}")
            }

            Self::Render { username, error } => {
                error!("Could not render the card of `{username}`: {error:#}");

                format!("Error rendering the card: {error:#}")
            }
        };

        IntoResponse::into_response((
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        ))
    }
}

/// Sends unknown paths to the home page.
pub struct MovedToIndex;

impl IntoResponse for MovedToIndex {
    fn into_response(self) -> Response {
        IntoResponse::into_response((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/")]))
    }
}
