use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Wrapper that lets handlers bubble `anyhow::Error` with `?`.
///
/// Store, mail and payment failures are not caught locally; they surface
/// here as a 500 and abort the request.
pub struct ServerError(anyhow::Error);

pub type ServerResult<T = Response> = Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
