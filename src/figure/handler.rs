//! Axum handlers for `/api/ml/hsi/figure/...`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::figure::error::FigureError;
use crate::figure::params::{split_segments, FigureRequest};
use crate::figure::upstream::UpstreamClient;
use crate::figure::ROUTE_PREFIX;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;

/// Cache policy handed to clients for relayed figures.
pub const FIGURE_CACHE_CONTROL: &str = "public, max-age=3600";

/// State shared by the figure handlers.
#[derive(Clone)]
pub struct FigureState {
    pub upstream: Arc<UpstreamClient>,
}

/// JPEG bytes relayed from the ML image service.
#[derive(Debug, Clone)]
pub struct FigureImage(pub Bytes);

impl IntoResponse for FigureImage {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/jpeg"),
                (header::CACHE_CONTROL, FIGURE_CACHE_CONTROL),
            ],
            self.0,
        )
            .into_response()
    }
}

/// `GET /api/ml/hsi/figure[/{*params}]`
///
/// Segments are split on the raw path before percent-decoding, so an
/// encoded `%2F` stays inside its segment.
pub async fn figure_handler(
    State(state): State<FigureState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let rest = uri.path().strip_prefix(ROUTE_PREFIX).unwrap_or_default();
    respond(&state, &split_segments(rest), &headers).await
}

/// Every outcome of a figure request, success or failure, becomes a
/// response here and nowhere else.
async fn respond(state: &FigureState, segments: &[String], headers: &HeaderMap) -> Response {
    let start = Instant::now();
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    match fetch_figure(state, segments, headers).await {
        Ok(image) => {
            tracing::debug!(
                request_id = %request_id,
                bytes = image.0.len(),
                "Relaying figure image"
            );
            metrics::record_figure_request("ok", StatusCode::OK.as_u16(), start);
            image.into_response()
        }
        Err(err) => {
            err.log(request_id);
            metrics::record_figure_request(err.outcome(), err.status().as_u16(), start);
            err.into_response()
        }
    }
}

async fn fetch_figure(
    state: &FigureState,
    segments: &[String],
    headers: &HeaderMap,
) -> Result<FigureImage, FigureError> {
    let request = FigureRequest::from_segments(segments)?;
    let bytes = state
        .upstream
        .fetch_figure(&request, headers.get(X_REQUEST_ID))
        .await?;
    Ok(FigureImage(bytes))
}
