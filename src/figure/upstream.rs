//! Client for the ML image service.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderValue};

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::figure::error::FigureError;
use crate::figure::params::FigureRequest;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;

const ACCEPT_JPEG: &str = "image/jpeg";

/// Fetches rendered figures from the ML image service.
///
/// Holds a pooled `reqwest::Client`; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Build a client for the configured service. Zero timeouts are left unset.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if timeouts.connect_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(timeouts.connect_secs));
        }
        if timeouts.request_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeouts.request_secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a figure on the ML image service.
    pub fn figure_url(&self, request: &FigureRequest) -> String {
        format!("{}{}", self.base_url, request.upstream_path())
    }

    /// GET the figure and return its bytes.
    ///
    /// A non-2xx answer becomes [`FigureError::Upstream`] carrying the
    /// response text; failures to connect or read become
    /// [`FigureError::Transport`].
    pub async fn fetch_figure(
        &self,
        request: &FigureRequest,
        request_id: Option<&HeaderValue>,
    ) -> Result<Bytes, FigureError> {
        let url = self.figure_url(request);
        tracing::debug!(
            url = %url,
            dataset = %request.dataset(),
            kind = %request.kind(),
            "Fetching figure from ML service"
        );

        let mut outbound = self
            .client
            .get(&url)
            .header(header::ACCEPT, ACCEPT_JPEG);
        if let Some(id) = request_id {
            outbound = outbound.header(X_REQUEST_ID, id.clone());
        }

        let response = outbound.send().await?;
        let status = response.status();
        metrics::record_upstream_response(status.as_u16());

        if !status.is_success() {
            let body = response.text().await?;
            return Err(FigureError::Upstream { status, body });
        }

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> UpstreamClient {
        let upstream = UpstreamConfig {
            base_url: base_url.to_string(),
        };
        UpstreamClient::new(&upstream, &TimeoutConfig::default()).unwrap()
    }

    #[test]
    fn test_figure_url() {
        let request = FigureRequest::from_segments(&["1", "legend"]).unwrap();
        assert_eq!(
            client("http://localhost:8000").figure_url(&request),
            "http://localhost:8000/hsi/figure/1/legend"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_url() {
        let request = FigureRequest::from_segments(&["2", "GT"]).unwrap();
        let client = client("http://ml.internal/api/");
        assert_eq!(client.base_url(), "http://ml.internal/api");
        assert_eq!(
            client.figure_url(&request),
            "http://ml.internal/api/hsi/figure/2/GT"
        );
    }

    #[test]
    fn test_zero_timeouts_build() {
        let upstream = UpstreamConfig::default();
        let timeouts = TimeoutConfig {
            connect_secs: 0,
            request_secs: 0,
        };
        assert!(UpstreamClient::new(&upstream, &timeouts).is_ok());
    }
}
