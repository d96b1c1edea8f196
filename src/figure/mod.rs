//! HSI figure proxy.
//!
//! # Data Flow
//! ```text
//! GET /api/ml/hsi/figure/{dataset_id}/{image_type}
//!     → params.rs (arity, dataset allow-list, image type allow-list)
//!     → upstream.rs (GET {base_url}/hsi/figure/{dataset_id}/{image_type})
//!     → handler.rs (relay JPEG, or map FigureError to a JSON error)
//! ```
//!
//! # Design Decisions
//! - Validation fails fast; rejected requests never reach the ML service
//! - The image type is forwarded with the caller's casing
//! - One error boundary: transport faults collapse to a generic 500

pub mod error;
pub mod handler;
pub mod params;
pub mod upstream;

pub use error::{ErrorBody, FigureError};
pub use handler::{figure_handler, FigureImage, FigureState};
pub use params::{DatasetId, FigureRequest, ImageKind, ParamError};
pub use upstream::UpstreamClient;

/// Route prefix the two figure parameters follow.
pub const ROUTE_PREFIX: &str = "/api/ml/hsi/figure";
