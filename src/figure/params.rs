//! Path parameter validation.
//!
//! The ML image service only knows three datasets and four renderings, so
//! both are closed enums. Anything else is rejected before an upstream call
//! is made.

use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;

/// A path that does not name a figure the ML image service can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("Invalid path. Expected /api/ml/hsi/figure/{{dataset_id}}/{{image_type}}")]
    InvalidPath,

    #[error("Invalid dataset_id. Use 1, 2, or 6")]
    InvalidDatasetId,

    #[error("Invalid image_type. Use fc, gt, pr, or legend")]
    InvalidImageType,
}

/// Dataset selector accepted by the ML image service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetId {
    One,
    Two,
    Six,
}

impl DatasetId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetId::One => "1",
            DatasetId::Two => "2",
            DatasetId::Six => "6",
        }
    }
}

/// Exact, case-sensitive match.
impl FromStr for DatasetId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(DatasetId::One),
            "2" => Ok(DatasetId::Two),
            "6" => Ok(DatasetId::Six),
            _ => Err(ParamError::InvalidDatasetId),
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rendering of a dataset to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// `fc`
    FalseColor,
    /// `gt`
    GroundTruth,
    /// `pr`
    Prediction,
    Legend,
}

impl ImageKind {
    /// Canonical (lowercase) code.
    pub fn code(&self) -> &'static str {
        match self {
            ImageKind::FalseColor => "fc",
            ImageKind::GroundTruth => "gt",
            ImageKind::Prediction => "pr",
            ImageKind::Legend => "legend",
        }
    }
}

/// Case-insensitive match.
impl FromStr for ImageKind {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fc" => Ok(ImageKind::FalseColor),
            "gt" => Ok(ImageKind::GroundTruth),
            "pr" => Ok(ImageKind::Prediction),
            "legend" => Ok(ImageKind::Legend),
            _ => Err(ParamError::InvalidImageType),
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A validated figure lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureRequest {
    dataset: DatasetId,
    kind: ImageKind,
    /// The image type as the caller spelled it; forwarded verbatim.
    image_type: String,
}

impl FigureRequest {
    /// Validate the path segments that followed the route prefix.
    ///
    /// Checks run in order (arity, dataset, image type) and stop at the
    /// first failure.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self, ParamError> {
        let [dataset, image_type] = segments else {
            return Err(ParamError::InvalidPath);
        };

        let dataset: DatasetId = dataset.as_ref().parse()?;
        let kind: ImageKind = image_type.as_ref().parse()?;

        Ok(Self {
            dataset,
            kind,
            image_type: image_type.as_ref().to_string(),
        })
    }

    pub fn dataset(&self) -> DatasetId {
        self.dataset
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// The image type with its original casing.
    pub fn image_type(&self) -> &str {
        &self.image_type
    }

    /// Path on the ML image service, relative to its base URL.
    pub fn upstream_path(&self) -> String {
        format!("/hsi/figure/{}/{}", self.dataset, self.image_type)
    }
}

/// Split the raw (still percent-encoded) remainder of the route into path
/// segments, then decode each one.
///
/// Empty segments (from a trailing or doubled `/`) are dropped. Invalid
/// UTF-8 is replaced, which no allow-list entry can match.
pub fn split_segments(raw_rest: &str) -> Vec<String> {
    raw_rest
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}
