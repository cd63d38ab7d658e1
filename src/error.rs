//! Error types and result utilities for image plotting operations.
//!
//! All validation happens before any numeric or rendering work starts, so a
//! returned error never leaves a half-built figure behind.

use thiserror::Error;

/// Convenience type alias for results that may contain an [`ImagePlotError`].
pub type ImagePlotResult<T> = Result<T, ImagePlotError>;

/// Error types that can occur while preparing, computing or rendering plots.
#[derive(Error, Debug)]
pub enum ImagePlotError {
    /// The input array has the wrong rank or shape for the requested plot.
    ///
    /// Raised for non 2-D input to gray plots, RGB data whose last axis is not
    /// a channel axis, empty arrays and non-finite values.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Settings or per-call options are inconsistent or unknown.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The requested filter name is not in the filter registry.
    #[error("'{name}' filter is not implemented. Supported filters: {supported}")]
    UnsupportedFilter {
        /// The rejected filter name.
        name: String,
        /// Comma separated list of supported filter names.
        supported: String,
    },

    /// The requested dataset name is not in the dataset registry.
    #[error("No '{name}' image dataset. Available image datasets: {available}")]
    UnknownDataset {
        /// The rejected dataset name.
        name: String,
        /// Comma separated list of known dataset names.
        available: String,
    },

    /// A numeric parameter is out of its valid range.
    ///
    /// This includes cases like a non-positive bin count or a negative sigma.
    #[error("Invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        param: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A slice index or axis lies outside the array bounds.
    #[error("Index {index} is out of bounds for {what} of length {len}")]
    IndexOutOfBounds {
        /// The requested (possibly negative) index.
        index: isize,
        /// Length of the indexed dimension.
        len: usize,
        /// What was indexed, e.g. `"axis 1"` or `"axes"`.
        what: String,
    },

    /// Downloaded or cached dataset content does not match its registered checksum.
    #[error("Checksum mismatch for '{file}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// File name inside the dataset registry.
        file: String,
        /// Registered sha256 digest.
        expected: String,
        /// Digest of the bytes actually received.
        actual: String,
    },

    /// Filesystem error while reading or writing the dataset cache or a figure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching a dataset failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// A dataset file could not be parsed.
    #[error("Failed to decode dataset: {0}")]
    Decode(String),

    /// The plotting backend reported an error.
    #[error("Rendering failed: {0}")]
    Render(String),
}

impl ImagePlotError {
    /// Shorthand for [`ImagePlotError::Shape`].
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Shorthand for [`ImagePlotError::InvalidParameter`].
    pub fn invalid_parameter(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ImagePlotError::Render`].
    pub fn render(err: impl std::fmt::Display) -> Self {
        Self::Render(err.to_string())
    }
}

/// Configuration errors raised by the settings registry and the option resolver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Unknown context name passed to `set_context`.
    #[error("Unknown context '{name}'. Available contexts: {available}")]
    UnknownContext {
        /// The rejected context name.
        name: String,
        /// Comma separated list of context names.
        available: String,
    },

    /// An option key outside the allow-list of its category.
    #[error("Unknown {category} option '{key}'. Allowed options: {allowed}")]
    UnknownOption {
        /// Category the key was given for (`context`, `image`, `scalebar`, ...).
        category: String,
        /// The rejected key.
        key: String,
        /// Comma separated allow-list.
        allowed: String,
    },

    /// A known option key with a value that cannot be used.
    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        /// Option key.
        key: String,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// `dx` and `units` must be given together.
    #[error("{0}")]
    ScalebarPairing(String),

    /// Colormap name not found.
    #[error("Unknown colormap '{name}'")]
    UnknownColormap {
        /// The rejected colormap name.
        name: String,
    },

    /// Scalebar dimension not supported.
    #[error("Unsupported dimension '{name}'. Supported dimensions are: {available}")]
    UnknownDimension {
        /// The rejected dimension.
        name: String,
        /// Comma separated list of dimensions.
        available: String,
    },

    /// A per-panel parameter list has the wrong number of entries.
    #[error("'{param}' has {actual} entries but {expected} images were given")]
    PanelCount {
        /// Name of the per-panel parameter.
        param: String,
        /// Number of input images.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ConfigError::UnknownOption`].
    pub fn unknown_option(category: &str, key: &str, allowed: &[&str]) -> Self {
        Self::UnknownOption {
            category: category.to_string(),
            key: key.to_string(),
            allowed: allowed.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts_into_top_level_error() {
        let err: ImagePlotError = ConfigError::ScalebarPairing("missing units".into()).into();
        assert!(matches!(err, ImagePlotError::Config(ConfigError::ScalebarPairing(_))));
        assert_eq!(err.to_string(), "missing units");
    }

    #[test]
    fn test_unknown_option_lists_allowed_keys() {
        let err = ConfigError::unknown_option("image", "colour", &["cmap", "origin"]);
        assert_eq!(
            err.to_string(),
            "Unknown image option 'colour'. Allowed options: cmap, origin"
        );
    }
}
