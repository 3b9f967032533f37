// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for grid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or analysing an occupancy grid
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Dimension mismatch: expected {expected} cells, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(
        "Declared size {declared_width}x{declared_height} does not match image {width}x{height}"
    )]
    DeclaredSizeMismatch {
        declared_width: usize,
        declared_height: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }
}
