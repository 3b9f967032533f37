// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion errors

use std::path::PathBuf;
use thiserror::Error;

/// Result type for conversions
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error category, independent of which stage raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Raster size disagrees with the metadata
    DimensionMismatch,
    /// Non-positive resolution or height, malformed thresholds
    InvalidParameter,
    /// Required map files absent or unreadable
    MissingInput,
    /// Output path not writable
    IoError,
    /// Output extension not recognized
    UnsupportedFormat,
}

/// Errors that can occur during a conversion
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] gridmesh_core::Error),

    #[error(transparent)]
    Geometry(#[from] gridmesh_geometry::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Cannot decode map image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot parse map metadata {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

fn grid_kind(err: &gridmesh_core::Error) -> ErrorKind {
    match err {
        gridmesh_core::Error::DimensionMismatch { .. }
        | gridmesh_core::Error::DeclaredSizeMismatch { .. } => ErrorKind::DimensionMismatch,
        gridmesh_core::Error::InvalidParameter(_) => ErrorKind::InvalidParameter,
    }
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        use gridmesh_geometry::Error as GeometryError;

        match self {
            Error::Grid(e) => grid_kind(e),
            Error::Geometry(e) => match e {
                GeometryError::InvalidParameter(_) | GeometryError::InvalidMesh(_) => {
                    ErrorKind::InvalidParameter
                }
                GeometryError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
                GeometryError::Io { .. } => ErrorKind::IoError,
            },
            Error::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Error::MissingInput(_) | Error::ImageDecode { .. } | Error::Metadata { .. } => {
                ErrorKind::MissingInput
            }
        }
    }
}
