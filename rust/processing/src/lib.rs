// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GridMesh Processing
//!
//! End-to-end conversion of a 2D occupancy map into a 3D mesh file.
//!
//! ```rust,ignore
//! use gridmesh_processing::{convert, load_map, ConversionConfig};
//!
//! let input = load_map("tracks/oval/oval_map.yaml".as_ref())?;
//! let config = ConversionConfig::default().with_wall_height(0.5);
//! let result = convert(&input, &config, "out/oval_track_3d.obj".as_ref())?;
//! println!("{} triangles", result.triangles);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;

pub use config::{ConversionConfig, DEFAULT_WALL_HEIGHT};
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{build_mesh, convert, convert_batch, ConversionJob, ExportResult, MapMesh};
pub use source::{decode_grayscale, load_map, load_map_files, GridInput, MapDescriptor};

// Types callers need to fill in a configuration or input
pub use gridmesh_core::{AmbiguousPolicy, Connectivity, ExtractionMethod, MapMetadata, Pose2D};
pub use gridmesh_geometry::{ExportFormat, ExportedFile, FloorStyle};
