// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GridMesh Core
//!
//! Occupancy grid handling for the grid-to-mesh pipeline:
//!
//! - **Loading**: validate a decoded raster against its map metadata
//!   ([`OccupancyGrid::from_raster`])
//! - **Thresholding**: classify each cell as occupied or free ([`BinaryGrid`])
//! - **Wall extraction**: keep occupied cells that touch free space
//!   ([`WallExtractor`])
//! - **Placement**: map cells to world coordinates ([`GridFrame`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gridmesh_core::{MapMetadata, OccupancyGrid, Pose2D, WallExtractor};
//!
//! let meta = MapMetadata::new(0.05, Pose2D::new(-10.0, -10.0, 0.0));
//! let grid = OccupancyGrid::from_raster(pixels, width, height, &meta)?;
//! let walls = WallExtractor::default().extract(&grid);
//! println!("{} wall cells", walls.len());
//! ```

pub mod binary;
pub mod error;
pub mod frame;
pub mod grid;
pub mod metadata;
pub mod morphology;
pub mod walls;

pub use binary::{classify, AmbiguousPolicy, BinaryGrid, CellState};
pub use error::{Error, Result};
pub use frame::{GridCell, GridFrame};
pub use grid::OccupancyGrid;
pub use metadata::{MapMetadata, Pose2D, DEFAULT_FREE_THRESH, DEFAULT_OCCUPIED_THRESH};
pub use morphology::{erode, Connectivity};
pub use walls::{ExtractionMethod, ExtractorConfig, WallCellSet, WallExtractor};
