// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Map inputs: decoded raster plus metadata, and loading them from disk
//!
//! On disk a map is a grayscale image and a map_server style YAML file:
//!
//! ```yaml
//! image: track_map.png
//! resolution: 0.05
//! origin: [-10.0, -10.0, 0.0]
//! negate: 0
//! occupied_thresh: 0.65
//! free_thresh: 0.196
//! ```
//!
//! A relative `image` path is resolved against the YAML file's directory.

use crate::error::{Error, Result};
use gridmesh_core::{MapMetadata, OccupancyGrid};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A decoded grayscale raster together with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct GridInput {
    /// Row-major intensities, row 0 at the top of the image
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub metadata: MapMetadata,
}

impl GridInput {
    pub fn new(pixels: Vec<u8>, width: usize, height: usize, metadata: MapMetadata) -> Self {
        Self {
            pixels,
            width,
            height,
            metadata,
        }
    }

    /// Validate and build the occupancy grid
    pub fn to_grid(&self) -> Result<OccupancyGrid> {
        Ok(OccupancyGrid::from_raster(
            self.pixels.clone(),
            self.width,
            self.height,
            &self.metadata,
        )?)
    }

    pub fn into_grid(self) -> Result<OccupancyGrid> {
        Ok(OccupancyGrid::from_raster(
            self.pixels,
            self.width,
            self.height,
            &self.metadata,
        )?)
    }
}

/// Contents of a map YAML file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapDescriptor {
    /// Image file named by the descriptor, if any
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(flatten)]
    pub metadata: MapMetadata,
}

impl MapDescriptor {
    pub fn from_yaml_str(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Read and parse a descriptor file
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_to_string(path)?;
        Self::from_yaml_str(&text).map_err(|source| Error::Metadata {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::MissingInput(format!("{}: {}", path.display(), e)))
}

/// Decode an image file to 8-bit grayscale, returning `(pixels, width, height)`
pub fn decode_grayscale(path: &Path) -> Result<(Vec<u8>, usize, usize)> {
    if !path.is_file() {
        return Err(Error::MissingInput(format!(
            "map image not found: {}",
            path.display()
        )));
    }

    let img = image::open(path).map_err(|source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();

    Ok((gray.into_raw(), width as usize, height as usize))
}

/// Load a map from its YAML descriptor, decoding the image it names
pub fn load_map(yaml_path: &Path) -> Result<GridInput> {
    let descriptor = MapDescriptor::load(yaml_path)?;
    let image = descriptor.image.as_deref().ok_or_else(|| {
        Error::MissingInput(format!("{} names no image", yaml_path.display()))
    })?;

    let image_path = match yaml_path.parent() {
        Some(dir) if image.is_relative() => dir.join(image),
        _ => image.to_path_buf(),
    };

    input_from_parts(&image_path, descriptor.metadata)
}

/// Load a map from an explicit image and YAML pair
///
/// The YAML's own `image` entry, if present, is ignored.
pub fn load_map_files(image_path: &Path, yaml_path: &Path) -> Result<GridInput> {
    let descriptor = MapDescriptor::load(yaml_path)?;
    input_from_parts(image_path, descriptor.metadata)
}

fn input_from_parts(image_path: &Path, metadata: MapMetadata) -> Result<GridInput> {
    let (pixels, width, height) = decode_grayscale(image_path)?;

    tracing::debug!(
        image = %image_path.display(),
        width,
        height,
        "Decoded map image"
    );

    Ok(GridInput::new(pixels, width, height, metadata))
}
