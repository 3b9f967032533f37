// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Occupancy grid construction from a decoded raster

use crate::error::{Error, Result};
use crate::frame::GridFrame;
use crate::metadata::{MapMetadata, Pose2D};

/// A row-major raster of raw intensities plus the metadata needed to
/// interpret it
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    resolution: f64,
    origin: Pose2D,
    negate: bool,
    occupied_thresh: f64,
    free_thresh: f64,
    cells: Vec<u8>,
}

impl OccupancyGrid {
    /// Build a grid from a decoded 8-bit raster
    ///
    /// `pixels` is row-major with row 0 at the top of the image. The image
    /// dimensions are authoritative; when the metadata also declares
    /// dimensions they must agree with the image.
    pub fn from_raster(
        pixels: Vec<u8>,
        width: usize,
        height: usize,
        metadata: &MapMetadata,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }

        let expected = width
            .checked_mul(height)
            .ok_or_else(|| Error::invalid("grid dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        // A dimension left undeclared is taken from the image
        let declared_width = metadata.width.map_or(width, |w| w as usize);
        let declared_height = metadata.height.map_or(height, |h| h as usize);
        if declared_width != width || declared_height != height {
            return Err(Error::DeclaredSizeMismatch {
                declared_width,
                declared_height,
                width,
                height,
            });
        }

        metadata.validate()?;

        tracing::debug!(
            width,
            height,
            resolution = metadata.resolution,
            negate = metadata.negate,
            "Loaded occupancy grid"
        );

        Ok(Self {
            width,
            height,
            resolution: metadata.resolution,
            origin: metadata.origin,
            negate: metadata.negate,
            occupied_thresh: metadata.occupied_thresh,
            free_thresh: metadata.free_thresh,
            cells: pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[inline]
    pub fn origin(&self) -> Pose2D {
        self.origin
    }

    #[inline]
    pub fn negate(&self) -> bool {
        self.negate
    }

    #[inline]
    pub fn occupied_thresh(&self) -> f64 {
        self.occupied_thresh
    }

    #[inline]
    pub fn free_thresh(&self) -> f64 {
        self.free_thresh
    }

    /// Raw intensities, row-major
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Raw intensity at (row, col)
    #[inline]
    pub fn intensity(&self, row: usize, col: usize) -> Option<u8> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    /// Occupancy probability in [0, 1] for a raw intensity
    ///
    /// Dark pixels are occupied: 0 maps to 1.0 and 255 to 0.0. With
    /// `negate` set the mapping is reversed.
    #[inline]
    pub fn occupancy(&self, value: u8) -> f64 {
        let v = value as f64 / 255.0;
        if self.negate {
            v
        } else {
            1.0 - v
        }
    }

    /// Placement of this grid in world space
    pub fn frame(&self) -> GridFrame {
        GridFrame::new(self.width, self.height, self.resolution, self.origin)
    }
}
