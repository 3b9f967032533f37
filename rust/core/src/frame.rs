// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid-to-world coordinate transform
//!
//! Raster row 0 is the top of the image while world Y grows upwards, so the
//! row index is flipped here and nowhere else. The origin pose locates the
//! lower-left corner of cell (row = height - 1, col = 0), which is the
//! map_server convention for "cell (0, 0)".

use crate::metadata::Pose2D;
use nalgebra::Point2;

/// A cell address in raster order (row 0 = top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Placement of a `width x height` grid in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFrame {
    pub width: usize,
    pub height: usize,
    pub resolution: f64,
    pub origin: Pose2D,
}

impl GridFrame {
    pub fn new(width: usize, height: usize, resolution: f64, origin: Pose2D) -> Self {
        Self {
            width,
            height,
            resolution,
            origin,
        }
    }

    /// Number of rows between `row` and the bottom edge of the raster
    #[inline]
    pub fn rows_from_bottom(&self, row: usize) -> usize {
        debug_assert!(row < self.height);
        self.height - 1 - row
    }

    /// World-space lower-left corner of a cell
    #[inline]
    pub fn cell_min(&self, cell: GridCell) -> Point2<f64> {
        Point2::new(
            self.origin.x + self.resolution * cell.col as f64,
            self.origin.y + self.resolution * self.rows_from_bottom(cell.row) as f64,
        )
    }

    /// World-space footprint center of a cell
    #[inline]
    pub fn cell_center(&self, cell: GridCell) -> Point2<f64> {
        let half = self.resolution * 0.5;
        let min = self.cell_min(cell);
        Point2::new(min.x + half, min.y + half)
    }

    /// World-space footprint of a cell as (min, max) corners
    #[inline]
    pub fn cell_bounds(&self, cell: GridCell) -> (Point2<f64>, Point2<f64>) {
        let min = self.cell_min(cell);
        (
            min,
            Point2::new(min.x + self.resolution, min.y + self.resolution),
        )
    }

    /// World-space extent of the whole grid as (min, max) corners
    pub fn extent(&self) -> (Point2<f64>, Point2<f64>) {
        let min = Point2::new(self.origin.x, self.origin.y);
        (
            min,
            Point2::new(
                min.x + self.resolution * self.width as f64,
                min.y + self.resolution * self.height as f64,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_top_row_maps_to_max_y() {
        let frame = GridFrame::new(4, 3, 0.5, Pose2D::new(1.0, 2.0, 0.0));

        let top_left = frame.cell_center(GridCell::new(0, 0));
        assert_relative_eq!(top_left.x, 1.25);
        assert_relative_eq!(top_left.y, 2.0 + 0.5 * 2.0 + 0.25);

        let bottom_left = frame.cell_center(GridCell::new(2, 0));
        assert_relative_eq!(bottom_left.y, 2.25);

        let bottom_right = frame.cell_center(GridCell::new(2, 3));
        assert_relative_eq!(bottom_right.x, 1.0 + 0.5 * 3.0 + 0.25);
    }

    #[test]
    fn test_cell_bounds_tile_the_extent() {
        let frame = GridFrame::new(5, 2, 0.1, Pose2D::default());
        let (min, max) = frame.extent();
        let (first_min, _) = frame.cell_bounds(GridCell::new(1, 0));
        let (_, last_max) = frame.cell_bounds(GridCell::new(0, 4));

        assert_relative_eq!(first_min.x, min.x);
        assert_relative_eq!(first_min.y, min.y);
        assert_relative_eq!(last_max.x, max.x, epsilon = 1e-12);
        assert_relative_eq!(last_max.y, max.y, epsilon = 1e-12);
    }
}
