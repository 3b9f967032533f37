// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thresholding an occupancy grid into occupied/free cells

use crate::frame::GridCell;
use crate::grid::OccupancyGrid;
use serde::{Deserialize, Serialize};

/// Binary classification of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Occupied,
    Free,
}

/// How to classify cells whose occupancy falls strictly between
/// `free_thresh` and `occupied_thresh`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguousPolicy {
    /// Unknown space is treated as wall
    #[default]
    Occupied,
    /// Unknown space is treated as open floor
    Free,
}

impl AmbiguousPolicy {
    #[inline]
    fn state(self) -> CellState {
        match self {
            AmbiguousPolicy::Occupied => CellState::Occupied,
            AmbiguousPolicy::Free => CellState::Free,
        }
    }
}

/// Classify one occupancy probability
///
/// `free_thresh` is checked first, so when both thresholds are equal a
/// probability sitting exactly on them is free.
#[inline]
pub fn classify(
    occupancy: f64,
    occupied_thresh: f64,
    free_thresh: f64,
    policy: AmbiguousPolicy,
) -> CellState {
    if occupancy <= free_thresh {
        CellState::Free
    } else if occupancy >= occupied_thresh {
        CellState::Occupied
    } else {
        policy.state()
    }
}

/// Occupied/free raster with the same dimensions as its source grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryGrid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl BinaryGrid {
    /// Threshold every cell of `grid`
    pub fn from_occupancy(grid: &OccupancyGrid, policy: AmbiguousPolicy) -> Self {
        // 256 possible intensities: classify each once
        let mut lut = [CellState::Free; 256];
        for (value, slot) in lut.iter_mut().enumerate() {
            *slot = classify(
                grid.occupancy(value as u8),
                grid.occupied_thresh(),
                grid.free_thresh(),
                policy,
            );
        }

        let cells = grid.cells().iter().map(|&v| lut[v as usize]).collect();

        Self {
            width: grid.width(),
            height: grid.height(),
            cells,
        }
    }

    /// Build directly from row-major states
    ///
    /// Returns `None` if `cells.len() != width * height`.
    pub fn from_cells(width: usize, height: usize, cells: Vec<CellState>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub(crate) fn from_parts(width: usize, height: usize, cells: Vec<CellState>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
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
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    /// Occupancy test with signed coordinates; out-of-bounds reads as free
    #[inline]
    pub fn is_occupied_at(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        matches!(
            self.get(row as usize, col as usize),
            Some(CellState::Occupied)
        )
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&c| c == CellState::Occupied)
            .count()
    }

    /// Free cells in row-major order
    pub fn free_cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == CellState::Free)
            .map(move |(i, _)| GridCell::new(i / self.width, i % self.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MapMetadata, Pose2D};

    fn grid(pixels: Vec<u8>, meta: MapMetadata) -> OccupancyGrid {
        let n = pixels.len();
        OccupancyGrid::from_raster(pixels, n, 1, &meta).unwrap()
    }

    #[test]
    fn test_black_is_occupied_white_is_free() {
        let meta = MapMetadata::new(1.0, Pose2D::default());
        let g = grid(vec![0, 255], meta);
        let binary = BinaryGrid::from_occupancy(&g, AmbiguousPolicy::Occupied);

        assert_eq!(binary.get(0, 0), Some(CellState::Occupied));
        assert_eq!(binary.get(0, 1), Some(CellState::Free));
    }

    #[test]
    fn test_negate_swaps_meaning() {
        let meta = MapMetadata::new(1.0, Pose2D::default()).with_negate(true);
        let g = grid(vec![0, 255], meta);
        let binary = BinaryGrid::from_occupancy(&g, AmbiguousPolicy::Occupied);

        assert_eq!(binary.get(0, 0), Some(CellState::Free));
        assert_eq!(binary.get(0, 1), Some(CellState::Occupied));
    }

    #[test]
    fn test_ambiguous_band_policy() {
        // occupancy of 127 is ~0.502, between 0.25 and 0.75
        let meta = MapMetadata::new(1.0, Pose2D::default()).with_thresholds(0.75, 0.25);
        let g = grid(vec![127], meta);

        let conservative = BinaryGrid::from_occupancy(&g, AmbiguousPolicy::Occupied);
        assert_eq!(conservative.get(0, 0), Some(CellState::Occupied));

        let permissive = BinaryGrid::from_occupancy(&g, AmbiguousPolicy::Free);
        assert_eq!(permissive.get(0, 0), Some(CellState::Free));
    }

    #[test]
    fn test_threshold_boundaries_are_inclusive() {
        assert_eq!(classify(0.65, 0.65, 0.2, AmbiguousPolicy::Free), CellState::Occupied);
        assert_eq!(classify(0.2, 0.65, 0.2, AmbiguousPolicy::Occupied), CellState::Free);
        // Equal thresholds: free wins
        assert_eq!(classify(0.5, 0.5, 0.5, AmbiguousPolicy::Occupied), CellState::Free);
        assert_eq!(classify(0.51, 0.5, 0.5, AmbiguousPolicy::Free), CellState::Occupied);
    }

    #[test]
    fn test_equal_thresholds_on_grid() {
        // 102 maps to occupancy 0.6 exactly; 0 and 255 hit the 1.0 and 0.0 ends
        for (thresh, value) in [(0.0, 255u8), (1.0, 0), (0.6, 102)] {
            let meta = MapMetadata::new(1.0, Pose2D::default()).with_thresholds(thresh, thresh);
            let g = grid(vec![value], meta);
            let binary = BinaryGrid::from_occupancy(&g, AmbiguousPolicy::Occupied);
            assert_eq!(binary.get(0, 0), Some(CellState::Free), "thresh {}", thresh);
        }
    }

    #[test]
    fn test_out_of_bounds_is_free() {
        let binary = BinaryGrid::from_cells(1, 1, vec![CellState::Occupied]).unwrap();
        assert!(binary.is_occupied_at(0, 0));
        assert!(!binary.is_occupied_at(-1, 0));
        assert!(!binary.is_occupied_at(0, 1));
        assert!(BinaryGrid::from_cells(2, 2, vec![CellState::Free]).is_none());
    }
}
